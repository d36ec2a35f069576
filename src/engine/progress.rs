//! Progress bar utilities for displaying lint status

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    /// Create a new progress bar configuration
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

/// Create a progress bar with the given configuration
pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " files"
    )))
}

/// Update progress bar if available
/// Uses try_lock to avoid blocking if mutex is contended (non-blocking)
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Set the bar's description (e.g. to flag that failures were seen).
pub fn set_bar_desc(pb: &ProgressBar, desc: &str) {
    if let Ok(mut bar) = pb.try_lock() {
        bar.set_description(desc);
        let _ = bar.refresh();
    }
}

/// Count the files that never reached the callback (cache hits), then print a trailing newline
/// so following output starts on a fresh line.
pub fn finish_bar(pb: &ProgressBar, skipped: usize) {
    if let Ok(mut bar) = pb.lock() {
        if skipped > 0 {
            let _ = bar.update(skipped);
        }
        let _ = bar.refresh();
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_counts_skipped_files() {
        let pb = create_progress_bar(ProgressBarConfig::new(5, "Linting", Animation::FillUp));
        update_progress_bar(&pb, 2);
        finish_bar(&pb, 3);
        let bar = pb.lock().unwrap();
        assert_eq!(bar.counter, bar.total);
    }
}
