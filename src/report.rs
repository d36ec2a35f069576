//! Lint report printing

use log::{debug, info};

use crate::utils::Colors;
use crate::{Diagnostic, FailureKind, RunResult, RunStats};

/// Print one line per failing file (plus the checker output for non-syntax failures), then a summary.
pub fn print_report(errors: &RunResult, stats: &RunStats) {
    for diag in errors.values() {
        println!("{}", format_diagnostic(diag));
        if diag.kind != FailureKind::Syntax && !diag.output.trim().is_empty() {
            println!("    {}", diag.output.trim().replace('\n', "\n    "));
        }
    }

    if stats.files == 0 {
        info!("No files to lint.");
        return;
    }

    let summary = format!(
        "{} | {} | {}",
        Colors::colorize(Colors::OK, &format!("Passed: {}", stats.passed)),
        Colors::colorize(Colors::ERROR, &format!("Failed: {}", stats.failed)),
        Colors::colorize(Colors::SKIPPED, &format!("Unchanged: {}", stats.skipped))
    );
    info!("{}", summary);
    debug!(
        "{} processes started, at most {} at once",
        stats.spawned, stats.peak_running
    );
}

/// `path:line: message`, with the failure kind in place of the line for spawn/timeout failures.
pub fn format_diagnostic(diag: &Diagnostic) -> String {
    let location = match (diag.kind, diag.line) {
        (FailureKind::Syntax, Some(line)) => format!("{}:{}", diag.key, line),
        (FailureKind::Syntax, None) => diag.key.clone(),
        (kind, _) => format!("{} ({})", diag.key, kind),
    };
    format!(
        "{}: {}",
        Colors::colorize(Colors::LOCATION, &location),
        Colors::colorize(Colors::ERROR, &diag.message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileRef;
    use std::time::Duration;

    #[test]
    fn syntax_error_shows_key_and_line() {
        colored::control::set_override(false);
        let file = FileRef::new("/tmp/src/a.php", "src/a.php");
        let diag = Diagnostic::syntax(&file, Some(3), "unexpected '}'".into(), String::new());
        assert_eq!(format_diagnostic(&diag), "src/a.php:3: unexpected '}'");
    }

    #[test]
    fn timeout_names_the_kind() {
        colored::control::set_override(false);
        let file = FileRef::new("/tmp/b.php", "b.php");
        let diag = Diagnostic::timeout(&file, Duration::from_secs(2), String::new());
        assert!(format_diagnostic(&diag).starts_with("b.php (checker timed out): "));
    }
}
