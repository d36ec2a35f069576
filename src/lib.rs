//! Parlint: parallel syntax linting with a content-fingerprint cache

pub mod cache;
pub mod engine;
pub mod error;
pub mod linter;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use cache::{CacheStore, JsonStore, ResultCache, SqliteStore};
pub use engine::task::{CheckTask, Checker, Verdict};
pub use error::LintError;
pub use linter::Linter;

use log::debug;

/// Result alias used by public parlint API
pub type Result<T> = std::result::Result<T, LintError>;

/// Single entry point: lint everything `opts` selects and return the failing files.
///
/// Uses (and afterwards replaces) the cache at `opts.cache_path` when `opts.use_cache` is set.
///
/// ```ignore
/// let opts = parlint::Opts { paths: vec!["src".into()], ..Default::default() };
/// for (path, diag) in parlint::lint_paths(&opts)? {
///     eprintln!("{}: {}", path.display(), diag.message);
/// }
/// ```
pub fn lint_paths(opts: &Opts) -> Result<RunResult> {
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );
    let mut linter = Linter::from_opts(opts)?;
    linter.lint(Vec::new(), opts.use_cache)
}
