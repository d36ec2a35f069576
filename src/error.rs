//! Error types for the linter.

use std::path::PathBuf;

/// Errors surfaced by the linter API.
///
/// Per-file problems (syntax errors, a checker that fails to start or times out) are not raised
/// from `lint`: they are collected into the run result. This enum is what setup, cache
/// persistence, and cancellation report.
#[derive(Debug, thiserror::Error)]
pub enum LintError {
    /// A caller-supplied file does not exist.
    #[error("file {path} does not exist")]
    InvalidInput { path: PathBuf },

    /// The checker process could not be launched.
    #[error("failed to start checker for {path}: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configured checker output pattern does not compile.
    #[error("invalid checker output pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cache file error: {0}")]
    Json(#[from] serde_json::Error),

    /// The cancel flag was raised mid-run. Running checkers were killed, nothing was persisted.
    #[error("lint cancelled by user")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_display() {
        let err = LintError::InvalidInput {
            path: PathBuf::from("src/missing.php"),
        };
        assert_eq!(err.to_string(), "file src/missing.php does not exist");
    }

    #[test]
    fn spawn_display_names_path_and_cause() {
        let err = LintError::Spawn {
            path: PathBuf::from("/tmp/a.php"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such program"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/a.php"));
        assert!(msg.contains("no such program"));
    }
}
