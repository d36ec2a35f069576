//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::num::NonZeroUsize;
use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived paths: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    cache_filename: String,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache paths from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                cache_filename: format!(".{pkg}"),
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Default cache file (SQLite) in the working directory.
    pub fn cache_filename(&self) -> &str {
        &self.cache_filename
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Checker ----

/// Defaults for the PHP lint checker.
pub struct CheckerDefaults;

impl CheckerDefaults {
    pub const PROGRAM: &'static str = "php";
    pub const ARGS: &'static [&'static str] =
        &["-d", "error_reporting=E_ALL", "-d", "display_errors=On", "-l"];
    /// Printed by `php -l` when the file parses.
    pub const SUCCESS_MARKER: &'static str = "No syntax errors detected";
    /// Matches `PHP Parse error: syntax error, unexpected '}' in /x.php on line 3`.
    pub const ERROR_PATTERN: &'static str = r"(?m)^(?:PHP\s+)?(?:Parse|Fatal) error:\s*(?:\w+ error,\s*)?(?P<message>.+?)\s+in\s+.+?\s+on\s+line\s+(?P<line>\d+)";
    pub const EXTENSIONS: &'static [&'static str] = &["php"];
}

// ---- Scheduler ----

pub struct SchedulerConsts;

impl SchedulerConsts {
    /// Checker processes in flight when the caller does not say otherwise.
    pub const DEFAULT_PROCESS_LIMIT: usize = 5;
    /// Upper bound on how long the control loop sleeps between polls when nothing completed.
    pub const POLL_INTERVAL: Duration = Duration::from_millis(10);
    /// How long a killed checker's output reader gets to reach EOF before it is abandoned.
    pub const KILL_GRACE: Duration = Duration::from_millis(200);

    pub fn default_process_limit() -> NonZeroUsize {
        NonZeroUsize::new(Self::DEFAULT_PROCESS_LIMIT).unwrap_or(NonZeroUsize::MIN)
    }
}

// ---- Hashing ----

/// Hashing I/O thresholds and buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// File size above which hashing uses memory-mapped I/O (bytes). 100 MB.
    pub const HASH_MMAP_THRESHOLD: u64 = 100 * 1024 * 1024;
    /// Chunk size for reading files below mmap threshold (bytes). 1 MB.
    pub const HASH_READ_CHUNK_SIZE: usize = 1024 * 1024;
}
