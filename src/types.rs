//! Public and internal types for the parlint API and scheduler.

use indexmap::IndexMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::tools::path_to_key;
use crate::error::LintError;
use crate::utils::config::{CheckerDefaults, SchedulerConsts};

/// Identity of a checkable file.
///
/// `path` is the absolute path handed to the checker; `key` is the relative path used to address
/// the cache, so cache entries stay valid when the tree is linted from another working directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileRef {
    pub path: PathBuf,
    pub key: String,
}

impl FileRef {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Build a FileRef for a path given directly by the caller. The key is the path as given,
    /// the task path is its canonical form. Fails with [`LintError::InvalidInput`] when `path`
    /// is not an existing file.
    pub fn from_path(path: &Path) -> Result<Self, LintError> {
        if !path.is_file() {
            return Err(LintError::InvalidInput {
                path: path.to_path_buf(),
            });
        }
        let real = path.canonicalize().map_err(|source| LintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: real,
            key: path_to_key(path),
        })
    }
}

/// Input accepted by [`Linter::set_files`](crate::Linter::set_files): a path to resolve or an
/// already built [`FileRef`].
#[derive(Clone, Debug)]
pub enum FileInput {
    Path(PathBuf),
    Ref(FileRef),
}

impl FileInput {
    pub fn resolve(self) -> Result<FileRef, LintError> {
        match self {
            FileInput::Path(p) => FileRef::from_path(&p),
            FileInput::Ref(r) => Ok(r),
        }
    }
}

impl From<FileRef> for FileInput {
    fn from(r: FileRef) -> Self {
        FileInput::Ref(r)
    }
}

impl From<PathBuf> for FileInput {
    fn from(p: PathBuf) -> Self {
        FileInput::Path(p)
    }
}

impl From<&Path> for FileInput {
    fn from(p: &Path) -> Self {
        FileInput::Path(p.to_path_buf())
    }
}

impl From<&str> for FileInput {
    fn from(p: &str) -> Self {
        FileInput::Path(PathBuf::from(p))
    }
}

impl From<String> for FileInput {
    fn from(p: String) -> Self {
        FileInput::Path(PathBuf::from(p))
    }
}

/// Blake3 digest of a file's bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Fingerprint(*blake3::hash(bytes).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    /// Parse a 64-character hex digest. Returns None for anything else.
    pub fn from_hex(s: &str) -> Option<Self> {
        blake3::Hash::from_hex(s.trim())
            .ok()
            .map(|h| Fingerprint(*h.as_bytes()))
    }

    /// Build from a stored blob; None unless exactly 32 bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Fingerprint)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Why a file ended up in the run result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The checker ran to completion and reported invalid syntax.
    Syntax,
    /// The checker process could not be launched.
    Spawn,
    /// The checker exceeded the per-task deadline and was killed.
    Timeout,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Syntax => "syntax error",
            FailureKind::Spawn => "checker failed to start",
            FailureKind::Timeout => "checker timed out",
        };
        f.write_str(s)
    }
}

/// A failing file: where, what, and the raw checker output it was parsed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub key: String,
    pub line: Option<u32>,
    pub message: String,
    pub output: String,
    pub kind: FailureKind,
}

impl Diagnostic {
    pub fn syntax(file: &FileRef, line: Option<u32>, message: String, output: String) -> Self {
        Self {
            path: file.path.clone(),
            key: file.key.clone(),
            line,
            message,
            output,
            kind: FailureKind::Syntax,
        }
    }

    pub fn spawn_failure(file: &FileRef, err: &LintError) -> Self {
        Self {
            path: file.path.clone(),
            key: file.key.clone(),
            line: None,
            message: err.to_string(),
            output: String::new(),
            kind: FailureKind::Spawn,
        }
    }

    pub fn timeout(file: &FileRef, limit: Duration, output: String) -> Self {
        Self {
            path: file.path.clone(),
            key: file.key.clone(),
            line: None,
            message: format!("checker did not finish within {:?}", limit),
            output,
            kind: FailureKind::Timeout,
        }
    }
}

/// Outcome reported to the process callback for every file that was actually checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::Error => "error",
        }
    }
}

/// Failing files keyed by absolute path, in completion order.
pub type RunResult = IndexMap<PathBuf, Diagnostic>;

/// Counters for one `lint` run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Files handed to the scheduler (after de-duplication).
    pub files: usize,
    /// Files skipped because their fingerprint matched the cache.
    pub skipped: usize,
    /// Checker processes started.
    pub spawned: usize,
    pub passed: usize,
    pub failed: usize,
    /// Highest number of tasks in flight at once.
    pub peak_running: usize,
}

impl RunStats {
    /// Files that produced a callback event.
    pub fn checked(&self) -> usize {
        self.passed + self.failed
    }
}

/// How to invoke the external checker. The file path is appended as the last argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckerConfig {
    pub program: String,
    pub args: Vec<String>,
    /// When set, output lacking this text counts as a failure even on exit status 0.
    pub success_marker: Option<String>,
    /// Regex with optional `line` and `message` named groups. None uses the PHP pattern.
    pub error_pattern: Option<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            program: CheckerDefaults::PROGRAM.to_string(),
            args: CheckerDefaults::ARGS.iter().map(|s| s.to_string()).collect(),
            success_marker: Some(CheckerDefaults::SUCCESS_MARKER.to_string()),
            error_pattern: None,
        }
    }
}

/// Full options (CLI and [`Linter::from_opts`](crate::Linter::from_opts)).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Files or directories to lint.
    pub paths: Vec<PathBuf>,
    /// Exclude patterns (glob syntax, or plain substrings of the relative path).
    pub exclude: Vec<String>,
    /// File extensions to collect from directories, without the dot.
    pub extensions: Vec<String>,
    /// Max checker processes in flight.
    pub process_limit: NonZeroUsize,
    /// Cache file. When None, uses the package cache filename in the working directory.
    pub cache_path: Option<PathBuf>,
    /// Consult the cache and persist the replacement cache at the end of the run.
    pub use_cache: bool,
    /// Per-file deadline; a checker still running after this is killed.
    pub task_timeout: Option<Duration>,
    pub checker: CheckerConfig,
    /// Show progress bar and debug logs.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            paths: vec![PathBuf::from(".")],
            exclude: Vec::new(),
            extensions: CheckerDefaults::EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            process_limit: SchedulerConsts::default_process_limit(),
            cache_path: None,
            use_cache: true,
            task_timeout: None,
            checker: CheckerConfig::default(),
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_hex_is_64_chars_and_parses_back() {
        let fp = Fingerprint::of_bytes(b"<?php echo 1;");
        let hex = fp.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Fingerprint::from_hex(&hex), Some(fp));
    }

    #[test]
    fn fingerprint_rejects_garbage() {
        assert_eq!(Fingerprint::from_hex("d41d8cd98f00b204e9800998ecf8427e"), None);
        assert_eq!(Fingerprint::from_slice(&[0u8; 16]), None);
    }

    #[test]
    fn from_path_missing_file_is_invalid_input() {
        let err = FileRef::from_path(Path::new("/definitely/not/here.php")).unwrap_err();
        assert!(matches!(err, LintError::InvalidInput { .. }));
    }

    #[test]
    fn from_path_keeps_given_path_as_key() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.php");
        std::fs::write(&file, "<?php").unwrap();
        let r = FileRef::from_path(&file).unwrap();
        assert_eq!(r.key, path_to_key(&file));
        assert_eq!(r.path, file.canonicalize().unwrap());
    }

    #[test]
    fn default_checker_is_php_lint() {
        let c = CheckerConfig::default();
        assert_eq!(c.program, "php");
        assert_eq!(c.args.last().map(String::as_str), Some("-l"));
    }
}
