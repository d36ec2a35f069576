use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::utils::config::PackagePaths;

/// Parallel syntax linter with a content-fingerprint cache.
#[derive(Clone, Parser)]
#[command(name = "parlint")]
#[command(about = "Check files for syntax errors with a pool of checker processes; unchanged files are skipped.")]
pub struct Cli {
    /// Files or directories to lint. Default: current directory (or `paths` from the config file).
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Path to the config file. Default: `.parlint.toml` in the working directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Exclude patterns (glob syntax, or plain text matched anywhere in the relative path). Can specify multiple: -e vendor "*.tpl.php"
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// File extensions to collect from directories (without the dot). Default: php.
    #[arg(long, num_args = 1..)]
    pub extensions: Vec<String>,

    /// Number of checker processes to run at once. Default: 5.
    #[arg(long, short = 'j')]
    pub jobs: Option<NonZeroUsize>,

    /// Cache file. A `.json` extension selects the JSON store, anything else SQLite. Default: `.parlint`.
    #[arg(long, short = 'c')]
    pub cache: Option<PathBuf>,

    /// Check every file and leave the cache untouched.
    #[arg(long)]
    pub no_cache: bool,

    /// Kill a checker that runs longer than this many seconds and report the file as failed.
    #[arg(long, short = 't')]
    pub timeout: Option<u64>,

    /// Checker program (PHP binary). Default: `php` from PATH.
    #[arg(long)]
    pub php: Option<String>,

    /// Verbose output (progress bar and debug logs).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}

impl Cli {
    /// Get the config file path, defaulting to the package config filename in the working directory.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(PackagePaths::get().config_filename()))
    }
}
