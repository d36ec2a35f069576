//! Engine module: checker processes, output parsing, hashing, CLI plumbing

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod output;
pub mod progress;
pub mod task;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use hashing::fingerprint_file;
pub use output::OutputParser;
pub use task::{CheckTask, Checker, ProcessChecker, ProcessTask, Verdict};
pub use tools::{glob_match, path_relative_to, path_to_key};
