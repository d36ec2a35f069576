pub mod config;
pub mod fd_limit;
pub mod logger;
pub mod parlint_toml;
pub mod tempfiles;

pub use config::*;
pub use fd_limit::{FDS_PER_TASK, effective_process_limit, max_open_fds};
pub use logger::{Colors, setup_logging};
pub use tempfiles::{temp_path_for, write_atomic};
