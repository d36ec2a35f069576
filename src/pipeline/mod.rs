//! Pipeline components: file discovery and the fill/drain scheduler.

pub mod scheduler;
pub mod walk;

pub use scheduler::{RunOutcome, SchedulerParams, run_scheduler};
pub use walk::FileSet;
