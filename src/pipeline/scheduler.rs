//! Fill/drain control loop: keeps up to `process_limit` checks in flight, skips files whose
//! fingerprint is cached, and reports completions in the order they happen.

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, warn};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::cache::ResultCache;
use crate::engine::hashing::fingerprint_file;
use crate::engine::task::{CheckTask, Checker, Verdict};
use crate::error::LintError;
use crate::utils::config::SchedulerConsts;
use crate::{Diagnostic, FileRef, Fingerprint, RunResult, RunStats, Status};

/// Everything one run needs besides the file list.
pub struct SchedulerParams<'a> {
    pub checker: &'a dyn Checker,
    /// Cache to consult during fill. None disables cache-skipping.
    pub cache: Option<&'a ResultCache>,
    pub process_limit: usize,
    pub task_timeout: Option<Duration>,
    pub cancel: Option<&'a AtomicBool>,
    pub on_event: &'a mut dyn FnMut(Status, &FileRef),
}

/// What a finished run hands back: failures, the replacement cache, counters.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub errors: RunResult,
    pub replacement: ResultCache,
    pub stats: RunStats,
}

/// A file bound to its in-flight task.
struct TaskRecord {
    task: Box<dyn CheckTask>,
    started: Instant,
}

struct Scheduler<'a> {
    params: SchedulerParams<'a>,
    pending: VecDeque<FileRef>,
    running: Vec<TaskRecord>,
    done_tx: Sender<()>,
    done_rx: Receiver<()>,
    outcome: RunOutcome,
}

/// Run every file through the checker (or the cache) and return once nothing is pending or running.
///
/// Duplicate paths in `files` are checked once. On cancellation all running tasks are killed and
/// [`LintError::Cancelled`] is returned.
pub fn run_scheduler(files: Vec<FileRef>, params: SchedulerParams<'_>) -> Result<RunOutcome, LintError> {
    let mut seen = HashSet::new();
    let pending: VecDeque<FileRef> = files
        .into_iter()
        .filter(|f| {
            let first = seen.insert(f.path.clone());
            if !first {
                debug!("dropping duplicate {}", f.path.display());
            }
            first
        })
        .collect();

    let (done_tx, done_rx) = unbounded();
    let mut scheduler = Scheduler {
        outcome: RunOutcome {
            stats: RunStats {
                files: pending.len(),
                ..RunStats::default()
            },
            ..RunOutcome::default()
        },
        params,
        pending,
        running: Vec::new(),
        done_tx,
        done_rx,
    };
    scheduler.run()?;
    Ok(scheduler.outcome)
}

impl Scheduler<'_> {
    fn run(&mut self) -> Result<(), LintError> {
        let limit = self.params.process_limit.max(1);
        while !self.pending.is_empty() || !self.running.is_empty() {
            if self.cancel_requested() {
                self.abort();
                return Err(LintError::Cancelled);
            }
            self.fill(limit);
            let completed = self.drain();
            if completed == 0 && !self.running.is_empty() {
                // Reader threads signal on EOF; the timeout bounds the wait for anything else.
                let _ = self.done_rx.recv_timeout(SchedulerConsts::POLL_INTERVAL);
            }
        }
        Ok(())
    }

    fn cancel_requested(&self) -> bool {
        self.params
            .cancel
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Start tasks until the running set is full or nothing is pending. Cache hits are carried
    /// into the replacement cache without starting anything.
    fn fill(&mut self, limit: usize) {
        while self.running.len() < limit {
            let Some(file) = self.pending.pop_front() else {
                break;
            };
            if let Some(fp) = self.cached_fingerprint(&file) {
                debug!("cache hit: {}", file.key);
                self.outcome.replacement.insert(file.key, fp);
                self.outcome.stats.skipped += 1;
                continue;
            }
            match self.params.checker.start(&file, self.done_tx.clone()) {
                Ok(task) => {
                    self.running.push(TaskRecord {
                        task,
                        started: Instant::now(),
                    });
                    let stats = &mut self.outcome.stats;
                    stats.spawned += 1;
                    stats.peak_running = stats.peak_running.max(self.running.len());
                }
                Err(err) => {
                    warn!("{}", err);
                    let diag = Diagnostic::spawn_failure(&file, &err);
                    self.resolve(file, Verdict::Failed(diag));
                }
            }
        }
    }

    /// Fingerprint to carry forward if the cache is on and the file is unchanged.
    fn cached_fingerprint(&self, file: &FileRef) -> Option<Fingerprint> {
        let cache = self.params.cache?;
        if !cache.contains_key(&file.key) {
            return None;
        }
        match fingerprint_file(&file.path) {
            Ok(current) if cache.contains_valid(&file.key, &current) => Some(current),
            Ok(_) => None,
            Err(e) => {
                warn!("{}; rechecking", e);
                None
            }
        }
    }

    /// Poll every running task once; resolve the finished ones. Returns how many finished.
    fn drain(&mut self) -> usize {
        let mut completed = 0;
        let mut i = 0;
        while i < self.running.len() {
            match poll_record(&mut self.running[i], self.params.task_timeout) {
                None => i += 1,
                Some(verdict) => {
                    let record = self.running.remove(i);
                    let file = record.task.file().clone();
                    self.resolve(file, verdict);
                    completed += 1;
                }
            }
        }
        completed
    }

    fn resolve(&mut self, file: FileRef, verdict: Verdict) {
        match verdict {
            Verdict::Failed(diag) => {
                debug!("{}: {} ({})", file.key, diag.kind, diag.message);
                (self.params.on_event)(Status::Error, &file);
                self.outcome.errors.insert(file.path, diag);
                self.outcome.stats.failed += 1;
            }
            Verdict::Passed => {
                (self.params.on_event)(Status::Ok, &file);
                self.outcome.stats.passed += 1;
                match fingerprint_file(&file.path) {
                    Ok(fp) => {
                        self.outcome.replacement.insert(file.key, fp);
                    }
                    Err(e) => warn!("{}; not cached", e),
                }
            }
        }
    }

    /// Drop everything: pending files are forgotten, running tasks killed and reaped.
    fn abort(&mut self) {
        debug!(
            "cancelling: {} pending, {} running",
            self.pending.len(),
            self.running.len()
        );
        self.pending.clear();
        for mut record in self.running.drain(..) {
            record.task.kill();
        }
    }
}

/// Some(verdict) once the task is done, or once it outlived the deadline and was killed.
fn poll_record(record: &mut TaskRecord, timeout: Option<Duration>) -> Option<Verdict> {
    if !record.task.is_running() {
        return Some(record.task.verdict());
    }
    let limit = timeout?;
    if record.started.elapsed() < limit {
        return None;
    }
    warn!("{} timed out after {:?}, killing checker", record.task.file().key, limit);
    let output = record.task.kill();
    Some(Verdict::Failed(Diagnostic::timeout(
        record.task.file(),
        limit,
        output,
    )))
}
