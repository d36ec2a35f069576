//! The public linter: file-set state, cache, callback, and the `lint` entry point.

use indexmap::IndexMap;
use log::{debug, info, warn};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crate::cache::{CacheStore, ResultCache, open_store};
use crate::engine::task::{Checker, ProcessChecker};
use crate::error::LintError;
use crate::pipeline::walk::FileSet;
use crate::pipeline::{SchedulerParams, run_scheduler};
use crate::utils::config::{PackagePaths, SchedulerConsts};
use crate::utils::effective_process_limit;
use crate::{FileInput, FileRef, Opts, RunResult, RunStats, Status};

/// Per-file outcome callback. Called once per checked file, never for cache hits.
pub type ProcessCallback = Box<dyn FnMut(Status, &FileRef)>;

/// Checks a set of files with a bounded pool of checker processes.
///
/// ```ignore
/// let mut linter = parlint::Linter::new(["src"], vec!["vendor".into()], vec!["php".into()]);
/// linter.set_process_limit(NonZeroUsize::new(8).unwrap());
/// let errors = linter.lint(Vec::new(), false)?;
/// ```
pub struct Linter {
    file_set: FileSet,
    /// Memoized enumeration, keyed by real path so a file is listed once.
    files: IndexMap<PathBuf, FileRef>,
    cache: ResultCache,
    store: Option<Box<dyn CacheStore>>,
    checker: Box<dyn Checker>,
    process_callback: Option<ProcessCallback>,
    process_limit: NonZeroUsize,
    task_timeout: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
    stats: RunStats,
}

impl Linter {
    /// Enumeration of `paths` is deferred until [`get_files`](Self::get_files) or `lint` needs it.
    pub fn new<I, P>(paths: I, exclude: Vec<String>, extensions: Vec<String>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            file_set: FileSet {
                paths: paths.into_iter().map(Into::into).collect(),
                exclude,
                extensions,
            },
            files: IndexMap::new(),
            cache: ResultCache::new(),
            store: None,
            checker: Box::new(ProcessChecker::default()),
            process_callback: None,
            process_limit: SchedulerConsts::default_process_limit(),
            task_timeout: None,
            cancel: None,
            stats: RunStats::default(),
        }
    }

    /// Build a linter from full options: checker, limits, and (when `use_cache`) the cache store
    /// with its current contents loaded. An unreadable cache is logged and treated as empty.
    pub fn from_opts(opts: &Opts) -> Result<Self, LintError> {
        let mut linter = Self::new(
            opts.paths.clone(),
            opts.exclude.clone(),
            opts.extensions.clone(),
        );
        linter
            .set_checker(Box::new(ProcessChecker::from_config(&opts.checker)?))
            .set_process_limit(opts.process_limit)
            .set_task_timeout(opts.task_timeout);

        if opts.use_cache {
            let path = opts
                .cache_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(PackagePaths::get().cache_filename()));
            let store = open_store(&path)?;
            let cache = store.load().unwrap_or_else(|e| {
                warn!("{}: {}; starting with an empty cache", path.display(), e);
                ResultCache::new()
            });
            debug!("loaded {} cache entries from {}", cache.len(), path.display());
            linter.set_cache(cache).set_cache_store(store);
        }
        Ok(linter)
    }

    /// Check `files` (or every enumerated file when `files` is empty) and return the failures.
    ///
    /// With `use_cache`, files whose fingerprint matches the cache are skipped, and afterwards
    /// the cache is replaced by this run's entries (hits carried forward plus fresh passes) and
    /// persisted to the store. Files that failed, or were not part of this run, drop out.
    pub fn lint(&mut self, files: Vec<FileRef>, use_cache: bool) -> Result<RunResult, LintError> {
        let files = if files.is_empty() {
            self.get_files()
        } else {
            files
        };
        let process_limit = effective_process_limit(self.process_limit.get());
        debug!(
            "linting {} files, {} processes, cache {}",
            files.len(),
            process_limit,
            if use_cache { "on" } else { "off" }
        );

        let mut noop = |_: Status, _: &FileRef| {};
        let on_event: &mut dyn FnMut(Status, &FileRef) = match self.process_callback.as_mut() {
            Some(cb) => cb.as_mut(),
            None => &mut noop,
        };
        let outcome = run_scheduler(
            files,
            SchedulerParams {
                checker: self.checker.as_ref(),
                cache: use_cache.then_some(&self.cache),
                process_limit,
                task_timeout: self.task_timeout,
                cancel: self.cancel.as_deref(),
                on_event,
            },
        )?;

        let stats = &outcome.stats;
        info!(
            "{} files: {} checked ({} passed, {} failed), {} unchanged",
            stats.files,
            stats.checked(),
            stats.passed,
            stats.failed,
            stats.skipped
        );
        self.stats = outcome.stats;

        if use_cache && self.stats.files > 0 {
            if let Some(store) = self.store.as_mut() {
                store.save(&outcome.replacement)?;
            }
            self.cache = outcome.replacement;
        }
        Ok(outcome.errors)
    }

    /// Add files to lint. Each entry is a path to an existing file or an already built FileRef;
    /// anything else fails with [`LintError::InvalidInput`] before any file is added.
    pub fn set_files<I, F>(&mut self, files: I) -> Result<&mut Self, LintError>
    where
        I: IntoIterator<Item = F>,
        F: Into<FileInput>,
    {
        let resolved = files
            .into_iter()
            .map(|f| f.into().resolve())
            .collect::<Result<Vec<_>, _>>()?;
        for file in resolved {
            self.files.insert(file.path.clone(), file);
        }
        Ok(self)
    }

    /// The files `lint` covers by default. Enumerated from the configured paths on first call
    /// (or whenever the list is still empty) and memoized.
    pub fn get_files(&mut self) -> Vec<FileRef> {
        if self.files.is_empty() {
            for file in self.file_set.discover() {
                self.files.entry(file.path.clone()).or_insert(file);
            }
        }
        self.files.values().cloned().collect()
    }

    pub fn set_cache(&mut self, cache: ResultCache) -> &mut Self {
        self.cache = cache;
        self
    }

    /// Where the replacement cache is persisted after a cached run.
    pub fn set_cache_store(&mut self, store: Box<dyn CacheStore>) -> &mut Self {
        self.store = Some(store);
        self
    }

    pub fn set_process_callback<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(Status, &FileRef) + 'static,
    {
        self.process_callback = Some(Box::new(callback));
        self
    }

    pub fn set_process_limit(&mut self, limit: NonZeroUsize) -> &mut Self {
        self.process_limit = limit;
        self
    }

    pub fn set_checker(&mut self, checker: Box<dyn Checker>) -> &mut Self {
        self.checker = checker;
        self
    }

    /// Kill any checker that runs longer than `timeout`; the file is reported as failed.
    pub fn set_task_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.task_timeout = timeout;
        self
    }

    /// When the flag goes true, `lint` kills its running checkers and returns
    /// [`LintError::Cancelled`] without persisting anything.
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) -> &mut Self {
        self.cancel = Some(flag);
        self
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Counters from the last `lint` call.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}
