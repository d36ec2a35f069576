//! CLI command handler: merge config file and flags, lint, print the report.

use anyhow::{Context, Result};
use kdam::Animation;
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::Opts;
use crate::engine::arg_parser::Cli;
use crate::engine::progress::{
    ProgressBarConfig, create_progress_bar, finish_bar, set_bar_desc, update_progress_bar,
};
use crate::linter::Linter;
use crate::report::print_report;
use crate::utils::parlint_toml::{apply_file_to_opts, load_parlint_toml};
use crate::utils::setup_logging;
use crate::{LintError, Status};

/// Defaults, then `.parlint.toml`, then flags. Logging is set up once verbosity is known.
fn setup_opts(cli: &Cli) -> Opts {
    let mut opts = Opts::default();
    let config_path = cli.config_path();
    let file = load_parlint_toml(&config_path);
    if let Some(ref f) = file {
        apply_file_to_opts(f, &mut opts);
    }

    if !cli.paths.is_empty() {
        opts.paths = cli.paths.clone();
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    if !cli.extensions.is_empty() {
        opts.extensions = cli
            .extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect();
    }
    if let Some(jobs) = cli.jobs {
        opts.process_limit = jobs;
    }
    if let Some(ref cache) = cli.cache {
        opts.cache_path = Some(cache.clone());
    }
    if cli.no_cache {
        opts.use_cache = false;
    }
    if let Some(secs) = cli.timeout {
        opts.task_timeout = Some(Duration::from_secs(secs));
    }
    if let Some(ref php) = cli.php {
        opts.checker.program = php.clone();
    }
    opts.verbose = cli
        .verbose
        .or_else(|| file.as_ref().and_then(|f| f.verbose()))
        .unwrap_or(opts.verbose);

    setup_logging(opts.verbose);
    if file.is_some() {
        debug!("loaded config from {}", config_path.display());
    }
    opts
}

/// Ctrl-C raises the flag; the scheduler kills its running checkers and returns.
fn install_cancel_flag() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);
    if let Err(e) = ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst)) {
        warn!("could not install Ctrl-C handler: {}", e);
    }
    flag
}

/// Lint everything the options select. Returns true when any file failed.
pub fn handle_run(cli: &Cli) -> Result<bool> {
    let opts = setup_opts(cli);
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        opts
    );

    let mut linter = Linter::from_opts(&opts).with_context(|| {
        format!(
            "failed to set up the linter (cache: {})",
            opts.cache_path
                .as_deref()
                .unwrap_or(Path::new("default"))
                .display()
        )
    })?;
    linter.set_cancel_flag(install_cancel_flag());

    let files = linter.get_files();
    if opts.verbose && !files.is_empty() {
        let bar = create_progress_bar(ProgressBarConfig::new(
            files.len(),
            "Linting",
            Animation::FillUp,
        ));
        let cb_bar = Arc::clone(&bar);
        let mut failed = false;
        linter.set_process_callback(move |status, _file| {
            if status == Status::Error && !failed {
                failed = true;
                set_bar_desc(&cb_bar, "Linting (errors)");
            }
            update_progress_bar(&cb_bar, 1);
        });
        let result = linter.lint(files, opts.use_cache);
        finish_bar(&bar, linter.stats().skipped);
        return report(result, &linter);
    }

    let result = linter.lint(files, opts.use_cache);
    report(result, &linter)
}

fn report(result: Result<crate::RunResult, LintError>, linter: &Linter) -> Result<bool> {
    match result {
        Ok(errors) => {
            print_report(&errors, linter.stats());
            Ok(!errors.is_empty())
        }
        Err(LintError::Cancelled) => {
            warn!("Interrupted; cache left unchanged.");
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
