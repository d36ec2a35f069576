//! Parlint CLI: lint files in parallel; exits 1 when any file fails.

use anyhow::Result;
use clap::Parser;
use parlint::engine::arg_parser::Cli;
use parlint::engine::handle_run;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> Result<ExitCode> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    let failed = handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
