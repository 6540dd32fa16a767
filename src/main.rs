#![deny(
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
//! `spfind` - runs `pfind` through `sort`, forwards its diagnostics and
//! totals the matches.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use permfind::cli::Cli;
use permfind::error::Result;
use permfind::logging;
use permfind::orchestrator::Pipeline;
use permfind::report::RunResult;

/// Forward our own arguments, untouched, to the scanner next to us
fn run() -> Result<RunResult> {
    let pipeline = Pipeline::sibling_scanner(env::args_os().skip(1))?;
    pipeline.run(&mut io::stdout(), &mut io::stderr())
}

fn main() -> ExitCode {
    logging::init();

    // argument errors end the run here, before anything is spawned
    let _cli = Cli::parse();

    match run() {
        Ok(result) => result.exit_code(),
        Err(e) => {
            // stderr may already be closed by whoever was reading it
            let _ = writeln!(io::stderr(), "{e}");
            ExitCode::FAILURE
        },
    }
}
