#![deny(
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
//! `pfind` - prints every entry under a directory whose permission string
//! matches exactly.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use clap::Parser;
use permfind::cli::Cli;
use permfind::crawler::{Crawler, Progress};
use permfind::error::Result;
use permfind::logging;

/// Validate the root, then walk it
fn scan(cli: &Cli) -> Result<Progress> {
    let crawler = Crawler::new(&cli.directory, cli.permissions)?;
    let mut out = BufWriter::new(io::stdout().lock());
    let mut err = io::stderr().lock();
    crawler.run(&mut out, &mut err)
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match scan(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            // stderr may already be closed by whoever was reading it
            let _ = writeln!(io::stderr(), "{e}");
            ExitCode::FAILURE
        },
    }
}
