//! Supervisor for the scanner → sorter pipeline
//!
//! ```text
//!            stdout                 stdout
//! scanner ───────────▶ sorter ───────────▶ [sorted listener] ─▶ our stdout
//!    │ stderr
//!    └───────────────────────────────────▶ [diagnostics listener] ─▶ our stderr
//! ```
//!
//! Each listener owns one read end and drains it to EOF on its own thread,
//! then reports on a shared channel. Both children are reaped only after both
//! listeners are done.

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::process::{ChildStderr, ChildStdout, Stdio};
use std::thread;

use crossbeam_channel::Receiver;
use tracing::debug;

use crate::error::{Error, Result};
use crate::process::{ChildProcess, Redirect, Role, Stage};
use crate::report::RunResult;
use crate::stream::{self, Channel, Finished, Tally};
use crate::types::SCANNER_BIN;

/// The two stages to run and how to reach them
#[derive(Debug, Clone)]
pub struct Pipeline {
    scanner: Stage,
    sorter:  Stage,
}

impl Pipeline {
    /// Pipe `scanner` through the default sorter
    #[must_use]
    pub fn new(scanner: Stage) -> Self {
        Self { scanner, sorter: Stage::sorter() }
    }

    /// Replace the sorter stage
    #[must_use]
    pub fn with_sorter(mut self, sorter: Stage) -> Self {
        self.sorter = sorter;
        self
    }

    /// Scanner binary installed next to the running executable, given `args`
    ///
    /// # Errors
    /// Returns [`Error::ScannerLocation`] if the executable's directory is
    /// unknown.
    pub fn sibling_scanner<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let exe = env::current_exe().map_err(Error::ScannerLocation)?;
        let dir = exe.parent().ok_or_else(|| {
            Error::ScannerLocation(io::Error::new(
                io::ErrorKind::NotFound,
                "executable has no parent directory",
            ))
        })?;
        Ok(Self::new(Stage::new(dir.join(SCANNER_BIN)).args(args)))
    }

    /// The scanner stage
    #[must_use]
    pub const fn scanner(&self) -> &Stage {
        &self.scanner
    }

    /// The sorter stage
    #[must_use]
    pub const fn sorter(&self) -> &Stage {
        &self.sorter
    }

    /// Run the pipeline to completion
    ///
    /// Sorted lines go to `out` followed by the summary line; the scanner's
    /// diagnostics go to `err`. Both are written chunk by chunk as they
    /// arrive.
    ///
    /// # Errors
    /// Returns error if a stage cannot be launched, a stream cannot be
    /// forwarded, a child cannot be reaped, or the summary cannot be written.
    /// A failed verdict is not an error; see [`RunResult::is_success`].
    pub fn run<O, E>(&self, out: &mut O, err: &mut E) -> Result<RunResult>
    where
        O: Write + Send + ?Sized,
        E: Write + Send + ?Sized,
    {
        let mut scanner = ChildProcess::spawn(Role::Scanner, &self.scanner, Redirect {
            stdin:  Stdio::null(),
            stdout: Stdio::piped(),
            stderr: Stdio::piped(),
        })?;
        let pipes = scanner.take_stdout().and_then(|stdout| Ok((stdout, scanner.take_stderr()?)));
        let (to_sorter, diagnostics) = match pipes {
            Ok(pipes) => pipes,
            Err(e) => {
                scanner.abandon();
                return Err(e);
            },
        };

        // the read end moves into the sorter and is closed here once spawned
        let sorter = ChildProcess::spawn(Role::Sorter, &self.sorter, Redirect {
            stdin:  Stdio::from(to_sorter),
            stdout: Stdio::piped(),
            stderr: Stdio::inherit(),
        });
        let mut sorter = match sorter {
            Ok(sorter) => sorter,
            Err(e) => {
                drop(diagnostics);
                scanner.abandon();
                return Err(e);
            },
        };
        let sorted = match sorter.take_stdout() {
            Ok(sorted) => sorted,
            Err(e) => {
                drop(diagnostics);
                sorter.abandon();
                scanner.abandon();
                return Err(e);
            },
        };

        let drained = multiplex(sorted, diagnostics, &mut *out, &mut *err);
        let scanner = scanner.reap();
        let sorter = sorter.reap();
        let (sorted, diagnostics) = drained?;

        let result = RunResult {
            line_count:      sorted.newlines,
            had_diagnostics: diagnostics.is_active(),
            scanner:         scanner?,
            sorter:          sorter?,
        };
        writeln!(out, "{}", result.summary())?;
        out.flush()?;

        for failure in result.failures() {
            debug!(%failure, "run failed");
        }
        Ok(result)
    }
}

/// Drain both channels concurrently until each reaches EOF
fn multiplex<O, E>(
    sorted: ChildStdout,
    diagnostics: ChildStderr,
    out: &mut O,
    err: &mut E,
) -> Result<(Tally, Tally)>
where
    O: Write + Send + ?Sized,
    E: Write + Send + ?Sized,
{
    let (done, finished) = crossbeam_channel::bounded(2);
    thread::scope(|scope| {
        let sorted_done = done.clone();
        scope.spawn(move || stream::listen(Channel::Sorted, sorted, out, &sorted_done));
        scope.spawn(move || stream::listen(Channel::Diagnostics, diagnostics, err, &done));
        collect(&finished)
    })
}

/// Wait for both listeners to report
///
/// Returns once every sender is gone, so a listener that stopped early does
/// not cut the other one short.
fn collect(finished: &Receiver<Finished>) -> Result<(Tally, Tally)> {
    let mut sorted = Tally::default();
    let mut diagnostics = Tally::default();
    let mut failure = None;

    for Finished { channel, result } in finished {
        match result {
            Ok(tally) => match channel {
                Channel::Sorted => sorted = tally,
                Channel::Diagnostics => diagnostics = tally,
            },
            Err(source) => {
                if failure.is_none() {
                    failure = Some(Error::Forward { channel, source });
                }
            },
        }
    }

    failure.map_or(Ok((sorted, diagnostics)), Err)
}
