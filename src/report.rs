//! Run results and the success/failure verdict

use std::fmt;
use std::process::ExitCode;

use crate::process::{ExitOutcome, Role};
use crate::types::SUMMARY_PREFIX;

/// Aggregate outcome of one pipeline run
///
/// Built once, after both channels reached EOF and both children were reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    /// Newlines seen on the sorted stream
    pub line_count:      u64,
    /// Whether the scanner wrote anything to its error stream
    pub had_diagnostics: bool,
    /// How the scanner ended
    pub scanner:         ExitOutcome,
    /// How the sorter ended
    pub sorter:          ExitOutcome,
}

/// One reason a run counts as failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// The scanner reported at least one diagnostic
    Diagnostics,
    /// A child ended abnormally or with a non-zero status
    Child(Role, ExitOutcome),
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Diagnostics => f.write_str("scanner reported diagnostics"),
            Self::Child(role, outcome) => write!(f, "{role} ended with {outcome}"),
        }
    }
}

impl RunResult {
    /// Every reason the run failed; empty means success
    #[must_use]
    pub fn failures(&self) -> Vec<Failure> {
        let mut failures = Vec::new();
        if self.had_diagnostics {
            failures.push(Failure::Diagnostics);
        }
        for (role, outcome) in [(Role::Scanner, self.scanner), (Role::Sorter, self.sorter)] {
            if !outcome.is_success() {
                failures.push(Failure::Child(role, outcome));
            }
        }
        failures
    }

    /// No diagnostics and both children exited zero
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.had_diagnostics && self.scanner.is_success() && self.sorter.is_success()
    }

    /// The closing `Total matches: <N>` line, without newline
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{SUMMARY_PREFIX}{}", self.line_count)
    }

    /// Process exit code for the verdict
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
    }
}
