//! Child process handles for the pipeline stages

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, ChildStderr, ChildStdout, Command, ExitStatus, Stdio};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::SORTER_PROGRAM;

/// A program to launch: path or name, arguments, extra environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    program: OsString,
    args:    Vec<OsString>,
    envs:    Vec<(OsString, OsString)>,
}

impl Stage {
    /// Launch `program` with no arguments
    pub fn new(program: impl Into<OsString>) -> Self {
        Self { program: program.into(), args: Vec::new(), envs: Vec::new() }
    }

    /// The default sorter: `sort` with byte-order collation
    #[must_use]
    pub fn sorter() -> Self {
        Self::new(SORTER_PROGRAM).env("LC_ALL", "C")
    }

    /// Append arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set one environment variable for the child
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Program as given
    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.envs(self.envs.iter().map(|(k, v)| (k, v)));
        cmd
    }
}

/// Which part of the pipeline a child plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Walks the tree and emits matches
    Scanner,
    /// Orders the matches
    Sorter,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scanner => "scanner",
            Self::Sorter => "sorter",
        })
    }
}

/// Where each standard stream of a child goes
#[derive(Debug)]
pub struct Redirect {
    /// Source of the child's stdin
    pub stdin:  Stdio,
    /// Destination of the child's stdout
    pub stdout: Stdio,
    /// Destination of the child's stderr
    pub stderr: Stdio,
}

/// How a child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with a status code
    Exited(i32),
    /// Killed by a signal, when the platform reports one
    Signaled(Option<i32>),
}

impl ExitOutcome {
    /// Normal exit with status zero
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        status.code().map_or_else(|| Self::Signaled(status.signal()), Self::Exited)
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exit status {code}"),
            Self::Signaled(Some(signal)) => write!(f, "signal {signal}"),
            Self::Signaled(None) => f.write_str("abnormal termination"),
        }
    }
}

/// An owned, running child
///
/// The handle is consumed by [`ChildProcess::reap`] or
/// [`ChildProcess::abandon`], so the exit status is collected exactly once.
#[derive(Debug)]
pub struct ChildProcess {
    role:    Role,
    program: String,
    child:   Child,
}

impl ChildProcess {
    /// Launch `stage` with the given redirections
    ///
    /// The `Command` holding the redirections is dropped before returning, so
    /// any pipe end handed to the child is no longer open in this process.
    /// Pipes created here are close-on-exec and do not leak into later
    /// children.
    ///
    /// # Errors
    /// Returns [`Error::Spawn`] if the program cannot be executed.
    pub fn spawn(role: Role, stage: &Stage, redirect: Redirect) -> Result<Self> {
        let program = stage.program().to_string_lossy().into_owned();
        let child = {
            let mut cmd = stage.command();
            cmd.stdin(redirect.stdin).stdout(redirect.stdout).stderr(redirect.stderr);
            cmd.spawn().map_err(|source| Error::Spawn { program: program.clone(), source })?
        };
        debug!(%role, pid = child.id(), program = %program, "spawned");
        Ok(Self { role, program, child })
    }

    /// Role in the pipeline
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// OS process id
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Take the read end of the child's stdout pipe
    ///
    /// # Errors
    /// Returns [`Error::Pipe`] if stdout was not piped or was already taken.
    pub fn take_stdout(&mut self) -> Result<ChildStdout> {
        self.child.stdout.take().ok_or(Error::Pipe("stdout"))
    }

    /// Take the read end of the child's stderr pipe
    ///
    /// # Errors
    /// Returns [`Error::Pipe`] if stderr was not piped or was already taken.
    pub fn take_stderr(&mut self) -> Result<ChildStderr> {
        self.child.stderr.take().ok_or(Error::Pipe("stderr"))
    }

    /// Block until the child exits and record how it ended
    ///
    /// # Errors
    /// Returns [`Error::Reap`] if waiting fails.
    pub fn reap(mut self) -> Result<ExitOutcome> {
        let status = self
            .child
            .wait()
            .map_err(|source| Error::Reap { program: self.program.clone(), source })?;
        let outcome = ExitOutcome::from(status);
        debug!(role = %self.role, pid = self.id(), %outcome, "reaped");
        Ok(outcome)
    }

    /// Kill and reap a child that is no longer wanted
    ///
    /// Used on error paths so no process is left running or unreaped.
    pub fn abandon(mut self) {
        drop(self.child.stdout.take());
        drop(self.child.stderr.take());
        if let Err(e) = self.child.kill() {
            warn!(role = %self.role, pid = self.id(), error = %e, "failed to kill");
        }
        if let Err(e) = self.child.wait() {
            warn!(role = %self.role, pid = self.id(), error = %e, "failed to reap");
        }
    }
}
