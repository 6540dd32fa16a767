//! Error types for `permfind`

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::stream::Channel;

/// Custom result type for `permfind` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors: argument, setup and forwarding failures
///
/// Every message is complete as displayed; the binaries print it verbatim.
/// Non-fatal traversal problems are [`crate::crawler::Diagnostic`]s instead.
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed
    #[error("Error: {0}")]
    Io(#[from] io::Error),

    /// Permission string has the wrong length or a foreign character
    #[error("Error: Permissions string '{0}' is invalid.")]
    InvalidPattern(String),

    /// Search root could not be stat'ed
    #[error("Error: Cannot stat '{}'. {source}.", .path.display())]
    RootStat {
        /// Root as given
        path:   PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// Search root exists but is not a directory
    #[error("Error: '{}' is not a directory.", .0.display())]
    NotADirectory(PathBuf),

    /// Search root could not be opened for listing
    #[error("Error: Cannot open directory '{}'. {source}.", .path.display())]
    RootUnreadable {
        /// Root as given
        path:   PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// The directory of the running executable could not be determined
    #[error("Error: Cannot locate the scanner binary. {0}.")]
    ScannerLocation(io::Error),

    /// A child process could not be launched
    #[error("Error: Failed to launch '{program}'. {source}.")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying failure
        source:  io::Error,
    },

    /// A child was spawned without the pipe it was asked for
    #[error("Error: Failed to create pipes for {0}.")]
    Pipe(&'static str),

    /// Copying a child's stream to our own failed
    #[error("Error: Failed to forward {channel} stream. {source}.")]
    Forward {
        /// Channel that failed
        channel: Channel,
        /// Underlying failure
        source:  io::Error,
    },

    /// A child process could not be reaped
    #[error("Error: Failed to wait for '{program}'. {source}.")]
    Reap {
        /// Program being reaped
        program: String,
        /// Underlying failure
        source:  io::Error,
    },
}
