//! Directory crawler that matches entries against a permission string

use std::fs;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::error::{Error, Result};
use crate::permissions::PermissionString;
use crate::types::MAX_PATH_LENGTH;

/// A non-fatal problem met during traversal
///
/// The affected entry is skipped and the walk carries on. Displayed as one
/// line on the scanner's error stream.
#[derive(Debug, Error)]
pub enum Diagnostic {
    /// A directory could not be listed
    #[error("Error: Cannot open directory '{}'. {source}.", .path.display())]
    CannotOpenDir {
        /// Directory that failed
        path:   PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// An entry could not be read from a listing
    #[error("Error: Cannot read entry in '{}'. {source}.", .dir.display())]
    ReadEntry {
        /// Directory being listed
        dir:    PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// Joining directory and entry name would exceed [`MAX_PATH_LENGTH`]
    #[error("Error: Path too long when trying to access '{}'.", .path.display())]
    PathTooLong {
        /// The over-long path
        path: PathBuf,
    },

    /// An entry could not be `lstat`ed
    #[error("Error: Cannot stat '{}'. {source}.", .path.display())]
    CannotStat {
        /// Entry that failed
        path:   PathBuf,
        /// Underlying failure
        source: io::Error,
    },
}

/// Everything learned from listing one directory
#[derive(Debug, Default)]
pub struct DirReport {
    /// Entries whose permission string matched, in listing order
    pub matches:     Vec<PathBuf>,
    /// Problems met while listing
    pub diagnostics: Vec<Diagnostic>,
}

/// Counters for a walk in progress
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Entries inspected
    pub entries:     usize,
    /// Entries that matched
    pub matches:     usize,
    /// Directories listed or queued, the root included
    pub directories: usize,
    /// Diagnostics produced
    pub diagnostics: usize,
}

/// Check that `root` exists, is a directory and can be listed
///
/// Symbolic links are followed for the root only.
///
/// # Errors
/// Returns [`Error::RootStat`], [`Error::NotADirectory`] or
/// [`Error::RootUnreadable`].
pub fn validate_root(root: &Path) -> Result<()> {
    let metadata = fs::metadata(root)
        .map_err(|source| Error::RootStat { path: root.to_path_buf(), source })?;
    if !metadata.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    fs::read_dir(root)
        .map_err(|source| Error::RootUnreadable { path: root.to_path_buf(), source })?;
    Ok(())
}

/// Whether `dir/name` plus a terminator fits in [`MAX_PATH_LENGTH`]
fn fits_path_limit(dir: &Path, name: &[u8]) -> bool {
    dir.as_os_str().len() + name.len() + 2 <= MAX_PATH_LENGTH
}

/// Depth-first crawler over a directory tree
///
/// Entries are inspected with `lstat`; symbolic links are matched like any
/// other entry but never descended through.
#[derive(Debug)]
pub struct Crawler {
    /// Permission string entries are compared against
    pattern:  PermissionString,
    /// Directories still to list; the last one is listed next
    stack:    Vec<PathBuf>,
    /// Counters so far
    progress: Progress,
}

impl Crawler {
    /// Create a crawler rooted at `root`
    ///
    /// # Errors
    /// Returns error if the root fails [`validate_root`].
    pub fn new(root: &Path, pattern: PermissionString) -> Result<Self> {
        validate_root(root)?;
        Ok(Self {
            pattern,
            stack: vec![root.to_path_buf()],
            progress: Progress { directories: 1, ..Progress::default() },
        })
    }

    /// Counters for the walk so far
    #[must_use = "Progress information should be used for monitoring"]
    pub const fn progress(&self) -> Progress {
        self.progress
    }

    /// List the next directory, or `None` once the tree is exhausted
    pub fn process_next(&mut self) -> Option<DirReport> {
        let dir = self.stack.pop()?;
        let mut report = DirReport::default();

        let listing = match fs::read_dir(&dir) {
            Ok(listing) => listing,
            Err(source) => {
                report.diagnostics.push(Diagnostic::CannotOpenDir { path: dir, source });
                self.progress.diagnostics += 1;
                return Some(report);
            },
        };

        let mut subdirs = Vec::new();
        for entry in listing {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    report.diagnostics.push(Diagnostic::ReadEntry { dir: dir.clone(), source });
                    continue;
                },
            };

            let name = entry.file_name();
            let path = dir.join(&name);
            if !fits_path_limit(&dir, name.as_bytes()) {
                report.diagnostics.push(Diagnostic::PathTooLong { path });
                continue;
            }

            let metadata = match fs::symlink_metadata(&path) {
                Ok(metadata) => metadata,
                Err(source) => {
                    report.diagnostics.push(Diagnostic::CannotStat { path, source });
                    continue;
                },
            };
            self.progress.entries += 1;

            let is_dir = metadata.file_type().is_dir();
            if self.pattern.matches(&PermissionString::from_mode(metadata.permissions().mode())) {
                report.matches.push(path.clone());
            }
            if is_dir {
                subdirs.push(path);
            }
        }

        self.progress.matches += report.matches.len();
        self.progress.directories += subdirs.len();
        self.progress.diagnostics += report.diagnostics.len();
        // first-listed subdirectory is walked first
        self.stack.extend(subdirs.into_iter().rev());

        Some(report)
    }

    /// Walk the whole tree, writing matches to `out` and diagnostics to `err`
    ///
    /// Each match is the raw path bytes followed by `\n`; each diagnostic is
    /// one line.
    ///
    /// # Errors
    /// Returns error only if writing to `out` or `err` fails.
    pub fn run<O: Write, E: Write>(mut self, out: &mut O, err: &mut E) -> Result<Progress> {
        while let Some(report) = self.process_next() {
            for diagnostic in &report.diagnostics {
                writeln!(err, "{diagnostic}")?;
            }
            for path in &report.matches {
                out.write_all(path.as_os_str().as_bytes())?;
                out.write_all(b"\n")?;
            }
        }
        out.flush()?;

        let progress = self.progress();
        debug!(
            entries = progress.entries,
            matches = progress.matches,
            directories = progress.directories,
            diagnostics = progress.diagnostics,
            "walk complete"
        );
        Ok(progress)
    }
}
