//! Draining a child's pipe into one of our own streams

use std::fmt;
use std::io::{self, ErrorKind, Read, Write};

use crossbeam_channel::Sender;
use tracing::debug;

use crate::types::BUFFER_SIZE;

/// The two streams the orchestrator services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Sorter stdout, forwarded to our stdout
    Sorted,
    /// Scanner stderr, forwarded to our stderr
    Diagnostics,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sorted => "sorted output",
            Self::Diagnostics => "diagnostics",
        })
    }
}

/// What passed through a channel
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    /// Bytes forwarded
    pub bytes:    u64,
    /// Newline bytes forwarded
    pub newlines: u64,
    /// Non-empty reads
    pub chunks:   u64,
}

impl Tally {
    /// Account for one forwarded chunk
    fn record(&mut self, chunk: &[u8]) {
        self.bytes += chunk.len() as u64;
        self.newlines += bytecount(chunk, b'\n');
        self.chunks += 1;
    }

    /// Whether anything at all arrived
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.bytes > 0
    }
}

fn bytecount(haystack: &[u8], needle: u8) -> u64 {
    haystack.iter().filter(|&&b| b == needle).count() as u64
}

/// Copy `source` into `sink` until EOF
///
/// Each chunk is written and flushed as soon as it is read, so the sink sees
/// data in arrival order without extra buffering. Interrupted reads are
/// retried.
///
/// # Errors
/// Returns the first read or write error other than [`ErrorKind::Interrupted`].
pub fn drain<R: Read, W: Write + ?Sized>(mut source: R, sink: &mut W) -> io::Result<Tally> {
    let mut buf = [0u8; BUFFER_SIZE];
    let mut tally = Tally::default();
    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => return Ok(tally),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        let chunk = &buf[..n];
        sink.write_all(chunk)?;
        sink.flush()?;
        tally.record(chunk);
    }
}

/// Completion notice sent by a listener
#[derive(Debug)]
pub struct Finished {
    /// Which channel
    pub channel: Channel,
    /// Outcome of draining it
    pub result:  io::Result<Tally>,
}

/// Drain `source` into `sink`, then report on `done`
///
/// `source` is dropped before reporting, which closes our read end: if the
/// drain failed early, the producer sees a broken pipe instead of blocking.
pub fn listen<R: Read, W: Write + ?Sized>(
    channel: Channel,
    source: R,
    sink: &mut W,
    done: &Sender<Finished>,
) {
    let result = drain(source, sink);
    match &result {
        Ok(tally) => debug!(
            %channel,
            bytes = tally.bytes,
            lines = tally.newlines,
            chunks = tally.chunks,
            "reached EOF"
        ),
        Err(e) => debug!(%channel, error = %e, "stopped draining"),
    }
    // a closed receiver means the run is already unwinding
    let _ = done.send(Finished { channel, result });
}
