//! Log setup for the binaries

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable that overrides [`LOG_FILTER`]
pub const LOG_ENV: &str = "PERMFIND_LOG";

/// Filter applied to `permfind` events unless [`LOG_ENV`] is set
///
/// Events go to stderr. In `pfind` that stream is the diagnostic channel, so
/// anything noisier than `warn` fails every orchestrated run.
pub const LOG_FILTER: &str = "permfind=warn";

/// Install the stderr subscriber; a second call is a no-op
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
