//! Diagnostic logging for the `runfile-locate` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left to binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Variable holding an explicit filter, e.g. `RUNFILE_LOCATOR_LOG=runfile_locator=trace`.
pub const LOG_ENV: &str = "RUNFILE_LOCATOR_LOG";

/// Install a compact stderr subscriber.
///
/// `RUNFILE_LOCATOR_LOG` wins when set; otherwise `verbosity` picks `warn`, `debug` or
/// `trace`.
pub fn init(verbosity: u8) {
  let fallback = match verbosity {
    0 => "warn",
    1 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

  tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_writer(std::io::stderr).compact())
    .init();
}
