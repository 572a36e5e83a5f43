//! Diagnostic logging for the `kgs` binary.

use std::io;

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "KGS_LOG";

/// Installs a stderr subscriber.
///
/// `-v` flags win over `KGS_LOG`; without either, only warnings are shown.
pub fn init(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if let Err(error) = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init()
    {
        eprintln!("warning: logging unavailable: {error}");
    }
}
