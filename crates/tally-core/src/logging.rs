//! `tracing` subscriber setup.
//!
//! Human-readable compact output on stderr by default, one JSON object per
//! line when `json` is set. `RUST_LOG` takes precedence over the configured
//! level so a single run can be turned up without touching settings.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Call once at startup. Subsequent calls are no-ops.
///
/// # Arguments
///
/// * `level` - Default filter directive (e.g. `"info"`, `"tally=debug"`).
/// * `json` - Emit structured JSON lines instead of compact text.
pub fn init_subscriber(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails if a global subscriber is already set
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
