//! Telemetry initialization (tracing, fmt subscriber, env filter).
//!
//! Log verbosity is controlled via the standard `RUST_LOG` environment variable,
//! falling back to `info` when unset. For example:
//!
//! ```bash
//! RUST_LOG=sommelier=debug,sqlx=warn
//! ```

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing with console output.
///
/// Safe to call once per process; a second call returns an error from
/// `try_init` which callers can ignore in tests.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");

    Ok(())
}
