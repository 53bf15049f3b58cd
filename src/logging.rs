//! Logging setup.
//!
//! Library code logs through the `log` facade. The binary installs a
//! `tracing-subscriber` fmt layer, which also receives `log` records and the
//! request spans emitted by `tower-http`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging. `RUST_LOG` overrides the default `info` filter.
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()?;

    log::debug!("[logging] Logging initialized");
    Ok(())
}
