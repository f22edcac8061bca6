//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Builds the `EnvFilter`, preferring `RUST_LOG` over the configured directive.
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Installs the global tracing subscriber.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    if let Err(err) = result {
        tracing::debug!(error = %err, "Tracing subscriber already installed");
    }
}
