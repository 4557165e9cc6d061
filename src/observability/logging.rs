//! Structured logging setup.
//!
//! `RUST_LOG` takes precedence; otherwise the configured level applies to this
//! crate and to `tower_http` request spans. The subscriber is installed before
//! the config is read, at `info`, and re-levelled once the config is loaded.

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::ObservabilityConfig;

/// Handle for changing the filter after startup.
pub type LogHandle = reload::Handle<EnvFilter, Registry>;

const STARTUP_LEVEL: &str = "info";

fn default_filter(level: &str) -> String {
    format!("storefront_gateway={level},tower_http={level}")
}

fn env_filter() -> Option<EnvFilter> {
    EnvFilter::try_from_default_env().ok()
}

/// Initialize the global tracing subscriber at the startup level.
pub fn init_logging() -> LogHandle {
    let filter = env_filter().unwrap_or_else(|| EnvFilter::new(default_filter(STARTUP_LEVEL)));
    let (filter, handle) = reload::Layer::new(filter);

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if let Err(e) = result {
        eprintln!("tracing subscriber already initialized: {e}");
    }
    handle
}

/// Switch to the configured level. A `RUST_LOG` filter is left in place.
pub fn apply_log_level(
    handle: &LogHandle,
    config: &ObservabilityConfig,
) -> Result<(), reload::Error> {
    if env_filter().is_some() {
        return Ok(());
    }
    handle.reload(EnvFilter::new(default_filter(&config.log_level)))
}
