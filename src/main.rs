//! Storefront gateway.
//!
//! ```text
//!     Browser                 ┌──────────────────────────────────────────────┐
//!     ───────────────────────▶│ request id → trace → timeout                 │
//!                             │      │                                       │
//!                             │      ├── /health                             │
//!                             │      │                                       │
//!                             │      └── /api/* ── gatekeeper ── handlers ───┼──▶ WordPress
//!                             │            origin │ forged hdr │ rate limit  │    backend
//!                             │                                              │
//!     ◀───────────────────────│ CORS + X-Frame-Options on admitted responses │
//!                             └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use storefront_gateway::config::{load_config, GatewayConfig};
use storefront_gateway::lifecycle::startup;
use storefront_gateway::observability::logging::{apply_log_level, init_logging};

#[derive(Parser)]
#[command(name = "storefront-gateway")]
#[command(about = "Gatekeeping JSON proxy in front of a WordPress storefront backend", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let log_handle = init_logging();

    let config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to load configuration");
            e
        })?,
        None => GatewayConfig::default(),
    };

    if let Err(e) = apply_log_level(&log_handle, &config.observability) {
        tracing::warn!(error = %e, "Failed to apply configured log level");
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "storefront-gateway starting");

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
