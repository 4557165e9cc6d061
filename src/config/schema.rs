//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the storefront gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request gatekeeper settings (origin allow-list, forged header).
    pub gatekeeper: GatekeeperConfig,

    /// Fixed-window rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Content backend settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Gatekeeper configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Path prefix the gatekeeper protects. All proxy endpoints live under it.
    pub protected_prefix: String,

    /// Origins allowed to call protected endpoints (exact match).
    pub allowed_origins: Vec<String>,

    /// Header whose mere presence marks a request as forged.
    pub forged_header_name: String,

    /// Forwarding header used as the rate-limit client key.
    pub client_key_header: String,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            protected_prefix: "/api".to_string(),
            allowed_origins: vec![
                "https://your-frontend.com".to_string(),
                "http://localhost:3000".to_string(),
            ],
            forged_header_name: "x-middleware-subrequest".to_string(),
            client_key_header: "x-forwarded-for".to_string(),
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Fixed window length in milliseconds.
    pub window_millis: u64,

    /// Maximum admitted requests per client key per window.
    pub max_requests: u32,

    /// Capacity of the client table. A full table sweeps stale records and
    /// then evicts the live ones nearest their reset.
    pub max_entries: usize,

    /// Interval of the background sweep in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_millis: 60_000,
            max_requests: 100,
            max_entries: 100_000,
            sweep_interval_secs: 60,
        }
    }
}

/// Content backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the WordPress content backend.
    pub base_url: String,

    /// Timeout for a single upstream call in milliseconds.
    pub timeout_millis: u64,

    /// Cache successful GET payloads in memory.
    pub cache_enabled: bool,

    /// TTL for product, category and tag payloads.
    pub catalog_ttl_secs: u64,

    /// TTL for article and review payloads.
    pub article_ttl_secs: u64,

    /// Capacity of the response cache.
    pub cache_max_entries: usize,

    /// Maximum accepted inbound body size for POST endpoints.
    pub max_body_bytes: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://omdehforoosh.com".to_string(),
            timeout_millis: 10_000,
            cache_enabled: true,
            catalog_ttl_secs: 3600,
            article_ttl_secs: 1800,
            cache_max_entries: 10_000,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
