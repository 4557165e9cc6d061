//! Configuration validation.
//!
//! Serde handles syntax; this module checks values that parse but cannot work
//! (empty allow-list, zero window, unusable prefix or base URL). Every problem
//! is reported, not just the first.

use axum::http::HeaderName;
use std::net::SocketAddr;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than zero"));
    }

    let gate = &config.gatekeeper;
    let prefix = gate.protected_prefix.as_str();
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        errors.push(ValidationError::new(
            "gatekeeper.protected_prefix",
            "must start with '/', must not end with '/' and must not be the root path",
        ));
    }
    if gate.allowed_origins.is_empty() {
        errors.push(ValidationError::new(
            "gatekeeper.allowed_origins",
            "at least one origin is required",
        ));
    }
    if HeaderName::from_bytes(gate.forged_header_name.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "gatekeeper.forged_header_name",
            format!("'{}' is not a valid header name", gate.forged_header_name),
        ));
    }
    if HeaderName::from_bytes(gate.client_key_header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "gatekeeper.client_key_header",
            format!("'{}' is not a valid header name", gate.client_key_header),
        ));
    }

    let limits = &config.rate_limit;
    if limits.window_millis == 0 {
        errors.push(ValidationError::new("rate_limit.window_millis", "must be greater than zero"));
    }
    if limits.max_requests == 0 {
        errors.push(ValidationError::new("rate_limit.max_requests", "must be greater than zero"));
    }
    if limits.max_entries == 0 {
        errors.push(ValidationError::new("rate_limit.max_entries", "must be greater than zero"));
    }
    if limits.sweep_interval_secs == 0 {
        errors.push(ValidationError::new(
            "rate_limit.sweep_interval_secs",
            "must be greater than zero",
        ));
    }

    let upstream = &config.upstream;
    match Url::parse(&upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.base_url", e.to_string())),
    }
    if upstream.timeout_millis == 0 {
        errors.push(ValidationError::new("upstream.timeout_millis", "must be greater than zero"));
    }
    if upstream.cache_enabled && upstream.cache_max_entries == 0 {
        errors.push(ValidationError::new(
            "upstream.cache_max_entries",
            "must be greater than zero when the cache is enabled",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
