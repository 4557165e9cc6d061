//! HTTP client for the WordPress content backend.
//!
//! # Responsibilities
//! - Build endpoint URLs under the configured base (segments and query
//!   values are percent-encoded)
//! - Enforce the per-call timeout
//! - Decode JSON bodies; the gateway never inspects their shape

use axum::http::StatusCode;
use serde_json::Value;
use std::time::{Duration, Instant};
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::error::UpstreamError;

/// Client for the content backend.
#[derive(Clone)]
pub struct ContentClient {
    http: reqwest::Client,
    base: Url,
}

impl ContentClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(UpstreamError::InvalidUrl(config.base_url.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_millis))
            .build()
            .map_err(UpstreamError::Transport)?;

        Ok(Self { http, base })
    }

    /// Build `base/<segments...>?<query>`; empty query values are skipped.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, UpstreamError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        let mut pairs = query.iter().filter(|(_, v)| !v.is_empty()).peekable();
        if pairs.peek().is_some() {
            let mut serializer = url.query_pairs_mut();
            for (k, v) in pairs {
                serializer.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// GET a JSON document. Non-2xx statuses are errors.
    pub async fn get_json(&self, endpoint: &'static str, url: Url) -> Result<Value, UpstreamError> {
        let start = Instant::now();
        let result = self.fetch_json(url).await;
        metrics::record_upstream(endpoint, outcome(&result), start);
        result
    }

    async fn fetch_json(&self, url: Url) -> Result<Value, UpstreamError> {
        tracing::debug!(url = %url, "Fetching from content backend");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }
        response.json().await.map_err(UpstreamError::Decode)
    }

    /// POST a JSON body and return the upstream status with its JSON reply,
    /// whatever the status.
    pub async fn post_json(
        &self,
        endpoint: &'static str,
        url: Url,
        body: &Value,
    ) -> Result<(StatusCode, Value), UpstreamError> {
        let start = Instant::now();
        let result = self.send_json(url, body).await;
        metrics::record_upstream(endpoint, outcome(&result), start);
        result
    }

    async fn send_json(&self, url: Url, body: &Value) -> Result<(StatusCode, Value), UpstreamError> {
        tracing::debug!(url = %url, "Posting to content backend");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        let status = response.status();
        let value = response.json().await.map_err(UpstreamError::Decode)?;
        Ok((status, value))
    }
}

fn outcome<T>(result: &Result<T, UpstreamError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(e) => e.outcome(),
    }
}
