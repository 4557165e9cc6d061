//! Proxy endpoints for the storefront browser client.
//!
//! Every handler maps one browser route to one fixed content backend
//! endpoint. All of them sit behind the gatekeeper.

pub mod articles;
pub mod catalog;
pub mod envelope;
pub mod forms;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::handlers::envelope::ProxyError;
use crate::http::server::AppState;
use crate::upstream::UpstreamError;

/// Whether a payload came from the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "edge-cache",
        }
    }
}

/// GET through the response cache. Only successful payloads are stored.
pub(crate) async fn fetch_cached(
    state: &AppState,
    route: &'static str,
    url: Url,
    ttl: Duration,
) -> Result<(Value, CacheStatus), UpstreamError> {
    let key = url.to_string();
    if let Some(body) = state.cache.get(&key) {
        tracing::debug!(route, url = %key, "Served from response cache");
        return Ok((body, CacheStatus::Hit));
    }

    let body = state.client.get_json(route, url).await?;
    state.cache.insert(key, body.clone(), ttl);
    Ok((body, CacheStatus::Miss))
}

/// Path segments under the backend's `wp-json/custom/v1` namespace.
pub(crate) fn custom_api<'a>(tail: &[&'a str]) -> Vec<&'a str> {
    let mut segments = vec!["wp-json", "custom", "v1"];
    segments.extend_from_slice(tail);
    segments
}

/// Routes mounted under the protected prefix.
///
/// Every route also answers `OPTIONS` so browser preflights succeed once the
/// gatekeeper has admitted them; unknown paths fall through to [`not_found`]
/// and are still gated.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(catalog::list_products).options(preflight))
        .route("/products/{slug}", get(catalog::get_product).options(preflight))
        .route("/categories", get(catalog::list_categories).options(preflight))
        .route("/tags", get(catalog::list_tags).options(preflight))
        .route("/articles", get(articles::list_articles).options(preflight))
        .route("/articles/{id}", get(articles::get_article).options(preflight))
        .route(
            "/review/product/{id}",
            get(articles::get_product_reviews).options(preflight),
        )
        .route("/auth/otp/request", post(forms::request_otp).options(preflight))
        .route("/auth/otp/verify", post(forms::verify_otp).options(preflight))
        .route("/consultation", post(forms::request_consultation).options(preflight))
        .fallback(not_found)
}

/// CORS preflight. The allow headers are added by the gatekeeper.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Unknown path under the protected prefix.
pub async fn not_found() -> ProxyError {
    ProxyError::new(StatusCode::NOT_FOUND, "Not found")
}

/// Liveness probe, outside the gatekeeper.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
