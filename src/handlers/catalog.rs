//! Product, category and tag endpoints.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;

use crate::handlers::envelope::{format_timing, or_default, spread, ProxyError};
use crate::handlers::{fetch_cached, CacheStatus};
use crate::http::server::AppState;

pub const X_CACHE_INFO: HeaderName = HeaderName::from_static("x-cache-info");
pub const X_RESPONSE_TIME: HeaderName = HeaderName::from_static("x-response-time");

/// Filters accepted by the product listing. Values are forwarded verbatim.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub per_page: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub tag: Option<String>,
    pub count: Option<String>,
    pub search: Option<String>,
    pub max_price: Option<String>,
    pub min_price: Option<String>,
}

fn cache_header(status: CacheStatus) -> (HeaderName, HeaderValue) {
    (X_CACHE_INFO, HeaderValue::from_static(status.as_str()))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Response, ProxyError> {
    let opt = |v: &Option<String>| v.as_deref().unwrap_or_default().to_owned();
    let params = [
        ("per_page", or_default(query.per_page.as_deref(), "10").to_owned()),
        ("category", opt(&query.category)),
        ("type", opt(&query.kind)),
        ("tag", opt(&query.tag)),
        ("count", opt(&query.count)),
        ("search", opt(&query.search)),
        ("max_price", opt(&query.max_price)),
        ("min_price", opt(&query.min_price)),
    ];
    let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

    let url = state
        .client
        .endpoint(&["productsapi.php"], &params)
        .map_err(|e| ProxyError::from_upstream("products", e, ""))?;

    let start = Instant::now();
    let (data, cache) = fetch_cached(&state, "products", url, state.catalog_ttl)
        .await
        .map_err(|e| ProxyError::from_upstream("products", e, "Failed to fetch the product list"))?;
    let timing = format_timing(start.elapsed());

    let body = spread(data, [("_timing", json!(timing))]);
    Ok(([cache_header(cache)], Json(body)).into_response())
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ProxyError> {
    let url = state
        .client
        .endpoint(&["productapi.php"], &[("slug", slug.as_str())])
        .map_err(|e| ProxyError::from_upstream("product", e, ""))?;

    let (data, cache) = fetch_cached(&state, "product", url, state.catalog_ttl)
        .await
        .map_err(|e| ProxyError::from_upstream("product", e, "Product not found"))?;

    let body = json!({ "success": true, "product": data });
    Ok(([cache_header(cache)], Json(body)).into_response())
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let url = state
        .client
        .endpoint(&["productcatapi.php"], &[])
        .map_err(|e| ProxyError::from_upstream("categories", e, ""))?;
    let endpoint = url.to_string();

    let start = Instant::now();
    let (data, cache) = fetch_cached(&state, "categories", url, state.catalog_ttl)
        .await
        .map_err(|e| {
            let err = ProxyError::from_upstream("categories", e, "Failed to fetch categories");
            if err.status == StatusCode::INTERNAL_SERVER_ERROR {
                err.with_endpoint(endpoint.clone())
            } else {
                err
            }
        })?;
    let elapsed = start.elapsed();
    let timing = format_timing(elapsed);

    let body = spread(
        data,
        [(
            "_meta",
            json!({ "timing": timing, "endpoint": endpoint, "cache": "force-cache" }),
        )],
    );
    let response_time = format!("{:.2}ms", elapsed.as_secs_f64() * 1000.0);
    let mut response = ([cache_header(cache)], Json(body)).into_response();
    if let Ok(value) = HeaderValue::from_str(&response_time) {
        response.headers_mut().insert(X_RESPONSE_TIME, value);
    }
    Ok(response)
}

pub async fn list_tags(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let url = state
        .client
        .endpoint(&["producttagapi.php"], &[])
        .map_err(|e| ProxyError::from_upstream("tags", e, ""))?;

    let start = Instant::now();
    let (data, cache) = fetch_cached(&state, "tags", url, state.catalog_ttl)
        .await
        .map_err(|e| ProxyError::from_upstream("tags", e, "Failed to fetch tags"))?;
    let timing = format_timing(start.elapsed());

    let body: Value = spread(data, [("_timing", json!(timing))]);
    Ok(([cache_header(cache)], Json(body)).into_response())
}
