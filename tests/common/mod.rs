//! Shared utilities for integration and load testing.

use axum::{
    body::Body,
    extract::{Path, Query, RawQuery, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

use storefront_gateway::config::GatewayConfig;
use storefront_gateway::http::HttpServer;
use storefront_gateway::lifecycle::Shutdown;

pub const ORIGIN: &str = "https://your-frontend.com";

/// Counts requests that reached the mock backend.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

#[allow(dead_code)]
impl Hits {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

async fn count_hits(State(hits): State<Hits>, request: Request<Body>, next: Next) -> Response {
    hits.0.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

async fn products(RawQuery(query): RawQuery) -> Json<Value> {
    Json(json!({ "products": [{ "id": 1 }], "query": query }))
}

async fn product(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("slug").map(String::as_str) {
        Some("missing") | None => {
            (StatusCode::NOT_FOUND, Json(json!({ "code": "not_found" }))).into_response()
        }
        Some(slug) => Json(json!({ "slug": slug, "price": 120 })).into_response(),
    }
}

async fn categories() -> Json<Value> {
    Json(json!([{ "id": 3, "name": "Shoes" }]))
}

async fn tags() -> Json<Value> {
    Json(json!({ "tags": ["summer"] }))
}

async fn posts(RawQuery(query): RawQuery) -> Json<Value> {
    Json(json!({ "posts": [], "query": query }))
}

async fn post_by_id(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id, "title": "Hello" }))
}

async fn reviews(Path(id): Path<String>) -> Json<Value> {
    Json(json!([{ "product": id, "rating": 5 }]))
}

async fn otp_request(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "success": true, "received": body }))
}

async fn otp_verify(Json(body): Json<Value>) -> Response {
    if body["code"] == "1234" {
        Json(json!({ "success": true, "token": "abc" })).into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "invalid code" })),
        )
            .into_response()
    }
}

async fn consultation(Json(body): Json<Value>) -> Response {
    (StatusCode::CREATED, Json(json!({ "success": true, "name": body["name"] }))).into_response()
}

/// Start a mock WordPress backend on an ephemeral port.
pub async fn start_mock_backend() -> (SocketAddr, Hits) {
    let hits = Hits::default();
    let app = Router::new()
        .route("/productsapi.php", get(products))
        .route("/productapi.php", get(product))
        .route("/productcatapi.php", get(categories))
        .route("/producttagapi.php", get(tags))
        .route("/wp-json/custom/v1/posts", get(posts))
        .route("/wp-json/custom/v1/post/{id}", get(post_by_id))
        .route("/wp-json/custom/v1/product/{id}/review", get(reviews))
        .route("/wp-json/custom/v1/otp/request", post(otp_request))
        .route("/wp-json/custom/v1/otp/verify", post(otp_verify))
        .route("/wp-json/custom/v1/consultation/request", post(consultation))
        .layer(middleware::from_fn_with_state(hits.clone(), count_hits));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, hits)
}

/// Default config pointed at `backend`.
pub fn gateway_config(backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = format!("http://{}", backend);
    config
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let server = HttpServer::new(config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
