//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the health probe and proxy endpoints
//! - Mount the gatekeeper in front of every route under the protected prefix
//! - Wire up middleware (tracing, timeout, body limit, request ID, metrics)
//! - Run the maintenance sweeper alongside the listener
//! - Shut down gracefully on the broadcast signal

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header::InvalidHeaderName, Request},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::handlers;
use crate::http::request::request_id_layers;
use crate::lifecycle::maintenance::spawn_maintenance;
use crate::observability::metrics;
use crate::security::{gatekeeper_middleware, FixedWindowLimiter, Gatekeeper};
use crate::upstream::{ContentClient, ResponseCache, UpstreamError};

/// Application state injected into proxy handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: ContentClient,
    pub cache: Arc<ResponseCache>,
    pub catalog_ttl: Duration,
    pub article_ttl: Duration,
}

/// Error building the server from a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid gatekeeper header name: {0}")]
    HeaderName(#[from] InvalidHeaderName),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// HTTP server for the storefront gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    gatekeeper: Arc<Gatekeeper>,
    cache: Arc<ResponseCache>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let limiter = Arc::new(FixedWindowLimiter::new(&config.rate_limit));
        let cache = Arc::new(ResponseCache::new(
            config.upstream.cache_enabled,
            config.upstream.cache_max_entries,
        ));
        Self::with_parts(config, limiter, cache)
    }

    /// Create a server around an existing limiter and cache.
    pub fn with_parts(
        config: GatewayConfig,
        limiter: Arc<FixedWindowLimiter>,
        cache: Arc<ResponseCache>,
    ) -> Result<Self, ServerError> {
        let gatekeeper = Arc::new(Gatekeeper::new(&config.gatekeeper, limiter)?);
        let client = ContentClient::new(&config.upstream)?;

        let state = AppState {
            client,
            cache: cache.clone(),
            catalog_ttl: Duration::from_secs(config.upstream.catalog_ttl_secs),
            article_ttl: Duration::from_secs(config.upstream.article_ttl_secs),
        };

        let router = Self::build_router(&config, state, gatekeeper.clone());
        Ok(Self {
            router,
            config,
            gatekeeper,
            cache,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, gatekeeper: Arc<Gatekeeper>) -> Router {
        // The fallback for unknown paths lives inside `api_routes`, so the
        // gatekeeper wraps it too.
        let protected = handlers::api_routes()
            .layer(middleware::from_fn_with_state(gatekeeper, gatekeeper_middleware))
            .layer(RequestBodyLimitLayer::new(config.upstream.max_body_bytes));

        let (set_request_id, propagate_request_id) = request_id_layers();

        Router::new()
            .route("/health", get(handlers::health))
            .nest(&config.gatekeeper.protected_prefix, protected)
            .with_state(state)
            .layer(middleware::from_fn(track_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id)
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id)
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            protected_prefix = %self.config.gatekeeper.protected_prefix,
            "HTTP server starting"
        );

        let maintenance = spawn_maintenance(
            self.gatekeeper.limiter().clone(),
            self.cache.clone(),
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs),
            shutdown.resubscribe(),
        );

        let mut shutdown = shutdown;
        let result = axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await;

        maintenance.abort();
        result?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn gatekeeper(&self) -> &Arc<Gatekeeper> {
        &self.gatekeeper
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Record request count and latency per matched route.
async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    metrics::record_request(method.as_str(), &route, response.status().as_u16(), start);
    response
}
