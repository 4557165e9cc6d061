//! Request gatekeeper middleware.
//!
//! Runs in front of every route under the protected prefix:
//! origin allow-list → forged header check → fixed-window rate limit →
//! downstream handler → security headers on the response.
//!
//! Each step is a pure decision over the request headers plus a clock read, so
//! the whole check is synchronous. Rejections short-circuit with a fixed
//! status and body; no detail about why is leaked to the client.

use axum::{
    body::Body,
    extract::State,
    http::{header, header::InvalidHeaderName, HeaderMap, HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::config::GatekeeperConfig;
use crate::observability::metrics;
use crate::security::access_control::{client_key, ForgedHeaderCheck, OriginAllowList};
use crate::security::headers::apply_security_headers;
use crate::security::rate_limit::{FixedWindowLimiter, RateLimitDecision};

/// Terminal gatekeeper outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("origin missing or not allowed")]
    OriginRejected,
    #[error("forged internal routing header present")]
    ForgedHeaderRejected,
    #[error("rate limit exceeded")]
    RateLimitExceeded,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::OriginRejected | Rejection::ForgedHeaderRejected => StatusCode::FORBIDDEN,
            Rejection::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Label used in logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::OriginRejected => "origin",
            Rejection::ForgedHeaderRejected => "forged_header",
            Rejection::RateLimitExceeded => "rate_limit",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::OriginRejected => (
                self.status(),
                [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"))],
                "Access Denied",
            )
                .into_response(),
            Rejection::ForgedHeaderRejected => (self.status(), "Forbidden").into_response(),
            Rejection::RateLimitExceeded => (self.status(), "Too Many Requests").into_response(),
        }
    }
}

/// Facts established about an admitted request.
#[derive(Debug, Clone)]
pub struct Admission {
    pub origin: HeaderValue,
    pub client_key: String,
    pub count: u32,
}

/// Composes the three checks over an injected rate limiter.
pub struct Gatekeeper {
    origins: OriginAllowList,
    forged: ForgedHeaderCheck,
    client_key_header: HeaderName,
    limiter: Arc<FixedWindowLimiter>,
}

impl Gatekeeper {
    pub fn new(
        config: &GatekeeperConfig,
        limiter: Arc<FixedWindowLimiter>,
    ) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            origins: OriginAllowList::new(config.allowed_origins.iter().cloned()),
            forged: ForgedHeaderCheck::new(&config.forged_header_name)?,
            client_key_header: HeaderName::from_bytes(config.client_key_header.as_bytes())?,
            limiter,
        })
    }

    /// Decide whether a request may pass. Only an admitted or rate-limited
    /// request touches the limiter table.
    pub fn evaluate(&self, headers: &HeaderMap) -> Result<Admission, Rejection> {
        let origin = self
            .origins
            .validate(headers)
            .ok_or(Rejection::OriginRejected)?;

        if self.forged.is_forged(headers) {
            return Err(Rejection::ForgedHeaderRejected);
        }

        let client_key = client_key(headers, &self.client_key_header);
        match self.limiter.check(&client_key) {
            RateLimitDecision::Admitted { count, .. } => Ok(Admission {
                origin,
                client_key,
                count,
            }),
            RateLimitDecision::Limited { reset_at } => {
                tracing::warn!(client = %client_key, reset_at, "Rate limit exceeded");
                Err(Rejection::RateLimitExceeded)
            }
        }
    }

    pub fn limiter(&self) -> &Arc<FixedWindowLimiter> {
        &self.limiter
    }
}

/// Middleware function wrapping the protected routes.
pub async fn gatekeeper_middleware(
    State(gate): State<Arc<Gatekeeper>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let admission = match gate.evaluate(request.headers()) {
        Ok(admission) => admission,
        Err(rejection) => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                reason = rejection.reason(),
                "Request rejected by gatekeeper"
            );
            metrics::record_rejection(rejection.reason());
            return rejection.into_response();
        }
    };

    tracing::trace!(
        client = %admission.client_key,
        count = admission.count,
        "Request admitted"
    );

    let mut response = next.run(request).await;
    apply_security_headers(response.headers_mut(), admission.origin);
    response
}
