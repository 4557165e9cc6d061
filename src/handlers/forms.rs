//! OTP and consultation form submissions.
//!
//! These are never cached. The upstream status is returned as-is, including
//! 4xx replies such as a wrong OTP code.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::handlers::custom_api;
use crate::handlers::envelope::{ProxyError, UNREACHABLE_MESSAGE};
use crate::http::server::AppState;
use crate::upstream::UpstreamError;

async fn forward(
    state: &AppState,
    route: &'static str,
    tail: &[&str],
    body: Value,
    failure_message: &str,
) -> Result<Response, ProxyError> {
    let failed = |e: UpstreamError| {
        tracing::error!(route, error = %e, "Form submission failed");
        ProxyError::new(StatusCode::INTERNAL_SERVER_ERROR, failure_message)
    };

    let url = state.client.endpoint(&custom_api(tail), &[]).map_err(failed)?;
    let (status, data) = state
        .client
        .post_json(route, url, &body)
        .await
        .map_err(failed)?;

    if !status.is_success() {
        tracing::info!(route, %status, "Content backend rejected form submission");
    }
    Ok((status, Json(data)).into_response())
}

pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ProxyError> {
    forward(
        &state,
        "otp_request",
        &["otp", "request"],
        body,
        UNREACHABLE_MESSAGE,
    )
    .await
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ProxyError> {
    forward(
        &state,
        "otp_verify",
        &["otp", "verify"],
        body,
        UNREACHABLE_MESSAGE,
    )
    .await
}

pub async fn request_consultation(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Response, ProxyError> {
    forward(
        &state,
        "consultation",
        &["consultation", "request"],
        body,
        "Failed to submit the consultation request",
    )
    .await
}
