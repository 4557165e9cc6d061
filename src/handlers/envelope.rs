//! JSON envelopes shared by the proxy handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::upstream::UpstreamError;

pub const UNREACHABLE_MESSAGE: &str = "Could not connect to the content server";

/// Error body returned to the browser: `{"success": false, "message": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// A failed proxy call, rendered as an [`ErrorBody`].
#[derive(Debug)]
pub struct ProxyError {
    pub status: StatusCode,
    pub message: String,
    pub endpoint: Option<String>,
}

impl ProxyError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            endpoint: None,
        }
    }

    /// Map an upstream failure. Non-2xx statuses are passed through with
    /// `status_message`; anything else becomes a 500.
    pub fn from_upstream(route: &'static str, err: UpstreamError, status_message: &str) -> Self {
        match err {
            UpstreamError::Status(status) => {
                tracing::warn!(route, %status, "Content backend returned an error status");
                Self::new(status, status_message)
            }
            other => {
                tracing::error!(route, error = %other, "Content backend request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, UNREACHABLE_MESSAGE)
            }
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            message: self.message,
            endpoint: self.endpoint,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Add `fields` to an upstream object. Non-object payloads are wrapped as
/// `{"data": <payload>}` first.
pub fn spread<I>(data: Value, fields: I) -> Value
where
    I: IntoIterator<Item = (&'static str, Value)>,
{
    let mut object = match data {
        Value::Object(map) => map,
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    };
    for (key, value) in fields {
        object.insert(key.to_string(), value);
    }
    Value::Object(object)
}

/// Milliseconds with two decimals, e.g. `"12.34 ms"`.
pub fn format_timing(elapsed: Duration) -> String {
    format!("{:.2} ms", elapsed.as_secs_f64() * 1000.0)
}

/// First non-empty value, like a query parameter with a fallback.
pub fn or_default<'a>(value: Option<&'a str>, fallback: &'a str) -> &'a str {
    value.filter(|v| !v.is_empty()).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_spread_merges_into_object() {
        let merged = spread(json!({"products": [1, 2]}), [("_timing", json!("1.00 ms"))]);
        assert_eq!(merged, json!({"products": [1, 2], "_timing": "1.00 ms"}));
    }

    #[test]
    fn test_spread_wraps_arrays() {
        let merged = spread(json!([1, 2]), [("_timing", json!("0.50 ms"))]);
        assert_eq!(merged, json!({"data": [1, 2], "_timing": "0.50 ms"}));
    }

    #[test]
    fn test_format_timing() {
        assert_eq!(format_timing(Duration::from_micros(12_346)), "12.35 ms");
        assert_eq!(format_timing(Duration::ZERO), "0.00 ms");
    }

    #[test]
    fn test_or_default() {
        assert_eq!(or_default(None, "10"), "10");
        assert_eq!(or_default(Some(""), "10"), "10");
        assert_eq!(or_default(Some("25"), "10"), "25");
    }

    #[test]
    fn test_status_error_keeps_status() {
        let err = ProxyError::from_upstream(
            "products",
            UpstreamError::Status(StatusCode::NOT_FOUND),
            "Product not found",
        );
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Product not found");
    }
}
