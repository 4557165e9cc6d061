//! Response headers added to every admitted request.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    X_FRAME_OPTIONS,
};
use axum::http::{HeaderMap, HeaderValue};

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";
pub const FRAME_OPTIONS: &str = "DENY";

/// Echo the validated origin and set the fixed CORS and frame-denial headers.
pub fn apply_security_headers(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static(FRAME_OPTIONS));
}
