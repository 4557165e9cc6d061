//! Request-side access checks: origin allow-list and forged header detection.

use axum::http::header::{InvalidHeaderName, ORIGIN};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashSet;

/// Client key shared by every request without a usable forwarding header.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Exact-match set of origins permitted to call protected endpoints.
#[derive(Debug, Clone)]
pub struct OriginAllowList {
    origins: HashSet<String>,
}

impl OriginAllowList {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            origins: origins.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the `Origin` header value when it is present and allowed.
    pub fn validate(&self, headers: &HeaderMap) -> Option<HeaderValue> {
        let value = headers.get(ORIGIN)?;
        let origin = value.to_str().ok()?;
        self.origins.contains(origin).then(|| value.clone())
    }
}

/// Detects a header that only the internal routing layer may set.
#[derive(Debug, Clone)]
pub struct ForgedHeaderCheck {
    name: HeaderName,
}

impl ForgedHeaderCheck {
    pub fn new(name: &str) -> Result<Self, InvalidHeaderName> {
        Ok(Self {
            name: HeaderName::from_bytes(name.as_bytes())?,
        })
    }

    /// Presence alone is disqualifying; the value is never inspected.
    pub fn is_forged(&self, headers: &HeaderMap) -> bool {
        headers.contains_key(&self.name)
    }
}

/// Derive the rate-limit key from the trusted forwarding header.
///
/// The raw header value is used as-is. Missing or non-ASCII values collapse to
/// [`UNKNOWN_CLIENT`], so all such clients share one budget.
pub fn client_key(headers: &HeaderMap, header: &HeaderName) -> String {
    headers
        .get(header)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
