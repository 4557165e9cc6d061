//! Upstream error types.

use axum::http::StatusCode;

/// Failure talking to the content backend.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("invalid upstream url: {0}")]
    InvalidUrl(String),

    #[error("upstream request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(StatusCode),

    #[error("upstream returned an undecodable body: {0}")]
    Decode(#[source] reqwest::Error),
}

impl UpstreamError {
    /// Label used in metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            UpstreamError::InvalidUrl(_) => "invalid_url",
            UpstreamError::Transport(e) if e.is_timeout() => "timeout",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status(_) => "status",
            UpstreamError::Decode(_) => "decode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = UpstreamError::Status(StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "upstream returned status 404 Not Found");
        assert_eq!(err.outcome(), "status");
    }
}
