//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → /health, or the protected prefix:
//!         → security::gatekeeper (origin, forged header, rate limit)
//!         → handlers (proxy to the content backend)
//!         → security::headers (CORS + frame denial)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, ServerError};
