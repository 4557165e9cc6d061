//! Storefront gateway library.
//!
//! Proxies catalog, article and OTP endpoints of a WordPress content backend
//! to a browser client, behind a request gatekeeper (origin allow-list,
//! forged header check, fixed-window rate limit, CORS response headers).

pub mod clock;
pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
