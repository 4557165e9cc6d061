//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request under the protected prefix:
//!     → access_control.rs (origin allow-list, forged header)
//!     → rate_limit.rs (fixed window per client key)
//!     → Pass to proxy handler
//!     → headers.rs (CORS + frame denial on the response)
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - No trust in client input beyond the configured forwarding header
//! - Limiter state is owned and injected, never global

pub mod access_control;
pub mod gatekeeper;
pub mod headers;
pub mod rate_limit;

pub use gatekeeper::{gatekeeper_middleware, Admission, Gatekeeper, Rejection};
pub use rate_limit::{FixedWindowLimiter, RateLimitDecision, RateLimitRecord};
