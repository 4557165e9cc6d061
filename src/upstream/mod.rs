//! Content backend subsystem.
//!
//! # Data Flow
//! ```text
//! proxy handler
//!     → cache.rs (serve fresh GET payloads locally)
//!     → client.rs (build URL, call backend with timeout, decode JSON)
//!     → error.rs (transport / status / decode failures)
//! ```

pub mod cache;
pub mod client;
pub mod error;

pub use cache::ResponseCache;
pub use client::ContentClient;
pub use error::UpstreamError;
