//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Metrics → Server → Listener
//!
//! Running (maintenance.rs):
//!     Interval tick → sweep stale rate-limit records and cache entries
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl+C → broadcast → stop accepting → drain → exit
//! ```

pub mod maintenance;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
