//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Abort (abort.rs):
//!     trigger() → engine stops dispatching → in-flight wave drains
//!     → EngineError::Aborted with partial results in place
//!
//! Signals (signals.rs):
//!     SIGINT / deadline → trigger abort
//! ```
//!
//! # Design Decisions
//! - Abort is cooperative; probes are never cancelled mid-flight
//! - Per-endpoint deadlines come from probe timeouts, not from here

pub mod abort;
pub mod signals;

pub use abort::AbortSignal;
