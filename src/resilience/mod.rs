//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Group about to be dispatched:
//!     → cooldown.rs (wait out the host's spacing)
//!     → circuit_breaker.rs (skip if the host is blocked)
//!     → probes run
//!     → circuit_breaker.rs (record failures / clean group)
//!     → cooldown.rs (stamp completion time)
//! ```
//!
//! # Design Decisions
//! - Single attempt per endpoint; no retries inside a run
//! - Host-level blocking replaces per-endpoint retry as cost containment
//! - All state lives in the run and is dropped with it

pub mod circuit_breaker;
pub mod cooldown;

pub use circuit_breaker::{CircuitBreaker, HostCircuit};
pub use cooldown::CooldownGovernor;
