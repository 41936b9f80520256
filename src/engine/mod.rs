//! Probe engine.
//!
//! # Responsibilities
//! - Own the per-run state (gate, breaker, cooldown, counters)
//! - Schedule origin groups in waves
//! - Coordinate probing and account for every endpoint
//!
//! # Architecture
//! ```text
//! ProbeEngine::run
//!     ├─ admission::partition     trusted + origin groups
//!     ├─ scheduler::into_waves    wave-by-wave dispatch
//!     ├─ RunState                 gate, breaker, cooldown, stats
//!     └─ Prober                   two-phase protocol probe
//! ```

pub mod coordinator;
pub mod error;
pub mod scheduler;
pub mod state;
pub mod stats;

pub use coordinator::ProbeEngine;
pub use error::EngineError;
pub use stats::{RunReport, RunSummary};
