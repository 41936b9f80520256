//! Admission subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint list + whitelist
//!     → grouper.rs (trusted group + origin groups per host)
//!     → per group: local limit from gate.rs
//!     → per endpoint: global permit from gate.rs
//! ```
//!
//! # Design Decisions
//! - Grouping is done once per run and never changes afterwards
//! - The global gate, not the wave size, bounds network concurrency

pub mod gate;
pub mod grouper;

pub use gate::{group_concurrency, AdmissionGate};
pub use grouper::{extract_host, partition, Admission, OriginGroup, UNKNOWN_HOST};
