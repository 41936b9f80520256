//! Streaming-media endpoint probing engine.
//!
//! Takes a large list of stream endpoints, partitions them by origin host,
//! and classifies each as `online` or `offline` with a two-phase
//! latency/throughput probe, without overloading any single origin.
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌──────────────────────────────────────────────────┐
//!                   │                  PROBE ENGINE                    │
//!   endpoints ─────▶│  ┌───────────┐   ┌───────────┐   ┌────────────┐  │
//!   whitelist       │  │ admission │──▶│  engine   │──▶│   probe    │──┼──▶ origins
//!                   │  │ grouper + │   │ waves +   │   │ HEAD → GET │  │
//!                   │  │   gate    │   │coordinator│   └────────────┘  │
//!                   │  └───────────┘   └─────┬─────┘                   │
//!                   │                        │                         │
//!                   │             ┌──────────▼──────────┐              │
//!   failed URLs ◀───┼─────────────│     resilience      │              │
//!   report          │             │ breaker + cooldown  │              │
//!                   │             └─────────────────────┘              │
//!                   │  ┌────────┐ ┌──────────────┐ ┌───────────┐       │
//!                   │  │ config │ │observability │ │ lifecycle │       │
//!                   │  └────────┘ └──────────────┘ └───────────┘       │
//!                   └──────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod admission;
pub mod config;
pub mod engine;
pub mod model;
pub mod probe;

// Failure containment
pub mod resilience;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod output;

pub use config::{ProbeConfig, TesterConfig};
pub use engine::{EngineError, ProbeEngine, RunReport, RunSummary};
pub use lifecycle::AbortSignal;
pub use model::{Endpoint, FailedUrls, Status};
pub use probe::{ProbeResult, Prober};
