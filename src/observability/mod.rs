//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Engine and probes produce:
//!     → logging.rs (structured log events, gated by RunLog)
//!     → metrics.rs (counters, histograms)
//!     → progress.rs (completion counter, periodic progress lines)
//!
//! Consumers:
//!     → stdout / optional log file
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (host, url, latency, speed)
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
pub mod progress;
