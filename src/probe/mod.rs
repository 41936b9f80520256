//! Protocol probe subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint
//!     → protocol.rs (HTTP or UDP/RTP, pick limits)
//!     → two_phase.rs (latency, then throughput)
//!     → transport.rs seam → http.rs (reqwest)
//!     → ProbeResult
//! ```
//!
//! # Design Decisions
//! - `Prober` is the engine's only view of the network, so the engine
//!   can be driven by a deterministic prober in tests
//! - A probe never returns an error; every failure is a `ProbeResult`

pub mod http;
pub mod protocol;
pub mod transport;
pub mod two_phase;

use async_trait::async_trait;

use crate::model::Endpoint;

pub use http::HttpTransport;
pub use protocol::{ProbeLimits, Protocol, ProtocolLimits};
pub use transport::{HeadResponse, ReadSample, StreamTransport, TransportError};
pub use two_phase::ProtocolProbe;

/// Verdict of probing one endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    pub success: bool,
    /// Phase 2 throughput in KB/s (0 if phase 2 did not run).
    pub speed_kbs: f64,
    /// Phase 1 latency in ms (0 if phase 1 did not complete).
    pub latency_ms: f64,
    pub protocol: Protocol,
}

impl ProbeResult {
    /// A failed probe carrying whatever latency was measured.
    pub fn failed(protocol: Protocol, latency_ms: f64) -> Self {
        Self {
            success: false,
            speed_kbs: 0.0,
            latency_ms,
            protocol,
        }
    }

    /// Short label describing why a probe failed.
    pub fn failure_reason(&self) -> &'static str {
        if self.speed_kbs > 0.0 {
            "too slow"
        } else if self.latency_ms > 0.0 {
            "latency/status"
        } else {
            "connection failed"
        }
    }
}

/// Something that can judge one endpoint.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_reason() {
        let mut result = ProbeResult::failed(Protocol::Http, 0.0);
        assert_eq!(result.failure_reason(), "connection failed");

        result.latency_ms = 1200.0;
        assert_eq!(result.failure_reason(), "latency/status");

        result.speed_kbs = 12.0;
        assert_eq!(result.failure_reason(), "too slow");
    }
}
