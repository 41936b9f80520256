//! Two-phase protocol probe.
//!
//! # Phases
//! ```text
//! Phase 1 (latency):    HEAD → elapsed ms
//!     latency > max_latency_ms or non-2xx → fail fast, phase 2 skipped
//! Phase 2 (throughput): GET → read ≤ max_download_size bytes
//!     speed = bytes / secs / 1024 → success iff speed >= min_speed
//! ```
//!
//! # Design Decisions
//! - Thresholds come from the detected protocol
//! - Timeouts and connection errors are plain failures with zeroed
//!   latency and speed
//! - Any other transport error is logged, then treated the same way

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::Endpoint;
use crate::observability::logging::RunLog;
use crate::probe::protocol::{ProbeLimits, Protocol};
use crate::probe::transport::{StreamTransport, TransportError};
use crate::probe::{ProbeResult, Prober};

/// Latency-then-throughput probe over a [`StreamTransport`].
pub struct ProtocolProbe {
    transport: Arc<dyn StreamTransport>,
    limits: ProbeLimits,
    log: RunLog,
}

impl ProtocolProbe {
    pub fn new(transport: Arc<dyn StreamTransport>, limits: ProbeLimits, log: RunLog) -> Self {
        Self {
            transport,
            limits,
            log,
        }
    }

    pub fn limits(&self) -> &ProbeLimits {
        &self.limits
    }

    fn transport_failure(&self, endpoint: &Endpoint, protocol: Protocol, error: TransportError) -> ProbeResult {
        if error.is_expected() {
            tracing::debug!(url = %endpoint.display_url(), error = %error, "Probe transport failure");
        } else {
            crate::run_log!(
                self.log,
                error,
                url = %endpoint.display_url(),
                error = %truncate(&error.to_string(), 100),
                "Probe error"
            );
        }
        ProbeResult::failed(protocol, 0.0)
    }
}

#[async_trait]
impl Prober for ProtocolProbe {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let protocol = Protocol::detect(&endpoint.url);
        let limits = self.limits.for_protocol(protocol);

        let head = match self.transport.head(&endpoint.url, limits.timeout).await {
            Ok(head) => head,
            Err(e) => return self.transport_failure(endpoint, protocol, e),
        };

        let latency_ms = head.elapsed.as_secs_f64() * 1000.0;
        if latency_ms > limits.max_latency_ms || !head.is_success() {
            tracing::debug!(
                url = %endpoint.display_url(),
                status = head.status,
                latency_ms,
                max_latency_ms = limits.max_latency_ms,
                "Phase 1 rejected"
            );
            return ProbeResult::failed(protocol, latency_ms);
        }

        let sample = match self
            .transport
            .read(&endpoint.url, limits.timeout, self.limits.max_download_size)
            .await
        {
            Ok(sample) => sample,
            Err(e) => return self.transport_failure(endpoint, protocol, e),
        };

        let speed_kbs = sample.speed_kbs();
        ProbeResult {
            success: speed_kbs >= limits.min_speed_kbs,
            speed_kbs,
            latency_ms,
            protocol,
        }
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
