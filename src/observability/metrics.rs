//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define probe metrics (outcomes, latency, throughput, breaker activity)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `probe_results_total` (counter): endpoints by outcome
//! - `probe_latency_ms` (histogram): phase 1 latency by protocol
//! - `probe_download_speed_kbs` (histogram): phase 2 throughput by protocol
//! - `probe_blocked_hosts_total` (counter): hosts blocked by the breaker
//! - `probe_group_failures_total` (counter): group-level failures
//! - `probe_waves_total` (counter): waves dispatched
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are low-cardinality (outcome, protocol); never per host

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::probe::ProbeResult;

/// Final state of one endpoint, as counted in metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Online,
    Offline,
    Whitelisted,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Online => "online",
            Outcome::Offline => "offline",
            Outcome::Whitelisted => "whitelisted",
            Outcome::Skipped => "skipped",
        }
    }
}

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_outcome(outcome: Outcome) {
    metrics::counter!("probe_results_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_probe(result: &ProbeResult) {
    let protocol = result.protocol.as_str();
    if result.latency_ms > 0.0 {
        metrics::histogram!("probe_latency_ms", "protocol" => protocol).record(result.latency_ms);
    }
    if result.speed_kbs > 0.0 {
        metrics::histogram!("probe_download_speed_kbs", "protocol" => protocol).record(result.speed_kbs);
    }
}

pub fn record_host_blocked() {
    metrics::counter!("probe_blocked_hosts_total").increment(1);
}

pub fn record_group_failure() {
    metrics::counter!("probe_group_failures_total").increment(1);
}

pub fn record_wave() {
    metrics::counter!("probe_waves_total").increment(1);
}
