//! Per-origin circuit breaker.
//!
//! # States
//! - Closed: probes against the host are dispatched
//! - Blocked: no further probes for the remainder of the run
//!
//! # State Transitions
//! ```text
//! Closed → Blocked: consecutive failures >= max_failures_per_host
//! Blocked → (terminal for the run)
//! ```
//!
//! # Design Decisions
//! - One circuit per origin host, shared by all groups of that host
//! - A group finishing cleanly resets the consecutive counter
//! - Increment-and-compare happens under the map's entry lock, so a
//!   single update is never split across tasks
//! - Already-dispatched probes are allowed to finish after blocking

use std::collections::HashMap;

use dashmap::DashMap;

use crate::observability::metrics;

/// Breaker bookkeeping for one host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostCircuit {
    /// Failures since the last clean group.
    pub consecutive_failures: u32,
    /// Every failure recorded during the run.
    pub total_failures: u32,
    /// Monotonic: once true, stays true for the run.
    pub blocked: bool,
}

/// Tracks failures per host and blocks hosts past a threshold.
#[derive(Debug)]
pub struct CircuitBreaker {
    threshold: u32,
    hosts: DashMap<String, HostCircuit>,
}

impl CircuitBreaker {
    pub fn new(max_failures_per_host: u32) -> Self {
        Self {
            threshold: max_failures_per_host.max(1),
            hosts: DashMap::new(),
        }
    }

    /// Record one failure against `host`.
    ///
    /// Returns true if this failure blocked the host.
    pub fn record_failure(&self, host: &str) -> bool {
        let mut circuit = self.hosts.entry(host.to_string()).or_default();
        circuit.consecutive_failures = circuit.consecutive_failures.saturating_add(1);
        circuit.total_failures = circuit.total_failures.saturating_add(1);

        if circuit.blocked || circuit.consecutive_failures < self.threshold {
            return false;
        }

        circuit.blocked = true;
        let failures = circuit.consecutive_failures;
        drop(circuit);

        tracing::warn!(
            host = %host,
            failures,
            threshold = self.threshold,
            "Circuit opened, host blocked for the rest of the run"
        );
        metrics::record_host_blocked();
        true
    }

    /// A group for `host` finished without a group-level failure.
    pub fn record_group_success(&self, host: &str) {
        if let Some(mut circuit) = self.hosts.get_mut(host) {
            circuit.consecutive_failures = 0;
        }
    }

    pub fn is_blocked(&self, host: &str) -> bool {
        self.hosts.get(host).map(|c| c.blocked).unwrap_or(false)
    }

    /// Current consecutive failure count for `host`.
    pub fn failure_count(&self, host: &str) -> u32 {
        self.hosts.get(host).map(|c| c.consecutive_failures).unwrap_or(0)
    }

    pub fn circuit(&self, host: &str) -> HostCircuit {
        self.hosts.get(host).map(|c| *c).unwrap_or_default()
    }

    /// Cumulative failures per host.
    pub fn failure_totals(&self) -> HashMap<String, u32> {
        self.hosts
            .iter()
            .filter(|r| r.value().total_failures > 0)
            .map(|r| (r.key().clone(), r.value().total_failures))
            .collect()
    }

    /// Blocked hosts, sorted.
    pub fn blocked_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = self
            .hosts
            .iter()
            .filter(|r| r.value().blocked)
            .map(|r| r.key().clone())
            .collect();
        hosts.sort();
        hosts
    }
}
