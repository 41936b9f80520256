//! Per-run shared state.
//!
//! Owned by the coordinator for the duration of one run and lent to
//! every group task by reference. Nothing here outlives the run except
//! the failed-URL handle, which belongs to the caller.

use crate::admission::AdmissionGate;
use crate::config::TesterConfig;
use crate::engine::stats::RunStats;
use crate::model::FailedUrls;
use crate::resilience::{CircuitBreaker, CooldownGovernor};

#[derive(Debug)]
pub struct RunState {
    pub gate: AdmissionGate,
    pub breaker: CircuitBreaker,
    pub cooldown: CooldownGovernor,
    pub stats: RunStats,
    pub failed: FailedUrls,
}

impl RunState {
    pub fn new(config: &TesterConfig, failed: FailedUrls) -> Self {
        Self {
            gate: AdmissionGate::new(config.concurrency),
            breaker: CircuitBreaker::new(config.max_failures_per_host),
            cooldown: CooldownGovernor::new(config.host_interval(), config.max_channels_per_host),
            stats: RunStats::new(),
            failed,
        }
    }
}
