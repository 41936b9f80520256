//! Per-host cooldown governor.
//!
//! # Responsibilities
//! - Space successive groups sent to the same host
//! - Scale the spacing with group size so busy hosts are probed gently
//!
//! # Design Decisions
//! - `required_gap = min_host_interval × (1 + group_size / max_channels_per_host)`
//! - The timestamp is the completion time of the previous group, recorded
//!   whether or not that group succeeded
//! - Groups for one host hold that host's slot from the cooldown wait
//!   until completion, so split hosts are dispatched one group at a time
//! - Uses Tokio's clock so waits are testable with paused time

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::Instant;

/// Enforces a minimum spacing between groups sent to one host.
#[derive(Debug)]
pub struct CooldownGovernor {
    min_interval: Duration,
    max_channels_per_host: usize,
    last_completed: DashMap<String, Instant>,
    host_slots: DashMap<String, Arc<Mutex<()>>>,
}

impl CooldownGovernor {
    pub fn new(min_interval: Duration, max_channels_per_host: usize) -> Self {
        Self {
            min_interval,
            max_channels_per_host: max_channels_per_host.max(1),
            last_completed: DashMap::new(),
            host_slots: DashMap::new(),
        }
    }

    /// Spacing required before dispatching a group of `group_size`.
    pub fn required_gap(&self, group_size: usize) -> Duration {
        let scale = 1.0 + group_size as f64 / self.max_channels_per_host as f64;
        self.min_interval.mul_f64(scale)
    }

    /// Time left before `host` may receive a group of `group_size`.
    pub fn remaining(&self, host: &str, group_size: usize) -> Duration {
        let Some(last) = self.last_completed.get(host).map(|r| *r.value()) else {
            return Duration::ZERO;
        };
        self.required_gap(group_size).saturating_sub(last.elapsed())
    }

    /// Suspend until `host` is out of cooldown. Returns the time waited.
    pub async fn wait(&self, host: &str, group_size: usize) -> Duration {
        let remaining = self.remaining(host, group_size);
        if !remaining.is_zero() {
            tracing::debug!(
                host = %host,
                wait_ms = remaining.as_millis() as u64,
                "Host cooling down"
            );
            tokio::time::sleep(remaining).await;
        }
        remaining
    }

    /// Take `host`'s dispatch slot, then wait out its cooldown.
    ///
    /// The slot is released when the returned guard drops; hold it until
    /// after [`mark_completed`](Self::mark_completed).
    pub async fn acquire(&self, host: &str, group_size: usize) -> OwnedMutexGuard<()> {
        let slot = self.host_slots.entry(host.to_string()).or_default().clone();
        let guard = slot.lock_owned().await;
        self.wait(host, group_size).await;
        guard
    }

    /// Record that a group for `host` has just completed.
    pub fn mark_completed(&self, host: &str) {
        self.last_completed.insert(host.to_string(), Instant::now());
    }
}
