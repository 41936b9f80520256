//! Run statistics.
//!
//! Live counters are atomics updated by probe tasks; a [`RunSummary`] is
//! the frozen view handed back to the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::model::{Endpoint, Status};
use crate::observability::metrics::{self, Outcome};

/// Counters updated while a run is in progress.
#[derive(Debug, Default)]
pub struct RunStats {
    online: AtomicUsize,
    offline: AtomicUsize,
    whitelisted: AtomicUsize,
    skipped: AtomicUsize,
    group_failures: AtomicUsize,
    waves: AtomicUsize,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one endpoint's final state.
    pub fn record(&self, outcome: Outcome) {
        match outcome {
            Outcome::Online => {
                self.online.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Whitelisted => {
                self.online.fetch_add(1, Ordering::Relaxed);
                self.whitelisted.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Offline => {
                self.offline.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Skipped => {
                self.offline.fetch_add(1, Ordering::Relaxed);
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
        metrics::record_outcome(outcome);
    }

    pub fn record_group_failure(&self) {
        self.group_failures.fetch_add(1, Ordering::Relaxed);
        metrics::record_group_failure();
    }

    pub fn record_wave(&self) {
        self.waves.fetch_add(1, Ordering::Relaxed);
        metrics::record_wave();
    }

    /// Endpoints that reached a terminal status so far.
    pub fn evaluated(&self) -> usize {
        self.online.load(Ordering::Relaxed) + self.offline.load(Ordering::Relaxed)
    }

    pub fn summarize(&self, total: usize, groups: usize, elapsed: Duration) -> RunSummary {
        RunSummary {
            total,
            online: self.online.load(Ordering::Relaxed),
            offline: self.offline.load(Ordering::Relaxed),
            whitelisted: self.whitelisted.load(Ordering::Relaxed),
            skipped_blocked: self.skipped.load(Ordering::Relaxed),
            group_failures: self.group_failures.load(Ordering::Relaxed),
            groups,
            waves: self.waves.load(Ordering::Relaxed),
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }
}

/// Totals for a finished run.
///
/// `online` includes whitelisted endpoints; `offline` includes endpoints
/// skipped because their host was blocked.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub whitelisted: usize,
    pub skipped_blocked: usize,
    pub group_failures: usize,
    pub groups: usize,
    pub waves: usize,
    pub elapsed_secs: f64,
}

impl RunSummary {
    /// Status counts read back from endpoint records, e.g. after an abort.
    pub fn tally(endpoints: &[Endpoint]) -> Self {
        let count = |status| endpoints.iter().filter(|e| e.status == status).count();
        Self {
            total: endpoints.len(),
            online: count(Status::Online),
            offline: count(Status::Offline),
            ..Self::default()
        }
    }

    pub fn evaluated(&self) -> usize {
        self.online + self.offline
    }

    /// Percentage of all endpoints that ended online.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.online as f64 * 100.0 / self.total as f64
        }
    }

    pub fn merge(&mut self, other: &RunSummary) {
        self.total += other.total;
        self.online += other.online;
        self.offline += other.offline;
        self.whitelisted += other.whitelisted;
        self.skipped_blocked += other.skipped_blocked;
        self.group_failures += other.group_failures;
        self.groups += other.groups;
        self.waves += other.waves;
        self.elapsed_secs += other.elapsed_secs;
    }
}

/// Everything a run reports besides the mutated endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub summary: RunSummary,
    /// Breaker failures recorded per host over the whole run.
    pub host_failures: HashMap<String, u32>,
    /// Hosts blocked by the breaker, sorted.
    pub blocked_hosts: Vec<String>,
}

impl RunReport {
    pub fn empty() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            summary: RunSummary::default(),
            host_failures: HashMap::new(),
            blocked_hosts: Vec::new(),
        }
    }

    /// Fold a later run (e.g. the next chunk) into this report.
    pub fn merge(&mut self, other: RunReport) {
        self.summary.merge(&other.summary);
        for (host, failures) in other.host_failures {
            *self.host_failures.entry(host).or_insert(0) += failures;
        }
        self.blocked_hosts.extend(other.blocked_hosts);
        self.blocked_hosts.sort();
        self.blocked_hosts.dedup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_accounting() {
        let stats = RunStats::new();
        stats.record(Outcome::Online);
        stats.record(Outcome::Whitelisted);
        stats.record(Outcome::Offline);
        stats.record(Outcome::Skipped);
        stats.record_wave();

        let summary = stats.summarize(5, 2, Duration::from_secs(2));
        assert_eq!(summary.online, 2);
        assert_eq!(summary.whitelisted, 1);
        assert_eq!(summary.offline, 2);
        assert_eq!(summary.skipped_blocked, 1);
        assert_eq!(summary.waves, 1);
        assert_eq!(summary.evaluated(), 4);
        assert_eq!(summary.success_rate(), 40.0);
    }

    #[test]
    fn test_tally() {
        let mut endpoints = vec![
            Endpoint::new("a", "http://a.example/1"),
            Endpoint::new("b", "http://b.example/1"),
            Endpoint::new("c", "http://c.example/1"),
        ];
        endpoints[0].mark_online(10.0, 100.0);
        endpoints[1].mark_offline(0.0, 0.0);

        let summary = RunSummary::tally(&endpoints);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.online, 1);
        assert_eq!(summary.offline, 1);
        assert_eq!(summary.evaluated(), 2);
    }

    #[test]
    fn test_empty_success_rate() {
        assert_eq!(RunSummary::default().success_rate(), 0.0);
    }

    #[test]
    fn test_report_merge() {
        let mut first = RunReport::empty();
        first.summary.total = 2;
        first.summary.online = 2;
        first.host_failures.insert("a".into(), 1);
        first.blocked_hosts.push("b".into());

        let mut second = RunReport::empty();
        second.summary.total = 3;
        second.summary.offline = 3;
        second.host_failures.insert("a".into(), 2);
        second.host_failures.insert("c".into(), 3);
        second.blocked_hosts.push("b".into());
        second.blocked_hosts.push("a".into());

        first.merge(second);
        assert_eq!(first.summary.total, 5);
        assert_eq!(first.summary.evaluated(), 5);
        assert_eq!(first.host_failures["a"], 3);
        assert_eq!(first.host_failures["c"], 3);
        assert_eq!(first.blocked_hosts, vec!["a".to_string(), "b".to_string()]);
    }
}
