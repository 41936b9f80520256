//! Run coordinator.
//!
//! # Responsibilities
//! - Validate configuration and build the default probe stack
//! - Admit endpoints into the trusted group and origin groups
//! - Dispatch groups wave by wave and account for every endpoint
//! - Turn group panics and errors into group-level failures
//!
//! # Data Flow
//! ```text
//! endpoints ─► partition ─► trusted ─► online (no network)
//!                        └► groups ─► waves ─► join_all(groups)
//!                                                 │
//!        host slot + cooldown ─► blocked? ─► skip ┤
//!                                                 ▼
//!                buffer_unordered(local limit) ─► gate permit ─► probe
//!                                                 │
//!              online ◄── success ── result ── failure ──► offline
//!                                                      + failed set
//!                                                      + breaker
//! ```
//!
//! # Design Decisions
//! - The coordinator owns the endpoints for the duration of the run and
//!   lends each probe task a disjoint `&mut Endpoint`
//! - Every evaluated endpoint fires the progress callback exactly once
//! - Abort leaves unreached endpoints `pending`; in-flight probes finish
//!   and endpoints queued on the gate are released by closing it

use std::any::Any;
use std::collections::HashSet;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use futures_util::FutureExt;
use uuid::Uuid;

use crate::admission::{group_concurrency, partition, Admission, OriginGroup};
use crate::config::validation::validate_tester;
use crate::config::TesterConfig;
use crate::engine::error::EngineError;
use crate::engine::scheduler::{into_waves, wave_size};
use crate::engine::state::RunState;
use crate::engine::stats::RunReport;
use crate::lifecycle::AbortSignal;
use crate::model::{Endpoint, FailedUrls};
use crate::observability::logging::RunLog;
use crate::observability::metrics::{self, Outcome};
use crate::probe::{HttpTransport, ProbeLimits, Prober, ProtocolProbe};
use crate::run_log;

/// How one origin group ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupOutcome {
    Completed,
    Skipped,
    Failed,
    Aborted,
}

/// Probes endpoint lists against a single [`TesterConfig`].
pub struct ProbeEngine {
    config: TesterConfig,
    prober: Arc<dyn Prober>,
    log: RunLog,
}

impl ProbeEngine {
    /// Build an engine backed by the HTTP transport.
    pub fn new(config: TesterConfig) -> Result<Self, EngineError> {
        validate_tester(&config).map_err(EngineError::InvalidConfig)?;

        let log = RunLog::new(config.enable_logging);
        let transport = Arc::new(HttpTransport::new(&config)?);
        let prober = Arc::new(ProtocolProbe::new(
            transport,
            ProbeLimits::from_config(&config),
            log,
        ));

        Ok(Self { config, prober, log })
    }

    /// Build an engine around a custom prober.
    pub fn with_prober(config: TesterConfig, prober: Arc<dyn Prober>) -> Result<Self, EngineError> {
        validate_tester(&config).map_err(EngineError::InvalidConfig)?;
        let log = RunLog::new(config.enable_logging);
        Ok(Self { config, prober, log })
    }

    pub fn config(&self) -> &TesterConfig {
        &self.config
    }

    /// Evaluate every endpoint in `endpoints`, updating each in place.
    ///
    /// Failed URLs are added to `failed`; `progress` fires once per
    /// evaluated endpoint. Returns [`EngineError::Aborted`] if `abort`
    /// fires before every endpoint is evaluated.
    pub async fn run<F>(
        &self,
        endpoints: &mut [Endpoint],
        whitelist: &HashSet<String>,
        failed: &FailedUrls,
        progress: F,
        abort: &AbortSignal,
    ) -> Result<RunReport, EngineError>
    where
        F: Fn() + Sync,
    {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let total = endpoints.len();
        let state = RunState::new(&self.config, failed.clone());

        run_log!(
            self.log,
            info,
            %run_id,
            total,
            concurrency = self.config.concurrency,
            max_http_latency_ms = self.config.max_http_latency_ms,
            min_download_speed = self.config.min_download_speed,
            "Probe run starting"
        );

        let Admission { trusted, groups } =
            partition(endpoints, whitelist, self.config.max_channels_per_host);

        for endpoint in trusted {
            endpoint.mark_trusted();
            state.stats.record(Outcome::Whitelisted);
            tracing::debug!(name = %endpoint.name, "Whitelisted, probe skipped");
            progress();
        }

        let group_count = groups.len();
        let size = wave_size(group_count);
        let mut aborted = false;

        for (index, wave) in into_waves(groups, size).into_iter().enumerate() {
            if abort.is_triggered() {
                aborted = true;
                break;
            }

            state.stats.record_wave();
            tracing::debug!(%run_id, wave = index + 1, groups = wave.len(), "Dispatching wave");

            let outcomes = close_gate_on_abort(
                join_all(
                    wave.into_iter()
                        .map(|group| self.run_group(group, &state, &progress, abort)),
                ),
                &state,
                abort,
            )
            .await;

            if outcomes.contains(&GroupOutcome::Aborted) {
                aborted = true;
                break;
            }
        }

        let summary = state.stats.summarize(total, group_count, started.elapsed());
        let report = RunReport {
            run_id,
            summary,
            host_failures: state.breaker.failure_totals(),
            blocked_hosts: state.breaker.blocked_hosts(),
        };

        if aborted {
            tracing::warn!(
                %run_id,
                evaluated = report.summary.evaluated(),
                total,
                "Probe run aborted"
            );
            return Err(EngineError::Aborted {
                evaluated: report.summary.evaluated(),
            });
        }

        run_log!(
            self.log,
            info,
            %run_id,
            total,
            online = report.summary.online,
            offline = report.summary.offline,
            blocked_hosts = report.blocked_hosts.len(),
            success_rate = report.summary.success_rate(),
            elapsed_secs = report.summary.elapsed_secs,
            "Probe run finished"
        );

        Ok(report)
    }

    /// Run `endpoints` in consecutive chunks of `chunk_size`.
    ///
    /// Each chunk gets fresh breaker and cooldown state; the failed set,
    /// progress callback and abort signal are shared across chunks.
    pub async fn run_chunked<F>(
        &self,
        endpoints: &mut [Endpoint],
        whitelist: &HashSet<String>,
        failed: &FailedUrls,
        progress: F,
        abort: &AbortSignal,
    ) -> Result<RunReport, EngineError>
    where
        F: Fn() + Sync,
    {
        let chunk_size = self.config.chunk_size.max(1);
        let chunks = endpoints.len().div_ceil(chunk_size);
        let mut combined: Option<RunReport> = None;

        for (index, chunk) in endpoints.chunks_mut(chunk_size).enumerate() {
            if chunks > 1 {
                run_log!(self.log, info, chunk = index + 1, chunks, size = chunk.len(), "Processing chunk");
            }

            let report = match self.run(chunk, whitelist, failed, &progress, abort).await {
                Ok(report) => report,
                Err(EngineError::Aborted { evaluated }) => {
                    let earlier = combined.as_ref().map_or(0, |r| r.summary.evaluated());
                    return Err(EngineError::Aborted {
                        evaluated: earlier + evaluated,
                    });
                }
                Err(e) => return Err(e),
            };

            match combined.as_mut() {
                Some(combined) => combined.merge(report),
                None => combined = Some(report),
            }
        }

        Ok(combined.unwrap_or_else(RunReport::empty))
    }

    async fn run_group<F>(
        &self,
        group: OriginGroup<'_>,
        state: &RunState,
        progress: &F,
        abort: &AbortSignal,
    ) -> GroupOutcome
    where
        F: Fn() + Sync,
    {
        let OriginGroup { key, host, mut members } = group;
        if abort.is_triggered() {
            return GroupOutcome::Aborted;
        }

        let _slot = state.cooldown.acquire(&host, members.len()).await;
        if abort.is_triggered() {
            return GroupOutcome::Aborted;
        }

        if state.breaker.is_blocked(&host) {
            tracing::debug!(group = %key, size = members.len(), "Host blocked, skipping group");
            for endpoint in members.iter_mut() {
                self.skip_endpoint(endpoint, state, progress);
            }
            return GroupOutcome::Skipped;
        }

        let limit = group_concurrency(
            self.config.concurrency,
            members.len(),
            self.config.max_channels_per_host,
        );

        let result = AssertUnwindSafe(self.probe_group(&host, &mut members, limit, state, progress, abort))
            .catch_unwind()
            .await;

        let outcome = match result {
            Ok(Ok(())) => {
                state.breaker.record_group_success(&host);
                GroupOutcome::Completed
            }
            Ok(Err(EngineError::Aborted { .. })) => GroupOutcome::Aborted,
            Ok(Err(e)) => {
                self.fail_group(&key, &host, &e.to_string(), &mut members, state, progress);
                GroupOutcome::Failed
            }
            Err(panic) => {
                self.fail_group(&key, &host, &panic_message(panic.as_ref()), &mut members, state, progress);
                GroupOutcome::Failed
            }
        };

        state.cooldown.mark_completed(&host);
        outcome
    }

    async fn probe_group<F>(
        &self,
        host: &str,
        members: &mut [&mut Endpoint],
        limit: usize,
        state: &RunState,
        progress: &F,
        abort: &AbortSignal,
    ) -> Result<(), EngineError>
    where
        F: Fn() + Sync,
    {
        let results: Vec<Result<(), EngineError>> = stream::iter(members.iter_mut())
            .map(|endpoint| self.probe_endpoint(endpoint, host, state, progress, abort))
            .buffer_unordered(limit)
            .collect()
            .await;

        results.into_iter().collect()
    }

    async fn probe_endpoint<F>(
        &self,
        endpoint: &mut Endpoint,
        host: &str,
        state: &RunState,
        progress: &F,
        abort: &AbortSignal,
    ) -> Result<(), EngineError>
    where
        F: Fn() + Sync,
    {
        let permit = match state.gate.acquire().await {
            Ok(permit) => permit,
            Err(EngineError::GateClosed) if abort.is_triggered() => {
                return Err(EngineError::Aborted {
                    evaluated: state.stats.evaluated(),
                });
            }
            Err(e) => return Err(e),
        };

        if abort.is_triggered() {
            return Err(EngineError::Aborted {
                evaluated: state.stats.evaluated(),
            });
        }
        if state.breaker.is_blocked(host) {
            drop(permit);
            self.skip_endpoint(endpoint, state, progress);
            return Ok(());
        }

        let result = self.prober.probe(endpoint).await;
        drop(permit);
        metrics::record_probe(&result);

        if result.success {
            endpoint.mark_online(result.latency_ms, result.speed_kbs);
            state.stats.record(Outcome::Online);
            run_log!(
                self.log,
                info,
                name = %endpoint.name,
                protocol = %result.protocol,
                speed_kbs = result.speed_kbs,
                latency_ms = result.latency_ms,
                "Endpoint online"
            );
        } else {
            endpoint.mark_offline(result.latency_ms, result.speed_kbs);
            state.failed.insert(&endpoint.url);
            state.breaker.record_failure(host);
            state.stats.record(Outcome::Offline);
            run_log!(
                self.log,
                warn,
                name = %endpoint.name,
                reason = result.failure_reason(),
                url = %endpoint.display_url(),
                "Endpoint offline"
            );
        }

        progress();
        Ok(())
    }

    /// Host already blocked: offline without a probe or a breaker charge.
    fn skip_endpoint<F>(&self, endpoint: &mut Endpoint, state: &RunState, progress: &F)
    where
        F: Fn() + Sync,
    {
        endpoint.mark_offline(0.0, 0.0);
        state.failed.insert(&endpoint.url);
        state.stats.record(Outcome::Skipped);
        progress();
    }

    fn fail_group<F>(
        &self,
        key: &str,
        host: &str,
        reason: &str,
        members: &mut [&mut Endpoint],
        state: &RunState,
        progress: &F,
    ) where
        F: Fn() + Sync,
    {
        run_log!(self.log, error, group = %key, error = %reason, "Origin group failed");
        state.breaker.record_failure(host);
        state.stats.record_group_failure();

        for endpoint in members.iter_mut().filter(|e| e.is_pending()) {
            endpoint.mark_offline(0.0, 0.0);
            state.failed.insert(&endpoint.url);
            state.stats.record(Outcome::Offline);
            progress();
        }
    }
}

/// Drive `work` to completion, closing the gate if `abort` fires first so
/// endpoints still queued for a permit stop instead of starting.
async fn close_gate_on_abort<T>(work: impl Future<Output = T>, state: &RunState, abort: &AbortSignal) -> T {
    tokio::pin!(work);
    tokio::select! {
        output = &mut work => output,
        _ = abort.triggered() => {
            state.gate.close();
            work.await
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panic: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panic: {message}")
    } else {
        "panic: unknown payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::model::Status;
    use crate::probe::{ProbeResult, Protocol};

    struct FixedProber {
        online: bool,
        calls: AtomicUsize,
    }

    impl FixedProber {
        fn new(online: bool) -> Arc<Self> {
            Arc::new(Self {
                online,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, _endpoint: &Endpoint) -> ProbeResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.online {
                ProbeResult {
                    success: true,
                    speed_kbs: 80.0,
                    latency_ms: 60.0,
                    protocol: Protocol::Http,
                }
            } else {
                ProbeResult::failed(Protocol::Http, 0.0)
            }
        }
    }

    fn config(concurrency: usize) -> TesterConfig {
        TesterConfig {
            concurrency,
            min_host_interval: 0.0,
            enable_logging: false,
            ..TesterConfig::default()
        }
    }

    fn endpoints(urls: &[&str]) -> Vec<Endpoint> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| Endpoint::new(format!("ch{i}"), *url))
            .collect()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = ProbeEngine::with_prober(config(0), FixedProber::new(true));
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let prober = FixedProber::new(true);
        let engine = ProbeEngine::with_prober(config(4), prober.clone()).unwrap();
        let progress = AtomicUsize::new(0);

        let report = engine
            .run(
                &mut [],
                &HashSet::new(),
                &FailedUrls::new(),
                || {
                    progress.fetch_add(1, Ordering::SeqCst);
                },
                &AbortSignal::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.waves, 0);
        assert_eq!(progress.load(Ordering::SeqCst), 0);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_every_endpoint_evaluated_once() {
        let prober = FixedProber::new(true);
        let engine = ProbeEngine::with_prober(config(4), prober.clone()).unwrap();
        let mut list = endpoints(&[
            "http://a.example/1",
            "http://a.example/2",
            "http://b.example/1",
            "rtp://239.0.0.1:5000",
        ]);
        let progress = AtomicUsize::new(0);

        let report = engine
            .run(
                &mut list,
                &HashSet::new(),
                &FailedUrls::new(),
                || {
                    progress.fetch_add(1, Ordering::SeqCst);
                },
                &AbortSignal::new(),
            )
            .await
            .unwrap();

        assert_eq!(progress.load(Ordering::SeqCst), 4);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.summary.online, 4);
        assert_eq!(report.summary.groups, 3);
        assert!(list.iter().all(|e| e.status == Status::Online));
        assert_eq!(list[0].download_speed_kbs, 80.0);
        assert_eq!(list[0].response_time_ms, 60.0);
    }

    #[tokio::test]
    async fn test_aborted_before_start_leaves_pending() {
        let prober = FixedProber::new(true);
        let engine = ProbeEngine::with_prober(config(2), prober.clone()).unwrap();
        let mut list = endpoints(&["http://a.example/1", "http://b.example/1"]);
        let abort = AbortSignal::new();
        abort.trigger();

        let err = engine
            .run(&mut list, &HashSet::new(), &FailedUrls::new(), || {}, &abort)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Aborted { evaluated: 0 }));
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
        assert!(list.iter().all(Endpoint::is_pending));
    }

    #[tokio::test]
    async fn test_run_chunked_merges_reports() {
        let prober = FixedProber::new(false);
        let engine = ProbeEngine::with_prober(
            TesterConfig {
                chunk_size: 2,
                ..config(2)
            },
            prober.clone(),
        )
        .unwrap();
        let mut list = endpoints(&[
            "http://a.example/1",
            "http://b.example/1",
            "http://a.example/2",
            "http://c.example/1",
            "http://a.example/3",
        ]);
        let failed = FailedUrls::new();

        let report = engine
            .run_chunked(&mut list, &HashSet::new(), &failed, || {}, &AbortSignal::new())
            .await
            .unwrap();

        assert_eq!(report.summary.total, 5);
        assert_eq!(report.summary.offline, 5);
        assert_eq!(report.host_failures["a.example"], 3);
        assert_eq!(failed.len(), 5);
    }

    #[test]
    fn test_panic_message() {
        let panic: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(panic.as_ref()), "panic: boom");

        let panic: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(panic.as_ref()), "panic: owned");

        let panic: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(panic.as_ref()), "panic: unknown payload");
    }
}
