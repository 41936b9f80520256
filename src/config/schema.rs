//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a probe run.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the stream prober.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProbeConfig {
    /// Probing engine settings.
    pub tester: TesterConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Input and output file locations.
    pub paths: PathsConfig,
}

/// Probing engine configuration.
///
/// Durations are expressed in (fractional) seconds, latencies in
/// milliseconds and speeds in KB/s.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TesterConfig {
    /// Client-wide request ceiling in seconds.
    pub timeout: f64,

    /// Maximum probes in flight across the whole run.
    pub concurrency: usize,

    /// Throughput floor for HTTP-style endpoints (KB/s).
    pub min_download_speed: f64,

    /// Throughput floor for UDP/RTP-style endpoints (KB/s).
    pub min_udp_download_speed: f64,

    /// Bytes read during the throughput phase before stopping early.
    pub max_download_size: u64,

    /// Per-phase timeout for HTTP-style endpoints in seconds.
    pub http_timeout: f64,

    /// Per-phase timeout for UDP/RTP-style endpoints in seconds.
    pub udp_timeout: f64,

    /// Latency ceiling for HTTP-style endpoints (ms).
    pub max_http_latency_ms: f64,

    /// Latency ceiling for UDP/RTP-style endpoints (ms).
    pub max_udp_latency_ms: f64,

    /// Largest origin group; bigger hosts are split.
    pub max_channels_per_host: usize,

    /// Consecutive failures before a host is blocked for the run.
    pub max_failures_per_host: u32,

    /// Base spacing between groups sent to the same host, in seconds.
    pub min_host_interval: f64,

    /// Emit per-endpoint and per-run log lines.
    pub enable_logging: bool,

    /// User-Agent header sent with every probe.
    pub user_agent: String,

    /// Skip TLS certificate verification against origins.
    pub accept_invalid_certs: bool,

    /// Endpoints per independent run when probing very large lists.
    pub chunk_size: usize,
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            timeout: 10.0,
            concurrency: 8,
            min_download_speed: 0.1,
            min_udp_download_speed: 0.1,
            max_download_size: 100 * 1024,
            http_timeout: 10.0,
            udp_timeout: 5.0,
            max_http_latency_ms: 1000.0,
            max_udp_latency_ms: 1000.0,
            max_channels_per_host: 50,
            max_failures_per_host: 5,
            min_host_interval: 0.1,
            enable_logging: true,
            user_agent: "Mozilla/5.0".to_string(),
            accept_invalid_certs: true,
            chunk_size: 5000,
        }
    }
}

impl TesterConfig {
    /// Client-wide timeout as a `Duration`.
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }

    /// Base host spacing as a `Duration`.
    pub fn host_interval(&self) -> Duration {
        Duration::from_secs_f64(self.min_host_interval)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Optional file that receives a copy of every log line.
    pub log_file: Option<PathBuf>,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// File locations used by the command-line runner.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Names that are trusted without probing, one per line.
    pub whitelist_path: PathBuf,

    /// Where the failed-URL list is written after a run.
    pub failed_urls_path: PathBuf,

    /// Optional JSON report of every evaluated endpoint.
    pub report_path: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            whitelist_path: PathBuf::from("config/whitelist.txt"),
            failed_urls_path: PathBuf::from("config/failed_urls.txt"),
            report_path: None,
        }
    }
}
