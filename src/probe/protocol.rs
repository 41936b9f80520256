//! Protocol detection and per-protocol limits.
//!
//! UDP/RTP-style endpoints are either addressed directly (`udp://`,
//! `rtp://`) or relayed over HTTP by a multicast proxy whose path contains
//! a `/udp/` or `/rtp/` segment. Everything else is HTTP-style.

use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::config::TesterConfig;

/// Probe flavor, selecting timeouts and thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Udp,
}

impl Protocol {
    /// Classify a URL.
    pub fn detect(url: &str) -> Self {
        let (scheme, path) = match Url::parse(url.trim()) {
            Ok(parsed) => (parsed.scheme().to_ascii_lowercase(), parsed.path().to_ascii_lowercase()),
            Err(_) => {
                let lower = url.trim().to_ascii_lowercase();
                match lower.split_once("://") {
                    Some((scheme, rest)) => (scheme.to_string(), rest.to_string()),
                    None => (String::new(), lower),
                }
            }
        };

        if scheme == "udp" || scheme == "rtp" || path.contains("/udp/") || path.contains("/rtp/") {
            Protocol::Udp
        } else {
            Protocol::Http
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Udp => "udp",
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds applied to one protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtocolLimits {
    /// Timeout applied to each phase.
    pub timeout: Duration,
    /// Phase 1 latency ceiling in milliseconds.
    pub max_latency_ms: f64,
    /// Phase 2 throughput floor in KB/s.
    pub min_speed_kbs: f64,
}

/// Limits for both protocols plus the shared read budget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeLimits {
    pub http: ProtocolLimits,
    pub udp: ProtocolLimits,
    /// Bytes read in phase 2 before stopping early.
    pub max_download_size: u64,
}

impl ProbeLimits {
    /// Resolve limits from a validated config.
    pub fn from_config(config: &TesterConfig) -> Self {
        Self {
            http: ProtocolLimits {
                timeout: Duration::from_secs_f64(config.http_timeout),
                max_latency_ms: config.max_http_latency_ms,
                min_speed_kbs: config.min_download_speed,
            },
            udp: ProtocolLimits {
                timeout: Duration::from_secs_f64(config.udp_timeout),
                max_latency_ms: config.max_udp_latency_ms,
                min_speed_kbs: config.min_udp_download_speed,
            },
            max_download_size: config.max_download_size,
        }
    }

    pub fn for_protocol(&self, protocol: Protocol) -> &ProtocolLimits {
        match protocol {
            Protocol::Http => &self.http,
            Protocol::Udp => &self.udp,
        }
    }
}
