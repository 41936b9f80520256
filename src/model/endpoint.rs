//! Endpoint record.
//!
//! # Responsibilities
//! - Represent one candidate stream handed over by the upstream pipeline
//! - Carry the probe verdict (status, latency, throughput) back out
//!
//! # Lifecycle
//! ```text
//! pending → online   (terminal)
//! pending → offline  (terminal)
//! ```
//! A record is written by exactly one probe task per run.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Longest URL prefix shown in log lines.
const LOG_URL_LIMIT: usize = 100;

/// Probe status of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Online,
    Offline,
}

/// A single stream URL under test.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Endpoint {
    /// Display label.
    pub name: String,
    /// Probe target.
    pub url: String,
    /// Category assigned upstream; opaque to the engine.
    #[serde(default = "default_category")]
    pub category: String,
    /// Category as found in the source playlist; opaque to the engine.
    #[serde(default = "default_category")]
    pub original_category: String,
    #[serde(default)]
    pub status: Status,
    /// Header round-trip in milliseconds.
    #[serde(default)]
    pub response_time_ms: f64,
    /// Measured throughput in KB/s.
    #[serde(default)]
    pub download_speed_kbs: f64,
}

fn default_category() -> String {
    "Uncategorized".to_string()
}

impl Endpoint {
    /// Create a pending endpoint with default categories.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            category: default_category(),
            original_category: default_category(),
            status: Status::Pending,
            response_time_ms: 0.0,
            download_speed_kbs: 0.0,
        }
    }

    /// True if the lowercased name appears in `whitelist`.
    pub fn is_whitelisted(&self, whitelist: &HashSet<String>) -> bool {
        !whitelist.is_empty() && whitelist.contains(&self.name.to_lowercase())
    }

    /// Trusted bypass: online without a probe, measurements untouched.
    pub fn mark_trusted(&mut self) {
        self.status = Status::Online;
    }

    pub fn mark_online(&mut self, latency_ms: f64, speed_kbs: f64) {
        self.status = Status::Online;
        self.response_time_ms = latency_ms.max(0.0);
        self.download_speed_kbs = speed_kbs.max(0.0);
    }

    pub fn mark_offline(&mut self, latency_ms: f64, speed_kbs: f64) {
        self.status = Status::Offline;
        self.response_time_ms = latency_ms.max(0.0);
        self.download_speed_kbs = speed_kbs.max(0.0);
    }

    pub fn is_pending(&self) -> bool {
        self.status == Status::Pending
    }

    /// URL shortened for log output.
    pub fn display_url(&self) -> String {
        match self.url.char_indices().nth(LOG_URL_LIMIT) {
            Some((idx, _)) => format!("{}...", &self.url[..idx]),
            None => self.url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist_is_case_insensitive() {
        let whitelist: HashSet<String> = ["cctv1".to_string()].into_iter().collect();
        assert!(Endpoint::new("CCTV1", "http://a/1").is_whitelisted(&whitelist));
        assert!(Endpoint::new("cCtV1", "http://a/1").is_whitelisted(&whitelist));
        assert!(!Endpoint::new("CCTV2", "http://a/1").is_whitelisted(&whitelist));
        assert!(!Endpoint::new("CCTV1", "http://a/1").is_whitelisted(&HashSet::new()));
    }

    #[test]
    fn test_display_url_truncates() {
        let long = format!("http://example.com/{}", "x".repeat(200));
        let shown = Endpoint::new("long", long).display_url();
        assert_eq!(shown.chars().count(), LOG_URL_LIMIT + 3);
        assert!(shown.ends_with("..."));

        let short = Endpoint::new("short", "http://a/1").display_url();
        assert_eq!(short, "http://a/1");
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let ep: Endpoint =
            serde_json::from_str(r#"{"name": "CCTV1", "url": "http://10.0.0.1/live1"}"#).unwrap();
        assert_eq!(ep.status, Status::Pending);
        assert_eq!(ep.category, "Uncategorized");
        assert_eq!(ep.response_time_ms, 0.0);
    }
}
