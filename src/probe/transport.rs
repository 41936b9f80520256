//! Transport seam for the two-phase probe.
//!
//! The probe logic only needs two primitives: a header round-trip and a
//! bounded streaming read. Keeping them behind a trait lets the probe be
//! driven by a scripted transport in tests.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Outcome of the phase 1 header request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadResponse {
    pub status: u16,
    /// Time from sending the request until the response head arrived.
    pub elapsed: Duration,
}

impl HeadResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outcome of the phase 2 streaming read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadSample {
    pub bytes: u64,
    pub elapsed: Duration,
}

impl ReadSample {
    /// Throughput in KB/s; zero if no time elapsed.
    pub fn speed_kbs(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes as f64 / secs / 1024.0
        } else {
            0.0
        }
    }
}

/// Errors raised by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The phase deadline passed.
    #[error("request timed out")]
    Timeout,

    /// The origin could not be reached or dropped the connection.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Anything else (bad URL, protocol violation, ...).
    #[error("unexpected transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Timeouts and connection errors are routine probe failures.
    pub fn is_expected(&self) -> bool {
        matches!(self, TransportError::Timeout | TransportError::Connect(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() || e.is_request() || e.is_body() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Network primitives used by the protocol probe.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Phase 1: header-only request.
    async fn head(&self, url: &str, timeout: Duration) -> Result<HeadResponse, TransportError>;

    /// Phase 2: read up to `max_bytes` of the body.
    async fn read(&self, url: &str, timeout: Duration, max_bytes: u64) -> Result<ReadSample, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_kbs() {
        let sample = ReadSample {
            bytes: 100 * 1024,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(sample.speed_kbs(), 50.0);

        let instant = ReadSample {
            bytes: 1024,
            elapsed: Duration::ZERO,
        };
        assert_eq!(instant.speed_kbs(), 0.0);
    }

    #[test]
    fn test_success_status_range() {
        let head = |status| HeadResponse {
            status,
            elapsed: Duration::ZERO,
        };
        assert!(head(200).is_success());
        assert!(head(206).is_success());
        assert!(!head(302).is_success());
        assert!(!head(500).is_success());
    }

    #[test]
    fn test_expected_errors() {
        assert!(TransportError::Timeout.is_expected());
        assert!(TransportError::Connect("refused".into()).is_expected());
        assert!(!TransportError::Other("bad scheme".into()).is_expected());
    }
}
