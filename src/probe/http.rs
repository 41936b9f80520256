//! reqwest-backed transport.
//!
//! # Responsibilities
//! - Phase 1: `HEAD` request, timing until the response head arrives
//! - Phase 2: `GET` request, streaming the body until the read budget
//!   is spent or the body ends
//!
//! # Design Decisions
//! - One pooled client per engine, shared by every probe
//! - Origin certificates are not verified unless configured otherwise
//! - Per-phase timeouts are set on the request, capped by the client-wide
//!   timeout; a request timeout replaces the client's rather than
//!   narrowing it

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::StreamExt;

use crate::config::TesterConfig;
use crate::probe::transport::{HeadResponse, ReadSample, StreamTransport, TransportError};

/// HTTP transport for stream probing.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    ceiling: Option<Duration>,
}

impl HttpTransport {
    /// Build the shared client from config.
    pub fn new(config: &TesterConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.client_timeout())
            .connect_timeout(config.client_timeout())
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .pool_max_idle_per_host(config.concurrency.max(1))
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            ceiling: Some(config.client_timeout()),
        })
    }

    /// Wrap an existing client. Per-phase timeouts apply uncapped.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client, ceiling: None }
    }

    fn request_timeout(&self, timeout: Duration) -> Duration {
        match self.ceiling {
            Some(ceiling) => timeout.min(ceiling),
            None => timeout,
        }
    }
}

#[async_trait]
impl StreamTransport for HttpTransport {
    async fn head(&self, url: &str, timeout: Duration) -> Result<HeadResponse, TransportError> {
        let start = Instant::now();
        let response = self.client.head(url).timeout(self.request_timeout(timeout)).send().await?;

        Ok(HeadResponse {
            status: response.status().as_u16(),
            elapsed: start.elapsed(),
        })
    }

    async fn read(&self, url: &str, timeout: Duration, max_bytes: u64) -> Result<ReadSample, TransportError> {
        let start = Instant::now();
        let response = self.client.get(url).timeout(self.request_timeout(timeout)).send().await?;

        let mut body = response.bytes_stream();
        let mut bytes: u64 = 0;
        while let Some(chunk) = body.next().await {
            bytes += chunk?.len() as u64;
            if bytes >= max_bytes {
                break;
            }
        }

        Ok(ReadSample {
            bytes,
            elapsed: start.elapsed(),
        })
    }
}
