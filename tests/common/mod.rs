//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use stream_probe::probe::Protocol;
use stream_probe::{Endpoint, ProbeResult, Prober, TesterConfig};

/// How the mock origin answers.
#[derive(Debug, Clone)]
pub struct OriginBehavior {
    pub status: u16,
    /// Delay before answering a HEAD request.
    pub head_delay: Duration,
    /// Bytes served in a GET body.
    pub body_size: usize,
    /// Stream the GET body until the client hangs up.
    pub endless: bool,
}

impl Default for OriginBehavior {
    fn default() -> Self {
        Self {
            status: 200,
            head_delay: Duration::ZERO,
            body_size: 256 * 1024,
            endless: false,
        }
    }
}

/// Handle to a running mock origin.
pub struct MockOrigin {
    pub addr: SocketAddr,
    heads: Arc<AtomicUsize>,
    gets: Arc<AtomicUsize>,
}

impl MockOrigin {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn heads(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

/// Start a mock streaming origin on an ephemeral port.
pub async fn start_mock_origin(behavior: OriginBehavior) -> MockOrigin {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let heads = Arc::new(AtomicUsize::new(0));
    let gets = Arc::new(AtomicUsize::new(0));

    let (h, g) = (heads.clone(), gets.clone());
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let behavior = behavior.clone();
                    let (h, g) = (h.clone(), g.clone());
                    tokio::spawn(async move {
                        serve(socket, behavior, h, g).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockOrigin { addr, heads, gets }
}

async fn serve(mut socket: TcpStream, behavior: OriginBehavior, heads: Arc<AtomicUsize>, gets: Arc<AtomicUsize>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let status_text = match behavior.status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    };
    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: video/mp2t\r\nConnection: close\r\n\r\n",
        status_text, behavior.body_size
    );

    if request.starts_with(b"HEAD") {
        heads.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(behavior.head_delay).await;
        let _ = socket.write_all(head.as_bytes()).await;
    } else if behavior.endless {
        gets.fetch_add(1, Ordering::SeqCst);
        let head = format!("HTTP/1.1 {}\r\nContent-Type: video/mp2t\r\nConnection: close\r\n\r\n", status_text);
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        let chunk = vec![0x47u8; 16 * 1024];
        while socket.write_all(&chunk).await.is_ok() {}
        return;
    } else {
        gets.fetch_add(1, Ordering::SeqCst);
        let _ = socket.write_all(head.as_bytes()).await;
        let body = vec![0x47u8; behavior.body_size];
        let _ = socket.write_all(&body).await;
    }
    let _ = socket.shutdown().await;
}

/// Scripted outcome for one URL.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    Online { latency_ms: f64, speed_kbs: f64 },
    Offline { latency_ms: f64 },
    Panic,
}

/// Prober replaying scripted results; unknown URLs fail.
#[derive(Default)]
pub struct MockProber {
    scripts: HashMap<String, Script>,
    delay: Duration,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    on_call: Option<Box<dyn Fn() + Send + Sync>>,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn on_call(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_call = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn called_urls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for MockProber {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        self.calls.lock().unwrap().push(endpoint.url.clone());
        if let Some(hook) = &self.on_call {
            hook();
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.scripts.get(&endpoint.url).copied() {
            Some(Script::Online { latency_ms, speed_kbs }) => ProbeResult {
                success: true,
                speed_kbs,
                latency_ms,
                protocol: Protocol::detect(&endpoint.url),
            },
            Some(Script::Offline { latency_ms }) => ProbeResult::failed(Protocol::detect(&endpoint.url), latency_ms),
            Some(Script::Panic) => panic!("prober exploded on {}", endpoint.url),
            None => ProbeResult::failed(Protocol::detect(&endpoint.url), 0.0),
        }
    }
}

/// Tester config with cooldown and log lines off.
pub fn quiet_config() -> TesterConfig {
    TesterConfig {
        min_host_interval: 0.0,
        enable_logging: false,
        ..TesterConfig::default()
    }
}

pub fn endpoint(name: &str, url: &str) -> Endpoint {
    Endpoint::new(name, url)
}
