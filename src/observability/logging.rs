//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Provide a conditional log wrapper for per-run chatter
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level
//! - Per-endpoint lines go through `run_log!`, which checks a plain
//!   enabled flag before delegating to `tracing`

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::ObservabilityConfig;

/// Enabled flag for engine log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunLog {
    enabled: bool,
}

impl RunLog {
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub const fn enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Log through `tracing` only when the given [`RunLog`] is enabled.
///
/// ```ignore
/// run_log!(self.log, info, host = %host, "Group done");
/// ```
#[macro_export]
macro_rules! run_log {
    ($log:expr, $level:ident, $($arg:tt)+) => {
        if $log.enabled() {
            ::tracing::$level!($($arg)+);
        }
    };
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> std::io::Result<()> {
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("stream_probe={}", config.log_level).into())
    };

    let file_layer = match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter()))
        .with(file_layer)
        .init();

    Ok(())
}
