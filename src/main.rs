//! stream-probe command-line runner.
//!
//! Reads a JSON array of endpoint records, probes them, and writes the
//! failed-URL list plus an optional JSON report.
//!
//! ```text
//! endpoints.json ─▶ ProbeEngine::run_chunked ─▶ failed_urls.txt
//!                        ▲        │            └▶ report.json
//!   whitelist.txt ───────┘        ▼
//!                          ProgressReporter (tracing)
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use stream_probe::config::lists::load_name_list;
use stream_probe::config::loader::load_config;
use stream_probe::lifecycle::signals::{abort_after, abort_on_ctrl_c};
use stream_probe::observability::logging::init_logging;
use stream_probe::observability::metrics::init_metrics;
use stream_probe::observability::progress::ProgressReporter;
use stream_probe::output::{write_failed_urls, write_report};
use stream_probe::{AbortSignal, Endpoint, EngineError, FailedUrls, ProbeConfig, ProbeEngine, RunSummary};

#[derive(Parser)]
#[command(name = "stream-probe")]
#[command(about = "Probe streaming endpoints for liveness and throughput", long_about = None)]
struct Cli {
    /// JSON array of endpoint records.
    #[arg(short, long)]
    input: PathBuf,

    /// TOML configuration file.
    #[arg(short, long, default_value = "config/probe.toml")]
    config: PathBuf,

    /// Override the whitelist file.
    #[arg(long)]
    whitelist: Option<PathBuf>,

    /// Override where failed URLs are written.
    #[arg(long)]
    failed_out: Option<PathBuf>,

    /// Write a JSON report of every endpoint.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Override the global probe concurrency.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Abort the run after this many seconds.
    #[arg(long)]
    deadline_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_found = cli.config.exists();
    let mut config = if config_found {
        load_config(&cli.config)?
    } else {
        ProbeConfig::default()
    };
    apply_overrides(&mut config, &cli);

    init_logging(&config.observability)?;
    tracing::info!("stream-probe v{} starting", env!("CARGO_PKG_VERSION"));
    if !config_found {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let mut endpoints = read_endpoints(&cli.input)?;
    let whitelist = load_name_list(&config.paths.whitelist_path)?;
    tracing::info!(
        endpoints = endpoints.len(),
        whitelist = whitelist.len(),
        concurrency = config.tester.concurrency,
        "Input loaded"
    );

    let engine = ProbeEngine::new(config.tester.clone())?;

    let abort = AbortSignal::new();
    abort_on_ctrl_c(abort.clone());
    if let Some(secs) = cli.deadline_secs {
        abort_after(abort.clone(), Duration::from_secs(secs));
    }

    let failed = FailedUrls::new();
    let progress = ProgressReporter::new(endpoints.len(), "Probing");
    let result = engine
        .run_chunked(&mut endpoints, &whitelist, &failed, || progress.update(1), &abort)
        .await;
    match &result {
        Err(EngineError::Aborted { .. }) => progress.abandon(),
        _ => progress.complete(),
    }

    let summary = match &result {
        Ok(report) => report.summary.clone(),
        Err(_) => RunSummary::tally(&endpoints),
    };

    write_failed_urls(&config.paths.failed_urls_path, &failed)?;
    if let Some(path) = &config.paths.report_path {
        write_report(path, &endpoints, &summary)?;
    }

    match result {
        Ok(report) => {
            tracing::info!(
                online = report.summary.online,
                offline = report.summary.offline,
                blocked_hosts = ?report.blocked_hosts,
                "Done"
            );
            Ok(())
        }
        Err(EngineError::Aborted { evaluated }) => {
            tracing::warn!(evaluated, total = endpoints.len(), "Run aborted, partial results written");
            Err(EngineError::Aborted { evaluated }.into())
        }
        Err(e) => Err(e.into()),
    }
}

fn apply_overrides(config: &mut ProbeConfig, cli: &Cli) {
    if let Some(path) = &cli.whitelist {
        config.paths.whitelist_path = path.clone();
    }
    if let Some(path) = &cli.failed_out {
        config.paths.failed_urls_path = path.clone();
    }
    if let Some(path) = &cli.report {
        config.paths.report_path = Some(path.clone());
    }
    if let Some(concurrency) = cli.concurrency {
        config.tester.concurrency = concurrency;
    }
}

fn read_endpoints(path: &Path) -> Result<Vec<Endpoint>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
