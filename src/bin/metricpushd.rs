//! metricpushd - Host metrics push agent.
//!
//! Periodically scrapes a local exporter, appends process-table gauges, and
//! pushes the combined payload to a remote collector as a JSON batch.

use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use metricpush::agent::{self, AgentState};
use metricpush::collector::{ProcessSampler, PsProcessSource};
use metricpush::config::AgentConfig;
use metricpush::push::HttpPusher;
use metricpush::scrape::UpstreamScraper;
use metricpush::util::discover_device_ip;

/// Host metrics push agent.
#[derive(Parser)]
#[command(name = "metricpushd", about = "Host metrics push agent", version)]
struct Args {
    /// Remote collector URL receiving the JSON batches.
    #[arg(long)]
    remote_url: String,

    /// Local exporter URL scraped each cycle.
    #[arg(long, default_value = "http://localhost:9100/metrics")]
    local_url: String,

    /// Device IP reported in the batch envelope. Overrides --ip-prefix.
    #[arg(long)]
    device_ip: Option<String>,

    /// Prefix used to pick the device IP from the host's address list.
    #[arg(long, default_value = "192.168.")]
    ip_prefix: String,

    /// Push interval in seconds.
    #[arg(short, long, default_value = "60")]
    period: u64,

    /// Program name reported in the batch envelope.
    #[arg(long, default_value = "metricpush")]
    program: String,

    /// Timeout in seconds for each HTTP call.
    #[arg(long, default_value = "10")]
    timeout_secs: u64,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("metricpushd={}", level).parse().unwrap())
        .add_directive(format!("metricpush={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves the device IP from the flag or by prefix discovery.
fn resolve_device_ip(args: &Args) -> Result<String, String> {
    if let Some(ip) = &args.device_ip {
        return Ok(ip.clone());
    }
    match discover_device_ip(&args.ip_prefix) {
        Ok(Some(ip)) => Ok(ip),
        Ok(None) => Err(format!(
            "no host address matches prefix '{}'",
            args.ip_prefix
        )),
        Err(e) => Err(format!("device IP discovery failed: {}", e)),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("metricpushd {} starting", env!("CARGO_PKG_VERSION"));

    let device_ip = match resolve_device_ip(&args) {
        Ok(ip) => ip,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = AgentConfig {
        remote_endpoint: args.remote_url.clone(),
        local_scrape_endpoint: args.local_url.clone(),
        device_ip,
        period_seconds: args.period,
        program_label: args.program.clone(),
        http_timeout: Duration::from_secs(args.timeout_secs),
    };

    if let Err(e) = config.validate() {
        error!("invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    info!(
        "Config: remote={}, local={}, device_ip={}, period={}s, program={}",
        config.remote_endpoint,
        config.local_scrape_endpoint,
        config.device_ip,
        config.period_seconds,
        config.program_label
    );

    let scraper = match UpstreamScraper::new(&config.local_scrape_endpoint, config.http_timeout) {
        Ok(scraper) => scraper,
        Err(e) => {
            error!("failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let pusher = match HttpPusher::new(&config.remote_endpoint, config.http_timeout) {
        Ok(pusher) => pusher,
        Err(e) => {
            error!("failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let sampler = ProcessSampler::new(PsProcessSource::new());
    let state = AgentState::new(config);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    info!("Starting push loop");
    agent::run(&state, &sampler, &scraper, &pusher, &running);

    info!("Shutdown complete");
    ExitCode::SUCCESS
}
