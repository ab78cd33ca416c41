use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use balance_timeline::{
    providers::{open_detail_cache, DEFAULT_BASE_URL},
    CalibrationOutcome, CalibrationPolicy, CompositeSink, ConsoleSink, CsvSink, IdenaApi,
    JsonlSink, TailCsvSink, TimelineConfig, TimelineTracker,
};

#[derive(Parser, Debug)]
#[command(name = "balance-timeline")]
#[command(about = "Build an Idena wallet balance timeline from per-transaction details")]
#[command(version)]
struct Cli {
    /// Address to reconstruct
    #[arg(long, env = "IDENA_ADDRESS")]
    address: String,

    /// Output path prefix for the timeline files
    #[arg(long, env = "TIMELINE_OUT_PREFIX")]
    out_prefix: String,

    /// Transactions per list page
    #[arg(long, env = "TIMELINE_LIMIT", default_value_t = 100)]
    limit: usize,

    /// Pause between list pages, in milliseconds
    #[arg(long, env = "TIMELINE_SLEEP_MS", default_value_t = 250)]
    sleep_ms: u64,

    /// Stop after this many pages (0 = no cap)
    #[arg(long, env = "TIMELINE_MAX_PAGES", default_value_t = 0)]
    max_pages: usize,

    /// Detail lookups in flight at once
    #[arg(long, env = "TIMELINE_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Directory for cached transaction details
    #[arg(long, env = "TIMELINE_CACHE_DIR", default_value = "tx_cache")]
    cache_dir: PathBuf,

    /// Keep details in memory only
    #[arg(long, env = "TIMELINE_NO_CACHE")]
    no_cache: bool,

    /// Refetch every detail, overwriting cached entries
    #[arg(long, env = "TIMELINE_FORCE_REFRESH")]
    force_refresh: bool,

    /// Do not query the current balance; the curve starts at 0
    #[arg(long, env = "TIMELINE_NO_CALIBRATE")]
    no_calibrate: bool,

    /// Fail the run when the current balance cannot be read
    #[arg(long, env = "TIMELINE_STRICT_CALIBRATION")]
    strict_calibration: bool,

    /// Fail when more than this share of transactions cannot be resolved
    #[arg(long, env = "TIMELINE_MAX_FAILURE_RATIO", default_value_t = 0.5)]
    max_failure_ratio: f64,

    /// Points in the tail CSV (0 = all)
    #[arg(long, env = "TIMELINE_TAIL", default_value_t = 25)]
    tail: usize,

    /// Explorer API base URL
    #[arg(long, env = "TIMELINE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Debug logging
    #[arg(long, env = "TIMELINE_VERBOSE")]
    verbose: bool,
}

impl Cli {
    fn to_config(&self) -> TimelineConfig {
        TimelineConfig {
            base_url: self.base_url.clone(),
            page_size: self.limit,
            page_delay_ms: self.sleep_ms,
            max_pages: self.max_pages,
            concurrency: self.concurrency,
            cache_dir: (!self.no_cache).then(|| self.cache_dir.clone()),
            force_refresh: self.force_refresh,
            calibrate: !self.no_calibrate,
            calibration_policy: if self.strict_calibration {
                CalibrationPolicy::Fail
            } else {
                CalibrationPolicy::Fallback
            },
            max_failure_ratio: self.max_failure_ratio,
            ..TimelineConfig::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let directive = if cli.verbose { "balance_timeline=debug" } else { "balance_timeline=info" };
    tracing_subscriber::fmt()
        .with_level(true)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    tokio::runtime::Runtime::new()?.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.to_config();
    config.validate()?;

    info!("Address: {}", cli.address);
    info!("API: {}", config.base_url);

    let api = Arc::new(
        IdenaApi::new(config.base_url.clone(), config.timeouts)
            .context("failed to create explorer client")?,
    );
    let cache = open_detail_cache(&config)
        .await
        .context("failed to open detail cache")?;
    if config.force_refresh {
        warn!("Force refresh: cached details will be ignored and rewritten");
    }

    let mut tracker = TimelineTracker::new(cli.address.clone(), api, cache, config);
    let mut files = CompositeSink::new();
    files.add_sink(Arc::new(JsonlSink::new(&cli.out_prefix)));
    files.add_sink(Arc::new(CsvSink::new(&cli.out_prefix)));
    files.add_sink(Arc::new(TailCsvSink::new(&cli.out_prefix, cli.tail)));
    tracker.add_sink(Arc::new(files));
    tracker.add_sink(Arc::new(ConsoleSink::new()));

    let timeline = match tracker.run().await {
        Ok(timeline) => timeline,
        Err(e) => {
            error!("Timeline failed: {:#}", e);
            return Err(e);
        }
    };

    if timeline.is_empty() {
        info!("No usable records - nothing written");
        return Ok(());
    }

    if let CalibrationOutcome::Unavailable { reason } = &timeline.calibration {
        warn!("Series is relative: {}", reason);
    }

    Ok(())
}
