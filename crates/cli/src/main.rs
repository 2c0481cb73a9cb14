use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tickergrab_core::jobs::{
    DiscoveryConfig, DiscoveryJob, ObserveConfig, ObserveJob, SnapshotConfig, SnapshotJob,
};
use tickergrab_core::session::{Session, SessionConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tickergrab", about = "Headless-browser market-data extraction pipeline")]
struct Cli {
    /// Run the browser with a visible window
    #[arg(long, global = true)]
    headful: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll a listing page to exhaustion and write the ticker catalog
    Discover {
        /// The listing page URL
        url: String,

        /// Catalog output path
        #[arg(long, default_value = "tickers.json")]
        catalog: PathBuf,

        /// Diagnostic screenshot path, written on an empty harvest
        #[arg(long, default_value = "listing_debug.png")]
        screenshot: PathBuf,

        /// Number of scroll rounds
        #[arg(long, default_value_t = 30)]
        scrolls: usize,

        /// Wait after each scroll, in milliseconds
        #[arg(long, default_value_t = 1500)]
        settle_ms: u64,

        /// Navigation timeout, in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// Stop scrolling early once the page height stops growing
        #[arg(long)]
        stop_on_stable_height: bool,
    },
    /// Visit every cataloged symbol and write the market snapshot CSV
    Snapshot {
        /// Catalog to read symbols from
        #[arg(long, default_value = "tickers.json")]
        catalog: PathBuf,

        /// Snapshot CSV output path
        #[arg(long, default_value = "market_snapshot.csv")]
        output: PathBuf,

        /// Wait after each navigation for client-side hydration, in milliseconds
        #[arg(long, default_value_t = 4000)]
        settle_ms: u64,

        /// Per-symbol navigation timeout, in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Record XHR/fetch traffic on a page while clicking chart range controls
    Observe {
        /// The page to observe
        url: String,

        /// Network log output path
        #[arg(long, default_value = "network_log.json")]
        log: PathBuf,

        /// Wait after navigation and after each click, in milliseconds
        #[arg(long, default_value_t = 3000)]
        settle_ms: u64,

        /// Navigation timeout, in seconds
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,

        /// Control keywords to click, replacing the built-in range labels
        #[arg(long = "keyword")]
        keywords: Vec<String>,

        /// Keep only responses whose URL contains this substring
        #[arg(long)]
        filter: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let session_config = SessionConfig {
        headless: !cli.headful,
        ..Default::default()
    };
    let session = Session::acquire(session_config).context("acquiring browser session")?;
    let mut page = session.page().context("opening page")?;

    let result = match cli.command {
        Commands::Discover {
            url,
            catalog,
            screenshot,
            scrolls,
            settle_ms,
            timeout_secs,
            stop_on_stable_height,
        } => {
            let job = DiscoveryJob::new(DiscoveryConfig {
                listing_url: url,
                catalog_path: catalog,
                screenshot_path: screenshot,
                scroll_iterations: scrolls,
                scroll_settle: Duration::from_millis(settle_ms),
                nav_timeout: Duration::from_secs(timeout_secs),
                stop_on_stable_height,
            });
            job.run(&mut page).map(|summary| {
                info!(
                    tickers = summary.tickers,
                    rounds = summary.scroll_rounds,
                    written = summary.catalog_written,
                    "discovery finished"
                );
            })
        }
        Commands::Snapshot {
            catalog,
            output,
            settle_ms,
            timeout_secs,
        } => {
            let job = SnapshotJob::new(SnapshotConfig {
                catalog_path: catalog,
                output_path: output,
                nav_timeout: Duration::from_secs(timeout_secs),
                hydration_settle: Duration::from_millis(settle_ms),
            });
            job.run(&mut page).map(|summary| {
                info!(
                    total = summary.total,
                    ok = summary.ok,
                    errored = summary.errored,
                    "snapshot finished"
                );
            })
        }
        Commands::Observe {
            url,
            log,
            settle_ms,
            timeout_secs,
            keywords,
            filter,
        } => {
            let keywords = if keywords.is_empty() {
                ObserveConfig::default_keywords()
            } else {
                keywords
            };
            let job = ObserveJob::new(ObserveConfig {
                target_url: url,
                log_path: log,
                nav_timeout: Duration::from_secs(timeout_secs),
                settle: Duration::from_millis(settle_ms),
                keywords,
                url_filter: filter,
            });
            job.run(&mut page).map(|summary| {
                info!(
                    captured = summary.captured,
                    clicks = summary.clicks,
                    "observe finished"
                );
            })
        }
    };

    session.release();
    result.map_err(anyhow::Error::from)
}
