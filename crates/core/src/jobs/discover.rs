//! Ticker discovery: materialize an infinite-scroll listing page and harvest
//! a deduplicated symbol catalog.

use super::JobError;
use crate::session::{PageDriver, SessionError};
use crate::{dom, extract, store};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// The listing page to scroll to exhaustion.
    pub listing_url: String,
    /// Catalog destination, fully overwritten on a non-empty harvest.
    pub catalog_path: PathBuf,
    /// Where the diagnostic screenshot lands when the harvest comes back
    /// empty.
    pub screenshot_path: PathBuf,
    /// Scroll round budget. The loop runs the full budget by default rather
    /// than trusting a height-stability heuristic; see `stop_on_stable_height`.
    pub scroll_iterations: usize,
    /// Fixed wait after each scroll for lazy-loaded content to append.
    pub scroll_settle: Duration,
    /// Bound on the initial navigation. Expiry is not fatal; the harvest
    /// proceeds on whatever has rendered.
    pub nav_timeout: Duration,
    /// Opt-in early exit after two consecutive unchanged height probes.
    /// Off by default: the full budget trades run time for certainty that
    /// the listing really was exhausted.
    pub stop_on_stable_height: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            listing_url: String::new(),
            catalog_path: PathBuf::from("tickers.json"),
            screenshot_path: PathBuf::from("listing_debug.png"),
            scroll_iterations: 30,
            scroll_settle: Duration::from_millis(1500),
            nav_timeout: Duration::from_secs(30),
            stop_on_stable_height: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySummary {
    pub tickers: usize,
    pub scroll_rounds: usize,
    pub catalog_written: bool,
}

pub struct DiscoveryJob {
    config: DiscoveryConfig,
}

impl DiscoveryJob {
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, page: &mut impl PageDriver) -> Result<DiscoverySummary, JobError> {
        let cfg = &self.config;
        info!(url = %cfg.listing_url, "discovery: loading listing page");

        match page.navigate(&cfg.listing_url, cfg.nav_timeout) {
            Ok(()) => {}
            Err(SessionError::Timeout(e)) => {
                // Caps catalog completeness, doesn't end the run.
                warn!(error = %e, "listing load timed out, harvesting what rendered");
            }
            Err(e) => return Err(e.into()),
        }

        let mut rounds = 0;
        let mut last_height: Option<f64> = None;
        let mut stable_probes = 0;
        for i in 0..cfg.scroll_iterations {
            let height = page.scroll_height()?;
            page.scroll_to_bottom()?;
            std::thread::sleep(cfg.scroll_settle);
            rounds = i + 1;

            if cfg.stop_on_stable_height {
                if last_height == Some(height) {
                    stable_probes += 1;
                    if stable_probes >= 2 {
                        info!(rounds, height, "scroll height stable, stopping early");
                        break;
                    }
                } else {
                    stable_probes = 0;
                }
            }
            last_height = Some(height);
        }
        info!(rounds, "discovery: scroll budget spent");

        let html = page.content()?;
        let snapshot = dom::parse_html(&html);
        let tickers = extract::harvest_ticker_links(&snapshot, &cfg.listing_url);

        if tickers.is_empty() {
            // An empty harvest is never accepted as the new truth: leave any
            // prior catalog in place and capture the page for inspection.
            warn!(
                screenshot = %cfg.screenshot_path.display(),
                "discovery: zero tickers harvested, capturing diagnostic screenshot"
            );
            page.screenshot(&cfg.screenshot_path)?;
            return Ok(DiscoverySummary {
                tickers: 0,
                scroll_rounds: rounds,
                catalog_written: false,
            });
        }

        store::write_catalog(&cfg.catalog_path, &tickers)?;
        info!(
            count = tickers.len(),
            catalog = %cfg.catalog_path.display(),
            "discovery: catalog written"
        );

        Ok(DiscoverySummary {
            tickers: tickers.len(),
            scroll_rounds: rounds,
            catalog_written: true,
        })
    }
}
