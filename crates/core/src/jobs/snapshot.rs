//! Bulk snapshot: one market-snapshot row per cataloged symbol, with
//! per-item failure isolation.

use super::JobError;
use crate::extract::Field;
use crate::records::{SnapshotRecord, Status, TickerRecord};
use crate::session::{PageDriver, SessionError};
use crate::store::SnapshotSink;
use crate::{dom, extract, store};
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    pub catalog_path: PathBuf,
    pub output_path: PathBuf,
    /// Bound on each per-symbol navigation.
    pub nav_timeout: Duration,
    /// Fixed wait after navigation before reading the DOM. The detail pages
    /// hydrate client-side with no reliable load signal, so a settle duration
    /// stands in for a readiness check.
    pub hydration_settle: Duration,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("tickers.json"),
            output_path: PathBuf::from("market_snapshot.csv"),
            nav_timeout: Duration::from_secs(30),
            hydration_settle: Duration::from_millis(4000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub total: usize,
    pub ok: usize,
    pub errored: usize,
}

pub struct SnapshotJob {
    config: SnapshotConfig,
}

impl SnapshotJob {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }

    /// Run the batch. The catalog is walked in order on one page, strictly
    /// sequentially: concurrent tabs would be faster but multiply flakiness
    /// and bot-detection exposure on a site like this.
    pub fn run(&self, page: &mut impl PageDriver) -> Result<SnapshotSummary, JobError> {
        let catalog = store::load_catalog(&self.config.catalog_path)?;
        let mut sink = SnapshotSink::create(&self.config.output_path)?;

        let total = catalog.len();
        let mut ok = 0;
        let mut errored = 0;

        for (i, ticker) in catalog.iter().enumerate() {
            info!("[{}/{}] processing {}", i + 1, total, ticker.symbol);

            // Both branches produce a row; only status differs. One bad page
            // must never abandon the rows already collected.
            let outcome: Result<SnapshotRecord, SnapshotRecord> = self
                .snapshot_one(page, ticker)
                .map_err(|e| {
                    warn!("[{}/{}] {} failed: {}", i + 1, total, ticker.symbol, e);
                    SnapshotRecord::errored(&ticker.symbol, Utc::now().to_rfc3339())
                });

            let record = match outcome {
                Ok(record) => {
                    ok += 1;
                    record
                }
                Err(record) => {
                    errored += 1;
                    record
                }
            };
            sink.append(&record)?;
        }

        info!(total, ok, errored, "snapshot batch complete");
        Ok(SnapshotSummary { total, ok, errored })
    }

    fn snapshot_one(
        &self,
        page: &mut impl PageDriver,
        ticker: &TickerRecord,
    ) -> Result<SnapshotRecord, SessionError> {
        page.navigate(&ticker.full_href, self.config.nav_timeout)?;
        std::thread::sleep(self.config.hydration_settle);

        let html = page.content()?;
        let snapshot = dom::parse_html(&html);
        let name = extract::page_heading(&snapshot).unwrap_or_else(|| ticker.name.clone());

        Ok(SnapshotRecord {
            symbol: ticker.symbol.clone(),
            name,
            price: extract::field_value(&snapshot, Field::Price),
            change: extract::field_value(&snapshot, Field::Change),
            volume: extract::field_value(&snapshot, Field::Volume),
            last_update: Utc::now().to_rfc3339(),
            status: Status::Ok,
        })
    }
}
