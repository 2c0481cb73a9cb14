//! Network observation: record XHR/fetch traffic on one page while scripted
//! UI interactions run, for reverse-engineering hidden data endpoints.
//!
//! A diagnostic side-channel, invoked manually; it feeds nothing in the main
//! discovery → snapshot flow.

use super::JobError;
use crate::session::{PageDriver, SessionError};
use crate::store;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ObserveConfig {
    pub target_url: String,
    /// Network log destination, overwritten each run.
    pub log_path: PathBuf,
    pub nav_timeout: Duration,
    /// Fixed wait after navigation and after each click, so triggered
    /// requests have time to land.
    pub settle: Duration,
    /// Visible-text keywords for the chart range controls to click through.
    pub keywords: Vec<String>,
    /// Keep only responses whose URL contains this needle, when set.
    pub url_filter: Option<String>,
}

impl ObserveConfig {
    /// The range controls on the target charts, English and Arabic.
    pub fn default_keywords() -> Vec<String> {
        ["1Y", "3Y", "5Y", "Max", "سنة", "الكل"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

impl Default for ObserveConfig {
    fn default() -> Self {
        Self {
            target_url: String::new(),
            log_path: PathBuf::from("network_log.json"),
            nav_timeout: Duration::from_secs(30),
            settle: Duration::from_millis(3000),
            keywords: Self::default_keywords(),
            url_filter: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserveSummary {
    pub captured: usize,
    pub clicks: usize,
}

pub struct ObserveJob {
    config: ObserveConfig,
}

impl ObserveJob {
    pub fn new(config: ObserveConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, page: &mut impl PageDriver) -> Result<ObserveSummary, JobError> {
        let cfg = &self.config;

        // Capture must be live before navigation or the initial burst of
        // XHR traffic is lost.
        page.start_network_capture()?;

        info!(url = %cfg.target_url, "observe: loading page");
        match page.navigate(&cfg.target_url, cfg.nav_timeout) {
            Ok(()) => {}
            Err(SessionError::Timeout(e)) => {
                warn!(error = %e, "observe: page load timed out, continuing");
            }
            Err(e) => return Err(e.into()),
        }
        std::thread::sleep(cfg.settle);

        let mut clicks = 0;
        for keyword in &cfg.keywords {
            match page.click_by_text(std::slice::from_ref(keyword)) {
                Ok(true) => {
                    info!(keyword = %keyword, "observe: clicked range control");
                    clicks += 1;
                    std::thread::sleep(cfg.settle);
                }
                Ok(false) => {
                    warn!(keyword = %keyword, "observe: control not found, skipping");
                }
                // A failed click is cosmetic; the remaining interactions
                // still run and the log still gets written.
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "observe: click failed, skipping");
                }
            }
        }

        let mut captured = page.drain_captured();
        if let Some(needle) = &cfg.url_filter {
            captured.retain(|r| r.url.contains(needle.as_str()));
        }

        store::write_network_log(&cfg.log_path, &captured)?;
        info!(
            captured = captured.len(),
            log = %cfg.log_path.display(),
            "observe: network log written"
        );

        Ok(ObserveSummary {
            captured: captured.len(),
            clicks,
        })
    }
}
