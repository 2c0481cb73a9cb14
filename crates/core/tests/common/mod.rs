//! Scripted PageDriver fake for exercising jobs without a browser.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tickergrab_core::records::CapturedRequestRecord;
use tickergrab_core::session::{PageDriver, SessionError};

/// In-memory page driver. Every interaction is recorded so tests can assert
/// on what a job actually did.
#[derive(Default)]
pub struct FakePage {
    /// url -> html served by `content` after navigating there.
    pub pages: HashMap<String, String>,
    /// Navigating to these fails hard.
    pub fail_urls: HashSet<String>,
    /// Navigating to these reports a timeout but still renders the page.
    pub timeout_urls: HashSet<String>,
    /// Heights returned by successive `scroll_height` calls; the last entry
    /// repeats once the script runs out.
    pub heights: Vec<f64>,
    height_cursor: usize,
    /// Keywords that have a matching clickable control.
    pub clickable: HashSet<String>,
    /// Records handed out by the next `drain_captured`.
    pub captured: Vec<CapturedRequestRecord>,

    pub current_url: Option<String>,
    pub navigations: Vec<String>,
    pub scrolls: usize,
    pub screenshots: Vec<PathBuf>,
    pub click_attempts: Vec<Vec<String>>,
    pub capture_started: bool,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_heights(mut self, heights: &[f64]) -> Self {
        self.heights = heights.to_vec();
        self
    }
}

impl PageDriver for FakePage {
    fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), SessionError> {
        self.navigations.push(url.to_string());
        if self.fail_urls.contains(url) {
            return Err(SessionError::Page(format!("scripted failure for {}", url)));
        }
        self.current_url = Some(url.to_string());
        if self.timeout_urls.contains(url) {
            return Err(SessionError::Timeout(format!("scripted timeout for {}", url)));
        }
        Ok(())
    }

    fn scroll_height(&mut self) -> Result<f64, SessionError> {
        let height = match self.heights.get(self.height_cursor) {
            Some(h) => *h,
            None => *self.heights.last().unwrap_or(&1000.0),
        };
        self.height_cursor += 1;
        Ok(height)
    }

    fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        self.scrolls += 1;
        Ok(())
    }

    fn content(&mut self) -> Result<String, SessionError> {
        let url = self
            .current_url
            .as_ref()
            .ok_or_else(|| SessionError::Page("no page loaded".to_string()))?;
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| SessionError::Page(format!("no scripted page for {}", url)))
    }

    fn screenshot(&mut self, path: &Path) -> Result<(), SessionError> {
        self.screenshots.push(path.to_path_buf());
        Ok(())
    }

    fn click_by_text(&mut self, keywords: &[String]) -> Result<bool, SessionError> {
        self.click_attempts.push(keywords.to_vec());
        Ok(keywords.iter().any(|k| self.clickable.contains(k)))
    }

    fn start_network_capture(&mut self) -> Result<(), SessionError> {
        self.capture_started = true;
        Ok(())
    }

    fn drain_captured(&mut self) -> Vec<CapturedRequestRecord> {
        std::mem::take(&mut self.captured)
    }
}
