//! Browser session lifecycle and the page interface jobs drive.
//!
//! Jobs never talk to the browser runtime directly: they run against
//! [`PageDriver`], so tests inject a scripted fake and the CLI injects the
//! real Chrome-backed page from the [`chrome`] module.

#[cfg(feature = "chrome")]
pub mod chrome;

use crate::records::CapturedRequestRecord;
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "chrome")]
pub use chrome::{ChromePage, Session};

/// Identity configuration for a browsing session.
///
/// These are static per-job constants chosen to look like an ordinary desktop
/// visitor of the target market, not runtime-negotiated values.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub user_agent: String,
    /// Fixed viewport, width × height.
    pub viewport: (u32, u32),
    pub accept_language: String,
    /// IANA timezone matching the target market.
    pub timezone: String,
    pub headless: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
            viewport: (1280, 720),
            accept_language: "en-US".to_string(),
            timezone: "Asia/Riyadh".to_string(),
            headless: true,
        }
    }
}

/// The browser runtime surface the jobs need. One implementor wraps a live
/// Chrome tab; tests provide a scripted fake.
///
/// Every operation that waits carries an explicit bound; a bound that
/// expires surfaces as [`SessionError::Timeout`] so the caller can decide
/// whether to proceed with whatever has rendered.
pub trait PageDriver {
    /// Navigate to `url` and wait for the load to settle, bounded by
    /// `timeout`.
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), SessionError>;

    /// Current document height in CSS pixels.
    fn scroll_height(&mut self) -> Result<f64, SessionError>;

    /// Scroll to the current bottom of the document.
    fn scroll_to_bottom(&mut self) -> Result<(), SessionError>;

    /// Serialized snapshot of the current DOM.
    fn content(&mut self) -> Result<String, SessionError>;

    /// Capture a PNG screenshot of the current viewport to `path`.
    fn screenshot(&mut self, path: &Path) -> Result<(), SessionError>;

    /// Click the first visible control whose text matches any of `keywords`.
    /// `Ok(false)` means no matching control existed, which is not an error.
    fn click_by_text(&mut self, keywords: &[String]) -> Result<bool, SessionError>;

    /// Start recording XHR/fetch responses on this page.
    fn start_network_capture(&mut self) -> Result<(), SessionError>;

    /// Take everything recorded since the last drain.
    fn drain_captured(&mut self) -> Vec<CapturedRequestRecord>;
}

#[derive(Debug)]
pub enum SessionError {
    /// The browser process could not be started. Always fatal to the job.
    Launch(String),
    /// A bounded wait expired before the condition resolved.
    Timeout(String),
    /// Any other page or transport failure.
    Page(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Launch(e) => write!(f, "browser launch failed: {}", e),
            SessionError::Timeout(e) => write!(f, "timed out: {}", e),
            SessionError::Page(e) => write!(f, "page error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}
