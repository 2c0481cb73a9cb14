//! headless_chrome backend for [`PageDriver`].
//!
//! One [`Session`] owns one Chrome process; dropping it terminates the
//! process, which is the release contract on every exit path. Launch flags
//! keep the automated profile from advertising itself to trivial bot checks.

use super::{PageDriver, SessionConfig, SessionError};
use crate::records::{CapturedRequestRecord, RequestKind};
use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::protocol::cdp::Network::ResourceType;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// A scoped browser process plus its identity configuration.
pub struct Session {
    browser: Browser,
    config: SessionConfig,
}

impl Session {
    /// Launch the browser process. No retries: if Chrome will not start
    /// there is nothing to extract, and the whole job aborts.
    pub fn acquire(config: SessionConfig) -> Result<Self, SessionError> {
        let options = LaunchOptions {
            headless: config.headless,
            sandbox: false,
            window_size: Some(config.viewport),
            args: vec![
                OsStr::new("--disable-blink-features=AutomationControlled"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--lang=en-US"),
            ],
            ..Default::default()
        };

        let browser = Browser::new(options).map_err(|e| SessionError::Launch(e.to_string()))?;
        debug!("browser process launched");
        Ok(Self { browser, config })
    }

    /// Open one tab configured with the session identity.
    pub fn page(&self) -> Result<ChromePage, SessionError> {
        let tab = self.browser.new_tab().map_err(page_err)?;
        tab.set_user_agent(
            &self.config.user_agent,
            Some(&self.config.accept_language),
            None,
        )
        .map_err(page_err)?;
        tab.call_method(Emulation::SetTimezoneOverride {
            timezone_id: self.config.timezone.clone(),
        })
        .map_err(page_err)?;

        Ok(ChromePage {
            tab,
            captured: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// Terminate the browser process. Dropping the session does the same;
    /// this exists so call sites can name the release point.
    pub fn release(self) {}
}

/// A live Chrome tab implementing [`PageDriver`].
pub struct ChromePage {
    tab: Arc<Tab>,
    captured: Arc<Mutex<Vec<CapturedRequestRecord>>>,
}

impl ChromePage {
    fn eval(&self, expression: &str) -> Result<Option<serde_json::Value>, SessionError> {
        let object = self.tab.evaluate(expression, false).map_err(page_err)?;
        Ok(object.value)
    }
}

impl PageDriver for ChromePage {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), SessionError> {
        self.tab.set_default_timeout(timeout);
        self.tab.navigate_to(url).map_err(nav_err)?;
        self.tab.wait_until_navigated().map_err(nav_err)?;
        Ok(())
    }

    fn scroll_height(&mut self) -> Result<f64, SessionError> {
        self.eval("document.body.scrollHeight")?
            .and_then(|v| v.as_f64())
            .ok_or_else(|| SessionError::Page("scroll height probe returned no value".to_string()))
    }

    fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        self.eval("window.scrollTo(0, document.body.scrollHeight)")?;
        Ok(())
    }

    fn content(&mut self) -> Result<String, SessionError> {
        self.tab.get_content().map_err(page_err)
    }

    fn screenshot(&mut self, path: &Path) -> Result<(), SessionError> {
        let png = self
            .tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(page_err)?;
        std::fs::write(path, png)
            .map_err(|e| SessionError::Page(format!("writing screenshot: {}", e)))
    }

    fn click_by_text(&mut self, keywords: &[String]) -> Result<bool, SessionError> {
        let needles = serde_json::to_string(keywords)
            .map_err(|e| SessionError::Page(format!("encoding keywords: {}", e)))?;
        let script = format!(
            r#"(() => {{
                const needles = {needles};
                const nodes = Array.from(
                    document.querySelectorAll('button, a, [role="button"], li, span')
                );
                for (const el of nodes) {{
                    const text = (el.innerText || '').trim();
                    if (!text) continue;
                    if (needles.some(n => text === n || text.includes(n))) {{
                        el.click();
                        return true;
                    }}
                }}
                return false;
            }})()"#
        );
        Ok(self
            .eval(&script)?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    fn start_network_capture(&mut self) -> Result<(), SessionError> {
        let captured = Arc::clone(&self.captured);
        self.tab
            .register_response_handling(
                "tickergrab-netlog",
                Box::new(move |params, _fetch_body| {
                    let kind = match params.Type {
                        ResourceType::Xhr => RequestKind::Xhr,
                        ResourceType::Fetch => RequestKind::Fetch,
                        _ => return,
                    };
                    if let Ok(mut records) = captured.lock() {
                        records.push(CapturedRequestRecord {
                            url: params.response.url.clone(),
                            status: params.response.status as u32,
                            kind,
                        });
                    }
                }),
            )
            .map_err(page_err)?;
        Ok(())
    }

    fn drain_captured(&mut self) -> Vec<CapturedRequestRecord> {
        match self.captured.lock() {
            Ok(mut records) => std::mem::take(&mut *records),
            Err(_) => Vec::new(),
        }
    }
}

fn page_err(e: anyhow::Error) -> SessionError {
    SessionError::Page(e.to_string())
}

/// Chrome reports navigation waits that never resolve as timeouts in the
/// error text; everything else is an ordinary page failure.
fn nav_err(e: anyhow::Error) -> SessionError {
    let message = e.to_string();
    if message.to_lowercase().contains("timed out") || message.to_lowercase().contains("timeout") {
        SessionError::Timeout(message)
    } else {
        SessionError::Page(message)
    }
}
