//! Typed records flowing between the pipeline stages.

use serde::{Deserialize, Serialize};

/// Placeholder written wherever a field could not be extracted.
///
/// Extraction misses are data, not errors: a missing field on one page must
/// never abort the rest of the batch.
pub const SENTINEL: &str = "N/A";

/// One discovered listing entry. Produced by the discovery job and persisted
/// to the ticker catalog, consumed by the snapshot job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerRecord {
    /// Numeric-string exchange code, unique within a catalog.
    pub symbol: String,
    /// Absolute URL of the per-symbol detail page.
    pub full_href: String,
    /// Instrument name as it appeared in the listing anchor.
    pub name: String,
}

/// Outcome of one per-symbol extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Error => "ERROR",
        }
    }
}

/// One row of the market snapshot ledger.
///
/// All data fields are strings: the target site renders localized numbers
/// and the sink preserves them verbatim, with [`SENTINEL`] on a miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub volume: String,
    /// ISO-8601 timestamp captured at extraction time.
    pub last_update: String,
    pub status: Status,
}

impl SnapshotRecord {
    /// Row written when the per-symbol attempt failed: every data field is
    /// the sentinel, only the symbol identifies what was attempted.
    pub fn errored(symbol: &str, last_update: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: SENTINEL.to_string(),
            price: SENTINEL.to_string(),
            change: SENTINEL.to_string(),
            volume: SENTINEL.to_string(),
            last_update,
            status: Status::Error,
        }
    }
}

/// Resource type of a captured network exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    #[serde(rename = "fetch")]
    Fetch,
    #[serde(rename = "xhr")]
    Xhr,
}

/// One XHR/fetch response observed during an observe run. Not deduplicated;
/// every occurrence is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedRequestRecord {
    pub url: String,
    pub status: u32,
    #[serde(rename = "type")]
    pub kind: RequestKind,
}
