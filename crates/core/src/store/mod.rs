//! Durable artifacts: ticker catalog, snapshot CSV sink, network log.
//!
//! The catalog and network log are whole-file overwrites; the snapshot sink
//! is append-as-you-go so a crash mid-batch preserves every prior row.

use crate::records::{CapturedRequestRecord, SnapshotRecord, TickerRecord};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Column order of the snapshot CSV.
pub const SNAPSHOT_HEADER: [&str; 7] = [
    "symbol",
    "name",
    "price",
    "change",
    "volume",
    "last_update",
    "status",
];

/// Load the ticker catalog. Missing or unparseable catalogs are fatal to the
/// snapshot job; there is nothing to snapshot without one.
pub fn load_catalog(path: &Path) -> Result<Vec<TickerRecord>, StoreError> {
    let data = std::fs::read_to_string(path)
        .map_err(|e| StoreError::Io(format!("reading {}: {}", path.display(), e)))?;
    serde_json::from_str(&data)
        .map_err(|e| StoreError::Parse(format!("parsing {}: {}", path.display(), e)))
}

/// Overwrite the catalog with a fresh harvest, pretty-printed. Each discovery
/// run replaces the whole file; the catalog is never appended to.
pub fn write_catalog(path: &Path, records: &[TickerRecord]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| StoreError::Parse(e.to_string()))?;
    std::fs::write(path, json)
        .map_err(|e| StoreError::Io(format!("writing {}: {}", path.display(), e)))
}

/// Append-only CSV sink for snapshot rows.
///
/// Opened with truncation and a header row; every append is flushed so the
/// ledger on disk is complete up to the last finished symbol.
pub struct SnapshotSink {
    writer: csv::Writer<File>,
}

impl SnapshotSink {
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        let file = File::create(path)
            .map_err(|e| StoreError::Io(format!("creating {}: {}", path.display(), e)))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer
            .write_record(SNAPSHOT_HEADER)
            .and_then(|_| writer.flush().map_err(csv::Error::from))
            .map_err(|e| StoreError::Csv(e.to_string()))?;
        Ok(Self { writer })
    }

    pub fn append(&mut self, record: &SnapshotRecord) -> Result<(), StoreError> {
        self.writer
            .write_record([
                record.symbol.as_str(),
                record.name.as_str(),
                record.price.as_str(),
                record.change.as_str(),
                record.volume.as_str(),
                record.last_update.as_str(),
                record.status.as_str(),
            ])
            .and_then(|_| self.writer.flush().map_err(csv::Error::from))
            .map_err(|e| StoreError::Csv(e.to_string()))
    }
}

/// Overwrite the network log with everything captured this run.
pub fn write_network_log(
    path: &Path,
    records: &[CapturedRequestRecord],
) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| StoreError::Parse(e.to_string()))?;
    let mut file = File::create(path)
        .map_err(|e| StoreError::Io(format!("creating {}: {}", path.display(), e)))?;
    file.write_all(json.as_bytes())
        .map_err(|e| StoreError::Io(format!("writing {}: {}", path.display(), e)))
}

#[derive(Debug)]
pub enum StoreError {
    Io(String),
    Parse(String),
    Csv(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "io error: {}", e),
            StoreError::Parse(e) => write!(f, "parse error: {}", e),
            StoreError::Csv(e) => write!(f, "csv error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}
