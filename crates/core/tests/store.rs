//! Durable artifact tests: catalog JSON, snapshot CSV sink, network log.

use pretty_assertions::assert_eq;
use tickergrab_core::records::{
    CapturedRequestRecord, RequestKind, SnapshotRecord, Status, TickerRecord,
};
use tickergrab_core::store::{self, SnapshotSink, StoreError, SNAPSHOT_HEADER};

fn ticker(symbol: &str, name: &str) -> TickerRecord {
    TickerRecord {
        symbol: symbol.to_string(),
        full_href: format!("https://market.example.com/en/stocks/{}", symbol),
        name: name.to_string(),
    }
}

#[test]
fn test_catalog_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tickers.json");
    let records = vec![ticker("1120", "Al Rajhi Bank"), ticker("2222", "Saudi Aramco")];

    store::write_catalog(&path, &records).expect("write");
    let loaded = store::load_catalog(&path).expect("load");

    assert_eq!(loaded, records);
}

#[test]
fn test_catalog_is_pretty_printed_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tickers.json");
    store::write_catalog(&path, &[ticker("1120", "Al Rajhi Bank")]).expect("write");

    let raw = std::fs::read_to_string(&path).expect("read");
    assert!(raw.contains('\n'), "catalog is written human-readable");
    assert!(raw.contains(r#""symbol": "1120""#));
    assert!(raw.contains(r#""full_href""#));
}

#[test]
fn test_catalog_write_replaces_whole_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tickers.json");

    store::write_catalog(
        &path,
        &[ticker("1120", "a"), ticker("2222", "b"), ticker("7010", "c")],
    )
    .expect("first write");
    store::write_catalog(&path, &[ticker("2222", "b")]).expect("second write");

    let loaded = store::load_catalog(&path).expect("load");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].symbol, "2222");
}

#[test]
fn test_load_catalog_missing_file_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = store::load_catalog(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)), "unexpected error: {}", err);
}

#[test]
fn test_load_catalog_malformed_json_errors() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tickers.json");
    std::fs::write(&path, "not json at all").expect("seed");

    let err = store::load_catalog(&path).unwrap_err();
    assert!(matches!(err, StoreError::Parse(_)), "unexpected error: {}", err);
}

#[test]
fn test_sink_header_before_any_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("snapshot.csv");

    let _sink = SnapshotSink::create(&path).expect("create");

    let csv = std::fs::read_to_string(&path).expect("read");
    assert_eq!(csv.trim_end(), SNAPSHOT_HEADER.join(","));
}

#[test]
fn test_sink_appends_and_flushes_each_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("snapshot.csv");
    let mut sink = SnapshotSink::create(&path).expect("create");

    sink.append(&SnapshotRecord {
        symbol: "1120".to_string(),
        name: "Al Rajhi Bank".to_string(),
        price: "88.50".to_string(),
        change: "+1.25%".to_string(),
        volume: "1000".to_string(),
        last_update: "2026-08-30T12:00:00+00:00".to_string(),
        status: Status::Ok,
    })
    .expect("append ok row");
    sink.append(&SnapshotRecord::errored(
        "2222",
        "2026-08-30T12:00:05+00:00".to_string(),
    ))
    .expect("append error row");

    // The sink is still open; every row must already be on disk.
    let csv = std::fs::read_to_string(&path).expect("read");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "1120,Al Rajhi Bank,88.50,+1.25%,1000,2026-08-30T12:00:00+00:00,OK"
    );
    assert_eq!(
        lines[2],
        "2222,N/A,N/A,N/A,N/A,2026-08-30T12:00:05+00:00,ERROR"
    );
}

#[test]
fn test_sink_create_truncates_previous_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("snapshot.csv");
    std::fs::write(&path, "stale,content\n1,2\n3,4\n").expect("seed");

    let _sink = SnapshotSink::create(&path).expect("create");

    let csv = std::fs::read_to_string(&path).expect("read");
    assert_eq!(csv.lines().count(), 1, "only the fresh header remains");
}

#[test]
fn test_network_log_field_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("network_log.json");

    store::write_network_log(
        &path,
        &[CapturedRequestRecord {
            url: "https://market.example.com/api/chart?range=1y".to_string(),
            status: 200,
            kind: RequestKind::Xhr,
        }],
    )
    .expect("write");

    let raw = std::fs::read_to_string(&path).expect("read");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(parsed[0]["url"], "https://market.example.com/api/chart?range=1y");
    assert_eq!(parsed[0]["status"], 200);
    assert_eq!(parsed[0]["type"], "xhr", "kind serializes under the type key");
}

#[test]
fn test_network_log_empty_capture_writes_empty_array() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("network_log.json");

    store::write_network_log(&path, &[]).expect("write");

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("valid json");
    assert_eq!(parsed, serde_json::json!([]));
}
