pub mod dom;
pub mod extract;
pub mod jobs;
pub mod records;
pub mod session;
pub mod store;

use records::TickerRecord;

/// Parse an HTML string and harvest every ticker link in it.
/// Convenience entry point for one-off use of the extraction layer.
pub fn harvest(html: &str, base_url: &str) -> Vec<TickerRecord> {
    let dom_tree = dom::parse_html(html);
    extract::harvest_ticker_links(&dom_tree, base_url)
}
