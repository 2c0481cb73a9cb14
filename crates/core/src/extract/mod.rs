//! Extraction strategies over a parsed page snapshot.
//!
//! The target site's markup is inconsistent across pages and locales, so no
//! single selector is reliable. Each value is pulled by a chain of named
//! strategies tried most-specific-first; the first non-empty result wins.
//! Strategies are pure functions of the snapshot: "not found" is an empty
//! result or the [`SENTINEL`], never an error.

use crate::dom::{DomNode, NodeType};
use crate::records::{TickerRecord, SENTINEL};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// A labeled numeric field on a per-symbol detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Price,
    Change,
    Volume,
}

impl Field {
    /// Dedicated element class the site uses when it behaves.
    fn primary_class(&self) -> &'static str {
        match self {
            Field::Price => "last-price",
            Field::Change => "price-change",
            Field::Volume => "trading-volume",
        }
    }

    /// Needle for the broader class-substring fallback.
    fn class_needle(&self) -> &'static str {
        match self {
            Field::Price => "price",
            Field::Change => "change",
            Field::Volume => "volume",
        }
    }

    /// Visible-text labels, English and Arabic, for the regex fallback.
    fn labels(&self) -> &'static [&'static str] {
        match self {
            Field::Price => &["Price", "السعر"],
            Field::Change => &["Change", "التغير"],
            Field::Volume => &["Volume", "الحجم"],
        }
    }
}

static FIELD_PATTERNS: Lazy<Vec<(Field, Regex)>> = Lazy::new(|| {
    let mut patterns = Vec::new();
    for field in [Field::Price, Field::Change, Field::Volume] {
        for label in field.labels() {
            // Label and value are usually on adjacent lines of the visible
            // text, occasionally on the same line after a colon.
            let pattern = format!(
                r"{}\s*:?\s*\n?\s*([+\-]?[\d][\d,.]*\s?%?)",
                regex::escape(label)
            );
            patterns.push((field, Regex::new(&pattern).expect("field pattern compiles")));
        }
    }
    patterns
});

/// Matches per-symbol detail hrefs like `/en/stocks/1120` or
/// `https://host/stocks/2222/overview`, capturing the numeric exchange code.
static STOCK_HREF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/stocks/(\d+)(?:[/?#]|$)").expect("href pattern compiles"));

/// Table strategy: every `<tr>` under any `<table>`, as trimmed cell text.
/// Cells with no text stay as empty strings so sparse rows keep their column
/// positions; only rows that yield zero cells are dropped.
pub fn table_rows(dom: &DomNode) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    collect_rows(dom, false, &mut rows);
    rows
}

fn collect_rows(node: &DomNode, in_table: bool, rows: &mut Vec<Vec<String>>) {
    let in_table = in_table || node.tag == "table";
    if in_table && node.tag == "tr" {
        let mut cells = Vec::new();
        collect_cells(node, &mut cells);
        if !cells.is_empty() {
            rows.push(cells);
        }
    }
    for child in &node.children {
        collect_rows(child, in_table, rows);
    }
}

fn collect_cells(node: &DomNode, cells: &mut Vec<String>) {
    if node.tag == "th" || node.tag == "td" {
        cells.push(node.text_content());
        return;
    }
    for child in &node.children {
        collect_cells(child, cells);
    }
}

/// Field strategy: dedicated class, then class substring, then a bilingual
/// labeled-regex scan of the page's visible text. All misses collapse to the
/// sentinel; a missing field must not disturb extraction of the others.
pub fn field_value(dom: &DomNode, field: Field) -> String {
    if let Some(value) = find_by_exact_class(dom, field.primary_class()) {
        return value;
    }
    if let Some(value) = find_by_class_needle(dom, field.class_needle()) {
        return value;
    }
    if let Some(value) = field_from_visible_text(&dom.visible_text(), field) {
        return value;
    }
    SENTINEL.to_string()
}

fn find_by_exact_class(node: &DomNode, class: &str) -> Option<String> {
    if node.node_type == NodeType::Element && node.has_class(class) {
        let text = node.text_content();
        if !text.is_empty() {
            return Some(text);
        }
    }
    node.children
        .iter()
        .find_map(|child| find_by_exact_class(child, class))
}

fn find_by_class_needle(node: &DomNode, needle: &str) -> Option<String> {
    if node.node_type == NodeType::Element && node.class_contains(needle) {
        let text = node.text_content();
        // Container elements match the substring too; only a candidate that
        // actually carries a number is worth returning.
        if !text.is_empty() && text.len() <= 64 && text.chars().any(|c| c.is_ascii_digit()) {
            return Some(text);
        }
    }
    node.children
        .iter()
        .find_map(|child| find_by_class_needle(child, needle))
}

fn field_from_visible_text(text: &str, field: Field) -> Option<String> {
    FIELD_PATTERNS
        .iter()
        .filter(|(f, _)| *f == field)
        .find_map(|(_, re)| re.captures(text))
        .map(|cap| cap[1].trim().to_string())
}

/// Link-harvest strategy: every anchor whose `href` matches the per-symbol
/// URL pattern, deduplicated first-wins on the numeric code, in document
/// order. Anchor text becomes the provisional instrument name.
pub fn harvest_ticker_links(dom: &DomNode, base_url: &str) -> Vec<TickerRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();
    collect_ticker_anchors(dom, base_url, &mut seen, &mut records);
    records
}

fn collect_ticker_anchors(
    node: &DomNode,
    base_url: &str,
    seen: &mut HashSet<String>,
    records: &mut Vec<TickerRecord>,
) {
    if node.tag == "a" {
        if let Some(href) = node.get_attr("href") {
            if let Some(cap) = STOCK_HREF_RE.captures(href) {
                let symbol = cap[1].to_string();
                if seen.insert(symbol.clone()) {
                    records.push(TickerRecord {
                        symbol,
                        full_href: resolve_href(base_url, href),
                        name: node.text_content(),
                    });
                }
            }
        }
    }
    for child in &node.children {
        collect_ticker_anchors(child, base_url, seen, records);
    }
}

fn resolve_href(base_url: &str, href: &str) -> String {
    match Url::parse(base_url).and_then(|base| base.join(href)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => href.to_string(),
    }
}

/// First non-empty `<h1>` on the page, if any. Detail pages carry the
/// instrument's display name there; callers fall back to the catalog name.
pub fn page_heading(dom: &DomNode) -> Option<String> {
    if dom.tag == "h1" {
        let text = dom.text_content();
        if !text.is_empty() {
            return Some(text);
        }
    }
    dom.children.iter().find_map(page_heading)
}
