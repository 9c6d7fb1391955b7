use chrono::Local;

use crate::models::Listing;
use crate::parsers::{clean_text, format_shipping, format_usd};

const TABLE_HEADER: &str = "| Title | Price | Shipping | Total | Condition | Location | Link |";
const TABLE_DIVIDER: &str = "|-------|-------|----------|-------|-----------|----------|------|";

/// Alert title for a watch; also the deduplication key.
pub fn alert_title(watch_name: &str) -> String {
    format!("Deal Alert: {}", watch_name)
}

/// Markdown table with one row per matching listing, in order.
///
/// The total column is always price plus shipping, independent of
/// whether the watch counts shipping toward its ceiling.
pub fn format_issue_body(listings: &[Listing]) -> String {
    let mut lines = vec![TABLE_HEADER.to_string(), TABLE_DIVIDER.to_string()];

    for listing in listings {
        let condition = listing
            .condition
            .map_or_else(|| "N/A".to_string(), |c| c.to_string());
        let location = listing
            .seller_location
            .as_deref()
            .map(table_cell)
            .unwrap_or_else(|| "N/A".to_string());

        lines.push(format!(
            "| {} | {} | {} | {} | {} | {} | [View]({}) |",
            table_cell(&listing.title),
            format_usd(listing.price),
            format_shipping(listing.shipping_cost),
            format_usd(listing.total_cost()),
            condition,
            location,
            listing.url,
        ));
    }

    lines.push(String::new());
    lines.push(format!(
        "_Detected: {}_",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    lines.join("\n")
}

// Keep a cell on one line and away from the column separators.
fn table_cell(text: &str) -> String {
    clean_text(text).replace('|', "\\|")
}
