//! Deterministic cleanup of scraped marketplace markdown.
//!
//! Search result pages come back with navigation, badges, tracking
//! parameters and a long footer. Stripping them before extraction cuts
//! the token volume roughly in half without touching listing content.

use once_cell::sync::Lazy;
use regex::Regex;

/// Headings and blocks that start the non-listing part of the page.
static SECTION_END_MARKERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?m)^#{1,6}[ \t]*$",
        r"(?mi)^#{1,6}[ \t]*Shop Gear\b",
        r"(?mi)^#{1,6}[ \t]*Sort by\b",
        r"(?mi)^#{1,6}[ \t]*Save (?:this |your )?search\b",
        r"(?mi)^(?:#{1,6}[ \t]*)?Filter Your Search\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Invalid section marker regex"))
    .collect()
});

// One alternation so a removal cannot feed a later pattern in the same pass.
static BOILERPLATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)",
        r"!\[[^\]]*\]\([^)]*\)",
        r"|(?i:\[Close\]\([^)]*\))",
        r"|(?i:^#{1,6}[ \t]*Related searches)[^\n]*(?:\n|\z)(?:[ \t]*\n)*(?:[ \t]*[-*+][ \t][^\n]*(?:\n|\z))*",
        r"|\bBumped\b",
        r"|\b(?:\d+-Day )?Return Policy\b|\bFree Returns\b",
        r"|\bFree Shipping\b",
        r"|\b(?:Great|Good|Fair) Value\b",
        r"|\bJust Listed\b|\bNew Listing\b",
        r"|\bPreferred Seller\b",
    ))
    .expect("Invalid boilerplate regex")
});

static TRACKING_PARAM_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\?bk=[^\s)\]]*").expect("Invalid tracking param regex")
});

static NOISE_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:In \d+ Other Carts?|Price Drop|Local Pickup)[ \t]*(?:\n|\z)")
        .expect("Invalid noise line regex")
});

static PRICE_DROP_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?mi)^[ \t]*Originally \$[\d,]+(?:\.\d+)?,? now \$[\d,]+(?:\.\d+)?",
        r"[ \t]*\(\$[\d,]+(?:\.\d+)? price drop\)[ \t]*(?:\n|\z)",
    ))
    .expect("Invalid price drop line regex")
});

static PRICE_DROP_SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[ \t]*\(?\$[\d,]+(?:\.\d+)? price drop\)?").expect("Invalid price drop regex")
});

static BLANK_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]+(?:\n|\z)").expect("Invalid blank line regex")
});

static EXCESS_BREAKS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n{3,}").expect("Invalid line break regex")
});

/// Strip a scraped search page down to its listing content.
///
/// Pure and total. The result is never longer than the input and
/// `clean_markdown(clean_markdown(x)) == clean_markdown(x)`.
pub fn clean_markdown(raw: &str) -> String {
    let mut text = raw.to_string();

    // A removal can expose a new match (an image in front of a heading),
    // so repeat until stable. Every changing pass shrinks the text.
    loop {
        let cleaned = clean_pass(&text);
        if cleaned == text {
            return cleaned;
        }
        text = cleaned;
    }
}

fn clean_pass(text: &str) -> String {
    // Removals can join a stray `\r` to a later `\n`, so normalize every pass.
    let text = text.replace("\r\n", "\n");
    let text = truncate_trailing_sections(&text);
    let text = BOILERPLATE_REGEX.replace_all(text, "");
    let text = TRACKING_PARAM_REGEX.replace_all(&text, "");
    let text = NOISE_LINE_REGEX.replace_all(&text, "");
    let text = PRICE_DROP_LINE_REGEX.replace_all(&text, "");
    let text = PRICE_DROP_SUFFIX_REGEX.replace_all(&text, "");
    let text = BLANK_LINE_REGEX.replace_all(&text, "");
    let text = EXCESS_BREAKS_REGEX.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Cut at each marker in turn, so the earliest marker on the page wins.
fn truncate_trailing_sections(text: &str) -> &str {
    let mut text = text;
    for marker in SECTION_END_MARKERS.iter() {
        if let Some(found) = marker.find(text) {
            text = &text[..found.start()];
        }
    }
    text
}
