pub mod markdown;
pub mod price;

pub use markdown::*;
pub use price::*;

/// Collapse all whitespace runs (including line breaks) to single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
