use std::fmt;
use tracing::debug;

use crate::models::{Listing, Watch};

/// Why a listing did not qualify for a watch.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    NotPrimaryProduct,
    ExcludedTerm(String),
    OverCeiling { effective_price: f64, max_price: f64 },
    ConditionNotAllowed,
    LocationMismatch,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotPrimaryProduct => write!(f, "not the searched product"),
            Rejection::ExcludedTerm(term) => write!(f, "title contains excluded term '{}'", term),
            Rejection::OverCeiling {
                effective_price,
                max_price,
            } => write!(f, "${:.2} is over the ${:.2} ceiling", effective_price, max_price),
            Rejection::ConditionNotAllowed => write!(f, "condition not allowed"),
            Rejection::LocationMismatch => write!(f, "seller location does not match"),
        }
    }
}

/// Decide whether one listing qualifies, cheapest checks first.
pub fn evaluate(listing: &Listing, watch: &Watch) -> Result<(), Rejection> {
    if !listing.is_primary_product {
        return Err(Rejection::NotPrimaryProduct);
    }

    if let Some(term) = watch
        .exclude_terms
        .iter()
        .find(|term| contains_whole_word(&listing.title, term))
    {
        return Err(Rejection::ExcludedTerm(term.clone()));
    }

    let effective_price = listing.effective_price(watch.include_shipping);
    if effective_price > watch.max_price {
        return Err(Rejection::OverCeiling {
            effective_price,
            max_price: watch.max_price,
        });
    }

    if !watch.conditions.is_empty() {
        match listing.condition {
            Some(condition) if watch.conditions.contains(&condition) => {}
            _ => return Err(Rejection::ConditionNotAllowed),
        }
    }

    // Unknown seller location cannot be excluded.
    if let (Some(wanted), Some(actual)) = (&watch.location, &listing.seller_location) {
        if !actual.to_lowercase().contains(&wanted.to_lowercase()) {
            return Err(Rejection::LocationMismatch);
        }
    }

    Ok(())
}

/// Listings that qualify for the watch, in their original order.
pub fn filter_listings(listings: Vec<Listing>, watch: &Watch) -> Vec<Listing> {
    listings
        .into_iter()
        .filter(|listing| match evaluate(listing, watch) {
            Ok(()) => true,
            Err(reason) => {
                debug!("Rejected '{}' for {}: {}", listing.title, watch.name, reason);
                false
            }
        })
        .collect()
}

/// Case-insensitive match of `term` bounded by non-word characters.
fn contains_whole_word(text: &str, term: &str) -> bool {
    let text = text.to_lowercase();
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }

    // Every start offset, since hits may overlap.
    text.char_indices()
        .map(|(start, _)| start)
        .filter(|&start| text[start..].starts_with(&term))
        .any(|start| {
            let before = text[..start].chars().next_back();
            let after = text[start + term.len()..].chars().next();
            !before.map_or(false, is_word_char) && !after.map_or(false, is_word_char)
        })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
