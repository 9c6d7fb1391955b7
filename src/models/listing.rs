use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use super::Condition;

/// A single marketplace offer as extracted from a search results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Listing {
    /// Listing title exactly as shown on the page.
    pub title: String,
    /// Asking price in USD.
    pub price: f64,
    /// Shipping cost in USD, or null when shipping is free or not listed.
    pub shipping_cost: Option<f64>,
    /// Seller location as shown on the page, or null.
    pub seller_location: Option<String>,
    /// Absolute URL of the listing page.
    pub url: Url,
    /// Item condition, or null when not shown.
    pub condition: Option<Condition>,
    /// True only when the listing is the searched-for product itself,
    /// not an accessory, part, cable, case or other peripheral for it.
    pub is_primary_product: bool,
}

/// Envelope returned by the extraction step.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListingResults {
    /// Every listing visible in the page content, in page order.
    pub listings: Vec<Listing>,
}

impl Listing {
    /// Price plus shipping, used for display regardless of watch settings.
    pub fn total_cost(&self) -> f64 {
        self.price + self.shipping_cost.unwrap_or(0.0)
    }

    /// Price compared against a watch's ceiling.
    pub fn effective_price(&self, include_shipping: bool) -> f64 {
        match self.shipping_cost {
            Some(shipping) if include_shipping => self.price + shipping,
            _ => self.price,
        }
    }

    /// Check the value constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is blank".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("price {} is not a non-negative amount", self.price));
        }
        if let Some(shipping) = self.shipping_cost {
            if !shipping.is_finite() || shipping < 0.0 {
                return Err(format!("shipping cost {} is not a non-negative amount", shipping));
            }
        }
        if !matches!(self.url.scheme(), "http" | "https") || self.url.host_str().is_none() {
            return Err(format!("url {} is not an absolute web address", self.url));
        }
        Ok(())
    }
}
