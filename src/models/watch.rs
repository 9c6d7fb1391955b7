use serde::{Deserialize, Serialize};

use super::Condition;
use crate::error::ConfigError;

/// A user-defined monitoring rule, read from the watch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watch {
    /// Unique name; also the alert key.
    pub name: String,
    pub query: String,
    pub max_price: f64,
    #[serde(default)]
    pub include_shipping: bool,
    /// Case-insensitive substring of the seller location.
    #[serde(default)]
    pub location: Option<String>,
    /// Allowed conditions. Empty means any.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Whole-word, case-insensitive title terms that disqualify a listing.
    #[serde(default)]
    pub exclude_terms: Vec<String>,
}

impl Watch {
    pub fn new(name: impl Into<String>, query: impl Into<String>, max_price: f64) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            max_price,
            include_shipping: false,
            location: None,
            conditions: Vec::new(),
            exclude_terms: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidWatch {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.name.trim().is_empty() {
            return Err(invalid("name is blank"));
        }
        if self.query.trim().is_empty() {
            return Err(invalid("query is blank"));
        }
        if !self.max_price.is_finite() || self.max_price <= 0.0 {
            return Err(invalid("max_price must be greater than zero"));
        }
        if matches!(&self.location, Some(location) if location.trim().is_empty()) {
            return Err(invalid("location is blank"));
        }
        if self.exclude_terms.iter().any(|term| term.trim().is_empty()) {
            return Err(invalid("exclude_terms contains a blank term"));
        }
        Ok(())
    }
}
