use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace item condition, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Condition {
    #[serde(rename = "Brand New")]
    BrandNew,
    #[serde(rename = "Mint")]
    Mint,
    #[serde(rename = "Excellent")]
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    #[serde(rename = "Good")]
    Good,
    #[serde(rename = "B-Stock")]
    BStock,
    #[serde(rename = "Poor Condition")]
    Poor,
    #[serde(rename = "Non Functioning")]
    NonFunctioning,
}

impl Condition {
    pub const ALL: [Condition; 8] = [
        Condition::BrandNew,
        Condition::Mint,
        Condition::Excellent,
        Condition::VeryGood,
        Condition::Good,
        Condition::BStock,
        Condition::Poor,
        Condition::NonFunctioning,
    ];

    /// Human-readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Condition::BrandNew => "Brand New",
            Condition::Mint => "Mint",
            Condition::Excellent => "Excellent",
            Condition::VeryGood => "Very Good",
            Condition::Good => "Good",
            Condition::BStock => "B-Stock",
            Condition::Poor => "Poor Condition",
            Condition::NonFunctioning => "Non Functioning",
        }
    }

    /// Search filter slug used in marketplace URLs.
    pub fn slug(&self) -> &'static str {
        match self {
            Condition::BrandNew => "new",
            Condition::Mint => "mint",
            Condition::Excellent => "excellent",
            Condition::VeryGood => "very-good",
            Condition::Good => "good",
            Condition::BStock => "b-stock",
            Condition::Poor => "poor",
            Condition::NonFunctioning => "non-functioning",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
