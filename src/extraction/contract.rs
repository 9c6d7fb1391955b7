use serde_json::Value;

use super::schema::{property_names, strict_schema};
use crate::error::ExtractionError;
use crate::models::{Condition, Listing, ListingResults};

/// What an extraction must return for one search query: the instruction
/// text, the output schema, and the validation applied to the response.
#[derive(Debug, Clone)]
pub struct ExtractionContract {
    query: String,
    schema: Value,
    listing_fields: Vec<String>,
}

impl ExtractionContract {
    pub fn new(query: impl Into<String>) -> Self {
        let schema = strict_schema::<ListingResults>();
        let listing_fields = property_names(&schema["properties"]["listings"]["items"]);
        Self {
            query: query.into(),
            schema,
            listing_fields,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Strict JSON schema of the expected output.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn instructions(&self) -> String {
        let conditions = Condition::ALL
            .iter()
            .map(Condition::label)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "You are a data extraction agent. Given markdown content from a musical gear \
             marketplace search page, extract every product listing visible in the content \
             into structured data, in the order they appear.\n\
             \n\
             For each listing:\n\
             - title: the listing title as shown.\n\
             - price: the asking price as a number in USD, without currency symbols.\n\
             - shipping_cost: the shipping cost as a number in USD. Use null when shipping \
             is free or not listed; never use 0 for free shipping.\n\
             - seller_location: the seller location as shown, or null if not shown.\n\
             - url: the absolute URL of the listing page.\n\
             - condition: exactly one of: {conditions}. Use null if the condition is not \
             shown or does not clearly map to one of these values. Never invent other values.\n\
             - is_primary_product: true only if the listing is an actual instance of the \
             exact product being searched for, \"{query}\". Accessories, parts, cables, \
             power supplies, cases, covers and other peripherals for that product are \
             false, even when they are from the same brand or mention the product name.\n\
             \n\
             Every field must be present on every listing.",
            conditions = conditions,
            query = self.query,
        )
    }

    pub fn user_prompt(&self, markdown: &str) -> String {
        format!(
            "Extract all listings from this marketplace search page for \"{}\":\n\n{}",
            self.query, markdown
        )
    }

    /// Validate a raw extraction response into listings.
    ///
    /// Any missing field, unknown field, out-of-set condition or invalid
    /// amount fails the whole response.
    pub fn parse(&self, payload: Value) -> Result<Vec<Listing>, ExtractionError> {
        if let Some(records) = payload.get("listings").and_then(Value::as_array) {
            for (index, record) in records.iter().enumerate() {
                if let Some(fields) = record.as_object() {
                    if let Some(missing) = self
                        .listing_fields
                        .iter()
                        .find(|name| !fields.contains_key(name.as_str()))
                    {
                        return Err(ExtractionError::InvalidListing {
                            index,
                            reason: format!("missing field `{}`", missing),
                        });
                    }
                }
            }
        }

        let results: ListingResults = serde_json::from_value(payload)?;
        for (index, listing) in results.listings.iter().enumerate() {
            listing
                .validate()
                .map_err(|reason| ExtractionError::InvalidListing { index, reason })?;
        }

        Ok(results.listings)
    }
}
