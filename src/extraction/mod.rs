use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::ExtractionError;
use crate::models::Listing;

mod anthropic;
mod contract;
pub mod schema;

pub use anthropic::AnthropicExtractor;
pub use contract::ExtractionContract;

/// Hosted structured-extraction capability.
///
/// Implementations return the raw structured payload; the contract
/// decides whether it is acceptable.
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    async fn extract(
        &self,
        markdown: &str,
        contract: &ExtractionContract,
    ) -> Result<Value, ExtractionError>;
}

/// Run extraction on cleaned markdown and validate the result.
pub async fn extract_listings(
    extractor: &dyn StructuredExtractor,
    markdown: &str,
    contract: &ExtractionContract,
) -> Result<Vec<Listing>, ExtractionError> {
    let payload = extractor.extract(markdown, contract).await?;
    let listings = contract.parse(payload)?;
    debug!(
        "Extracted {} listings for query '{}'",
        listings.len(),
        contract.query()
    );
    Ok(listings)
}
