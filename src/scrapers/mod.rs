use async_trait::async_trait;
use url::Url;

use crate::error::ScrapeError;
use crate::models::Watch;

mod firecrawl;

pub use firecrawl::FirecrawlScraper;

/// Fetches a page and returns it as markdown.
#[async_trait]
pub trait PageScraper: Send + Sync {
    /// `Ok(None)` when the page was fetched but produced no markdown.
    async fn scrape(&self, url: &Url) -> Result<Option<String>, ScrapeError>;
}

/// Build the marketplace search URL for a watch, cheapest listings first.
pub fn search_url(marketplace_url: &str, watch: &Watch) -> Result<Url, url::ParseError> {
    let mut params: Vec<(&str, String)> = vec![
        ("query", watch.query.clone()),
        ("sort", "price|asc".to_string()),
        ("price_max", format!("{}", watch.max_price)),
    ];
    if let Some(location) = &watch.location {
        params.push(("item_region", location.clone()));
    }
    for condition in &watch.conditions {
        params.push(("condition[]", condition.slug().to_string()));
    }

    let mut url = Url::parse(marketplace_url)?;
    // Pairs of plain strings always encode.
    let query = serde_urlencoded::to_string(&params).unwrap_or_default();
    url.set_query(Some(&query));
    Ok(url)
}
