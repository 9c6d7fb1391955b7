use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::ScrapeError;
use crate::scrapers::PageScraper;

/// Scrapes pages through the Firecrawl API, which renders JavaScript and
/// returns the page as markdown.
pub struct FirecrawlScraper {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 1],
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    success: bool,
    data: Option<ScrapeData>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
}

impl FirecrawlScraper {
    pub fn new(client: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PageScraper for FirecrawlScraper {
    async fn scrape(&self, url: &Url) -> Result<Option<String>, ScrapeError> {
        info!("Scraping {}", url);

        let response = self
            .client
            .post(format!("{}/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ScrapeRequest {
                url: url.as_str(),
                formats: ["markdown"],
                only_main_content: true,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ScrapeResponse = response.json().await?;
        if !payload.success {
            return Err(ScrapeError::Unsuccessful {
                url: url.to_string(),
            });
        }

        let markdown = payload.data.and_then(|data| data.markdown);
        debug!(
            "Firecrawl response length: {} chars",
            markdown.as_ref().map_or(0, |m| m.len())
        );
        Ok(markdown)
    }
}
