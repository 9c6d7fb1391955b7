use anyhow::{Context, Result};
use std::fs;

use gear_alerts::config::Settings;
use gear_alerts::models::Watch;
use gear_alerts::parsers::clean_markdown;
use gear_alerts::scrapers::{search_url, FirecrawlScraper, PageScraper};
use gear_alerts::utils::http::create_client;

// Usage:
//   analyze_page "Roland RE-201"      scrape the search page for a query
//   analyze_page --file page.md       clean a saved page
#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let raw = match args.as_slice() {
        [flag, path] if flag == "--file" => {
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        [query] => {
            let settings = Settings::from_env()?;
            let client = create_client(settings.request_timeout())?;
            let scraper = FirecrawlScraper::new(
                client,
                settings.firecrawl_api_key()?,
                settings.firecrawl_url.clone(),
            );

            let watch = Watch::new("analysis", query.as_str(), 100_000.0);
            let url = search_url(&settings.marketplace_url, &watch)?;
            println!("Fetching {}...", url);
            scraper
                .scrape(&url)
                .await?
                .context("Scraper returned no markdown")?
        }
        _ => anyhow::bail!("usage: analyze_page <query> | analyze_page --file <page.md>"),
    };

    let cleaned = clean_markdown(&raw);
    fs::write("page_raw.md", &raw)?;
    fs::write("page_cleaned.md", &cleaned)?;

    let saved = raw.len().saturating_sub(cleaned.len());
    let percent = if raw.is_empty() {
        0.0
    } else {
        saved as f64 * 100.0 / raw.len() as f64
    };
    println!("Raw:     {} chars, {} lines", raw.len(), raw.lines().count());
    println!("Cleaned: {} chars, {} lines", cleaned.len(), cleaned.lines().count());
    println!("Removed: {} chars ({:.1}%)", saved, percent);
    println!("Wrote page_raw.md and page_cleaned.md");

    Ok(())
}
