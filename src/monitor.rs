//! Runs each watch through scrape, clean, extract, filter and alert.

use std::io::{self, Write};
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::error::{ScrapeError, WatchError};
use crate::extraction::{extract_listings, ExtractionContract, StructuredExtractor};
use crate::matcher::filter_listings;
use crate::models::{Listing, Watch};
use crate::notify::{AlertDispatcher, DispatchOutcome, SkipReason};
use crate::parsers::{clean_markdown, format_usd};
use crate::scrapers::{search_url, PageScraper};

/// Whether matches are only printed or also alerted.
pub enum RunMode {
    DryRun,
    Execute(AlertDispatcher),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WatchOutcome {
    NoMatches,
    Matched {
        listings: Vec<Listing>,
        /// `None` in a dry run.
        alert: Option<DispatchOutcome>,
    },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchReport {
    pub watch_name: String,
    pub max_price: f64,
    pub outcome: WatchOutcome,
}

pub struct Monitor {
    settings: Settings,
    scraper: Box<dyn PageScraper>,
    extractor: Box<dyn StructuredExtractor>,
    mode: RunMode,
}

impl Monitor {
    pub fn new(
        settings: Settings,
        scraper: Box<dyn PageScraper>,
        extractor: Box<dyn StructuredExtractor>,
        mode: RunMode,
    ) -> Self {
        Self {
            settings,
            scraper,
            extractor,
            mode,
        }
    }

    /// Evaluate every watch in order, writing status lines to `out`.
    ///
    /// A failing watch is reported and the run moves on; only a failed
    /// write to `out` ends the run early.
    pub async fn run<W: Write>(&self, watches: &[Watch], out: &mut W) -> io::Result<Vec<WatchReport>> {
        let mut reports = Vec::with_capacity(watches.len());

        for watch in watches {
            writeln!(out, "Checking: {} (max {})...", watch.name, format_usd(watch.max_price))?;

            let outcome = match self.find_matches(watch).await {
                Err(e) => {
                    error!("Failed to check {}: {}", watch.name, e);
                    writeln!(out, "  Failed to check {}: {}", watch.name, e)?;
                    WatchOutcome::Failed(e.to_string())
                }
                Ok(matches) if matches.is_empty() => {
                    writeln!(out, "  No matches found for {}", watch.name)?;
                    WatchOutcome::NoMatches
                }
                Ok(matches) => {
                    writeln!(out, "  Found {} match(es) for {}", matches.len(), watch.name)?;
                    let alert = self.report_matches(watch, &matches, out).await?;
                    WatchOutcome::Matched {
                        listings: matches,
                        alert,
                    }
                }
            };

            reports.push(WatchReport {
                watch_name: watch.name.clone(),
                max_price: watch.max_price,
                outcome,
            });
        }

        Ok(reports)
    }

    /// Scrape, clean, extract and filter listings for one watch.
    pub async fn find_matches(&self, watch: &Watch) -> Result<Vec<Listing>, WatchError> {
        let url = search_url(&self.settings.marketplace_url, watch).map_err(ScrapeError::from)?;

        let Some(raw) = self.scraper.scrape(&url).await? else {
            warn!("No content returned for {}", url);
            return Ok(Vec::new());
        };

        let markdown = clean_markdown(&raw);
        info!(
            "Cleaned markdown for {}: {} -> {} chars",
            watch.name,
            raw.len(),
            markdown.len()
        );
        if markdown.is_empty() {
            return Ok(Vec::new());
        }

        let contract = ExtractionContract::new(&watch.query);
        let listings = extract_listings(self.extractor.as_ref(), &markdown, &contract).await?;
        info!("Extracted {} listings for {}", listings.len(), watch.name);

        Ok(filter_listings(listings, watch))
    }

    async fn report_matches<W: Write>(
        &self,
        watch: &Watch,
        matches: &[Listing],
        out: &mut W,
    ) -> io::Result<Option<DispatchOutcome>> {
        match &self.mode {
            RunMode::DryRun => {
                for listing in matches {
                    let condition = listing
                        .condition
                        .map_or_else(|| "N/A".to_string(), |c| c.to_string());
                    writeln!(
                        out,
                        "    - {}: {} + {} shipping = {} [{}]",
                        listing.title,
                        format_usd(listing.price),
                        format_usd(listing.shipping_cost.unwrap_or(0.0)),
                        format_usd(listing.total_cost()),
                        condition
                    )?;
                    writeln!(out, "      {}", listing.url)?;
                }
                Ok(None)
            }
            RunMode::Execute(dispatcher) => {
                let outcome = dispatcher.dispatch(&watch.name, matches).await;
                match &outcome {
                    DispatchOutcome::Created => {
                        writeln!(out, "  Created issue for {}", watch.name)?
                    }
                    DispatchOutcome::Skipped(SkipReason::AlreadyOpen) => {
                        writeln!(out, "  Issue already open for {}, skipping", watch.name)?
                    }
                    DispatchOutcome::Skipped(reason) => {
                        writeln!(out, "  Alert skipped for {}: {}", watch.name, reason)?
                    }
                }
                Ok(Some(outcome))
            }
        }
    }
}
