//! Typed errors, one per failure class of a run.
//!
//! Only [`ConfigError`] is fatal. The others end the current cycle of a
//! single watch and are reported on that watch's status line.

use thiserror::Error;

/// Configuration could not be loaded or a watch is invalid.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing setting: {0}")]
    MissingSetting(&'static str),

    #[error("invalid watch '{name}': {reason}")]
    InvalidWatch { name: String, reason: String },

    #[error("duplicate watch name: {0}")]
    DuplicateWatch(String),
}

/// The page scraper failed to return content.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("invalid search url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("scrape request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("scraper returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("scraper reported failure for {url}")]
    Unsuccessful { url: String },
}

/// The extraction collaborator failed or broke the listing contract.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("extraction service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("extraction response had no structured output")]
    MissingOutput,

    #[error("response does not match listing schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("listing {index} violates contract: {reason}")]
    InvalidListing { index: usize, reason: String },
}

/// An issue tracker call failed.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to run tracker command: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("`{command}` exited with {code:?}: {stderr}")]
    Command {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unreadable tracker output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Anything that aborts one watch's scrape/extract cycle.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}
