pub mod body;
mod github;

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use tracing::{error, info, warn};

use crate::error::TrackerError;
use crate::models::Listing;
pub use body::{alert_title, format_issue_body};
pub use github::GhCliTracker;

/// An issue as reported by the tracker search.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub number: u64,
    pub title: String,
}

/// External issue tracker used for alerts.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Open issues whose title matches the search text. May be fuzzy.
    async fn search_open_by_title(&self, title: &str) -> Result<Vec<Issue>, TrackerError>;
    /// Create the label if it does not exist.
    async fn ensure_label(&self, name: &str) -> Result<(), TrackerError>;
    async fn create_issue(&self, title: &str, body: &str, label: &str) -> Result<(), TrackerError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Created,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// An open alert with the same title already exists.
    AlreadyOpen,
    /// A tracker call failed; nothing is retried.
    TrackerFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyOpen => write!(f, "alert already open"),
            SkipReason::TrackerFailed(reason) => write!(f, "tracker error: {}", reason),
        }
    }
}

/// Creates at most one open alert per watch.
pub struct AlertDispatcher {
    tracker: Box<dyn IssueTracker>,
    label: String,
}

impl AlertDispatcher {
    pub fn new(tracker: Box<dyn IssueTracker>, label: impl Into<String>) -> Self {
        Self {
            tracker,
            label: label.into(),
        }
    }

    pub async fn dispatch(&self, watch_name: &str, matches: &[Listing]) -> DispatchOutcome {
        let title = alert_title(watch_name);

        let existing = match self.tracker.search_open_by_title(&title).await {
            Ok(issues) => issues,
            Err(e) => {
                error!("Failed to search open issues for '{}': {}", title, e);
                return DispatchOutcome::Skipped(SkipReason::TrackerFailed(e.to_string()));
            }
        };

        if existing.iter().any(|issue| issue.title == title) {
            info!("Open issue already exists: {}", title);
            return DispatchOutcome::Skipped(SkipReason::AlreadyOpen);
        }

        // Best effort: a missing label must not block the alert.
        if let Err(e) = self.tracker.ensure_label(&self.label).await {
            warn!("Failed to ensure label '{}': {}", self.label, e);
        }

        let body = format_issue_body(matches);
        match self.tracker.create_issue(&title, &body, &self.label).await {
            Ok(()) => {
                info!("Created issue '{}' with {} listings", title, matches.len());
                DispatchOutcome::Created
            }
            Err(e) => {
                error!("Failed to create issue '{}': {}", title, e);
                DispatchOutcome::Skipped(SkipReason::TrackerFailed(e.to_string()))
            }
        }
    }
}
