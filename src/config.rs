use config::{Config as ConfigLoader, Environment, File, FileFormat};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::models::Watch;

/// Process-wide settings, built once at startup and passed into the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub firecrawl_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default = "default_extraction_model")]
    pub extraction_model: String,
    #[serde(default = "default_extraction_max_tokens")]
    pub extraction_max_tokens: u32,
    #[serde(default = "default_marketplace_url")]
    pub marketplace_url: String,
    #[serde(default = "default_firecrawl_url")]
    pub firecrawl_url: String,
    #[serde(default = "default_anthropic_url")]
    pub anthropic_url: String,
    /// `owner/name`; the current directory's repository when unset.
    #[serde(default)]
    pub github_repo: Option<String>,
    #[serde(default = "default_alert_label")]
    pub alert_label: String,
    #[serde(default = "default_alert_label_color")]
    pub alert_label_color: String,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    /// Running under CI; `.env` is not loaded.
    #[serde(default)]
    pub ci: bool,
}

fn default_extraction_model() -> String {
    "claude-haiku-4-5-20251001".to_string()
}

fn default_extraction_max_tokens() -> u32 {
    8192
}

fn default_marketplace_url() -> String {
    "https://reverb.com/marketplace".to_string()
}

fn default_firecrawl_url() -> String {
    "https://api.firecrawl.dev/v1".to_string()
}

fn default_anthropic_url() -> String {
    "https://api.anthropic.com/v1".to_string()
}

fn default_alert_label() -> String {
    "deal-alert".to_string()
}

fn default_alert_label_color() -> String {
    "0E8A16".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    120
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            firecrawl_api_key: None,
            anthropic_api_key: None,
            extraction_model: default_extraction_model(),
            extraction_max_tokens: default_extraction_max_tokens(),
            marketplace_url: default_marketplace_url(),
            firecrawl_url: default_firecrawl_url(),
            anthropic_url: default_anthropic_url(),
            github_repo: None,
            alert_label: default_alert_label(),
            alert_label_color: default_alert_label_color(),
            request_timeout_seconds: default_request_timeout_seconds(),
            ci: false,
        }
    }
}

impl Settings {
    /// Read settings from environment variables (`FIRECRAWL_API_KEY`,
    /// `ANTHROPIC_API_KEY`, `GITHUB_REPO`, `CI`, ...).
    ///
    /// Outside CI a `.env` file in the working directory is loaded first.
    pub fn from_env() -> Result<Self, ConfigError> {
        let ci = ci_enabled(std::env::var("CI").ok().as_deref());
        if !ci {
            match dotenvy::dotenv() {
                Ok(path) => debug!("Loaded environment from {}", path.display()),
                Err(e) => debug!("No .env file loaded: {}", e),
            }
        }

        // `CI` is resolved above; the raw variable may be empty or non-boolean.
        let settings = ConfigLoader::builder()
            .add_source(Environment::default().try_parsing(true))
            .set_override("ci", ci)?
            .build()?
            .try_deserialize::<Settings>()?;

        Ok(settings)
    }

    pub fn firecrawl_api_key(&self) -> Result<&str, ConfigError> {
        non_empty(&self.firecrawl_api_key).ok_or(ConfigError::MissingSetting("FIRECRAWL_API_KEY"))
    }

    pub fn anthropic_api_key(&self) -> Result<&str, ConfigError> {
        non_empty(&self.anthropic_api_key).ok_or(ConfigError::MissingSetting("ANTHROPIC_API_KEY"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// An unset or empty `CI`, or an explicit `false`/`0`, means a local run.
fn ci_enabled(value: Option<&str>) -> bool {
    match value.map(str::trim) {
        None | Some("") | Some("0") => false,
        Some(value) => !value.eq_ignore_ascii_case("false"),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct WatchFile {
    watches: Vec<Watch>,
}

/// Load and validate the YAML watch file.
pub fn load_watches(path: &Path) -> Result<Vec<Watch>, ConfigError> {
    let file = ConfigLoader::builder()
        .add_source(File::from(path).format(FileFormat::Yaml))
        .build()?
        .try_deserialize::<WatchFile>()?;

    validate_watches(file.watches)
}

/// Parse and validate watches from YAML text.
pub fn parse_watches(yaml: &str) -> Result<Vec<Watch>, ConfigError> {
    let file = ConfigLoader::builder()
        .add_source(File::from_str(yaml, FileFormat::Yaml))
        .build()?
        .try_deserialize::<WatchFile>()?;

    validate_watches(file.watches)
}

fn validate_watches(watches: Vec<Watch>) -> Result<Vec<Watch>, ConfigError> {
    {
        let mut names = HashSet::new();
        for watch in &watches {
            watch.validate()?;
            if !names.insert(watch.name.as_str()) {
                return Err(ConfigError::DuplicateWatch(watch.name.clone()));
            }
        }
    }

    if watches.is_empty() {
        warn!("Watch file contains no watches");
    }

    Ok(watches)
}
