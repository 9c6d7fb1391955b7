use anyhow::Result;
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing::info;

use gear_alerts::config::{load_watches, Settings};
use gear_alerts::extraction::AnthropicExtractor;
use gear_alerts::monitor::{Monitor, RunMode};
use gear_alerts::notify::{AlertDispatcher, GhCliTracker};
use gear_alerts::scrapers::FirecrawlScraper;
use gear_alerts::utils::http::create_client;

#[derive(Parser)]
#[command(name = "gear-alerts")]
#[command(about = "Check marketplace watches and raise deal alerts")]
#[command(version)]
#[command(group(ArgGroup::new("mode").required(true).args(["dry_run", "execute"])))]
struct Cli {
    /// Path to the watches file
    #[arg(long = "config", default_value = "./watches.yaml")]
    config_path: PathBuf,

    /// Print matches without creating issues
    #[arg(long)]
    dry_run: bool,

    /// Create issues for matches
    #[arg(long)]
    execute: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the status lines.
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("gear_alerts=info".parse()?);
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);
    if std::env::var("LOG_FORMAT").map_or(false, |format| format.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let settings = Settings::from_env()?;
    if settings.ci {
        info!("Running under CI, .env not loaded");
    }
    let watches = load_watches(&cli.config_path)?;
    info!("Loaded {} watches from {}", watches.len(), cli.config_path.display());

    let client = create_client(settings.request_timeout())?;
    let scraper = FirecrawlScraper::new(
        client.clone(),
        settings.firecrawl_api_key()?,
        settings.firecrawl_url.clone(),
    );
    let extractor = AnthropicExtractor::new(
        client,
        settings.anthropic_api_key()?,
        settings.anthropic_url.clone(),
        settings.extraction_model.clone(),
        settings.extraction_max_tokens,
    );

    let mode = if cli.execute {
        let tracker = GhCliTracker::new(
            settings.github_repo.clone(),
            settings.alert_label_color.clone(),
        );
        RunMode::Execute(AlertDispatcher::new(
            Box::new(tracker),
            settings.alert_label.clone(),
        ))
    } else {
        RunMode::DryRun
    };

    let monitor = Monitor::new(settings, Box::new(scraper), Box::new(extractor), mode);
    let reports = monitor.run(&watches, &mut std::io::stdout()).await?;

    info!("Run completed for {} watches", reports.len());
    Ok(())
}
