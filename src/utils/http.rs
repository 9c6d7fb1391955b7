use reqwest::{Client, ClientBuilder};
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for the scraper and extraction APIs.
///
/// Calls are made once; a failed request ends that watch's cycle.
pub fn create_client(timeout: Duration) -> reqwest::Result<Client> {
    ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .pool_max_idle_per_host(2)
        .build()
}
