use std::time::Duration;

use log::*;

pub const DEFAULT_FEED_URL: &str = "http://localhost/presta-ws/pages/pedidos/pedidos.php?limit=10";
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { url: DEFAULT_FEED_URL.to_string(), timeout: Duration::from_secs(DEFAULT_FEED_TIMEOUT_SECS) }
    }
}

impl FeedConfig {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self { url: url.into(), timeout }
    }

    /// Reads `ORION_FEED_URL` and `ORION_FEED_TIMEOUT` from the environment. The caller is
    /// expected to have loaded any `.env` file already, so real environment variables always win.
    pub fn new_from_env_or_default() -> Self {
        let url = std::env::var("ORION_FEED_URL").unwrap_or_else(|_| {
            warn!("ORION_FEED_URL not set, using the localhost default");
            DEFAULT_FEED_URL.to_string()
        });
        let timeout = std::env::var("ORION_FEED_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_FEED_TIMEOUT_SECS);
        Self { url, timeout: Duration::from_secs(timeout) }
    }
}
