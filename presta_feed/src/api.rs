use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client,
};
use serde_json::Value;

use crate::{config::FeedConfig, data_objects::OrderFeed, error::FeedApiError};

/// Diagnostic bodies embedded in error messages are capped at this many characters.
const MAX_BODY_SNIPPET: usize = 2000;

#[derive(Clone)]
pub struct FeedApi {
    config: FeedConfig,
    client: Arc<Client>,
}

impl FeedApi {
    pub fn new(config: FeedConfig) -> Result<Self, FeedApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FeedApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self) -> &str {
        self.config.url.as_str()
    }

    /// Fetches the order feed with a single GET. No retries; the scheduler decides retry policy.
    pub async fn fetch_orders(&self) -> Result<OrderFeed, FeedApiError> {
        debug!("Fetching order feed from {}", self.config.url);
        let response =
            self.client.get(&self.config.url).send().await.map_err(|e| FeedApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| FeedApiError::Transport(e.to_string()))?;
        let feed = decode_feed(status, &body)?;
        info!("Fetched order feed: {} orders", feed.orders.len());
        Ok(feed)
    }
}

/// Maps an HTTP (status, body) pair onto the feed contract.
///
/// Split out of [`FeedApi::fetch_orders`] so the error taxonomy can be tested without a live
/// endpoint. Statuses >= 400 are transport-level failures; an unparseable body is a decode
/// failure; a parseable document whose `ok` field is not boolean `true` is a feed failure.
pub fn decode_feed(status: u16, body: &str) -> Result<OrderFeed, FeedApiError> {
    if status >= 400 {
        return Err(FeedApiError::Status { status, body: snippet(body) });
    }
    let doc: Value = serde_json::from_str(body).map_err(|_| FeedApiError::Decode(snippet(body)))?;
    if doc.get("ok").and_then(Value::as_bool) != Some(true) {
        return Err(FeedApiError::Feed(doc.to_string()));
    }
    serde_json::from_value(doc).map_err(|e| FeedApiError::Decode(e.to_string()))
}

fn snippet(body: &str) -> String {
    body.chars().take(MAX_BODY_SNIPPET).collect()
}
