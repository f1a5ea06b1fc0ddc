use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedApiError {
    #[error("Could not initialize feed client: {0}")]
    Initialization(String),
    #[error("Transport error fetching order feed: {0}")]
    Transport(String),
    #[error("Feed request failed. HTTP {status}. Body: {body}")]
    Status { status: u16, body: String },
    #[error("Feed body is not valid JSON. Body: {0}")]
    Decode(String),
    #[error("Feed reported failure (ok != true). Document: {0}")]
    Feed(String),
}
