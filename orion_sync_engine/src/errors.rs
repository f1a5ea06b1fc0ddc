use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Invalid {kind} identifier: {value}")]
    InvalidIdentifier { kind: &'static str, value: String },
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),
    #[error("Could not encode snapshot to JSON: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Could not persist snapshot: {0}")]
    Persistence(String),
}
