use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level feed document. `ok` must be literally `true` for the feed to be considered healthy;
/// [`crate::decode_feed`] enforces this before handing the document to callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderFeed {
    pub ok: bool,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
}

/// One raw order as received from the feed.
///
/// The feed gives no typing guarantees, so every field is kept as a raw JSON value (absent fields
/// decode to `Null`). Presence and type policy is applied downstream by the normalizer, which
/// null-fills or skips rather than rejecting the whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(default)]
    pub reference: Value,
    #[serde(default)]
    pub date_add: Value,
    #[serde(default)]
    pub shipping: Value,
    #[serde(default)]
    pub total_paid_tax_incl: Value,
    #[serde(default)]
    pub current_state_name: Value,
    #[serde(default)]
    pub payment: Value,
}

impl OrderRecord {
    /// Convenience constructor used heavily in tests: builds a record from a JSON object literal.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}
