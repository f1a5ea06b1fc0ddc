//! # Presta Feed
//!
//! Client for the PrestaShop-side JSON order feed consumed by the Orion sync pipeline.
//!
//! The feed is a single bounded document, `{ok: bool, orders: [...]}`. The client issues one GET
//! per call and reports transport, decoding, and feed-level failures as distinct error variants.
//! Retry policy belongs to the caller.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::{decode_feed, FeedApi};
pub use config::FeedConfig;
pub use data_objects::{OrderFeed, OrderRecord};
pub use error::FeedApiError;
