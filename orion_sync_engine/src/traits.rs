//! Backend trait for the sync pipeline.
//!
//! The store handle is constructed explicitly and passed into the pipeline (no process-global
//! connection caching); this trait is the seam that keeps the jobs and the public API independent
//! of the concrete backend.
use presta_feed::OrderRecord;
use serde_json::Value;

use crate::{
    db_types::{ReconcileOptions, ReconcileSummary},
    errors::{SnapshotError, SyncError},
};

#[allow(async_fn_in_trait)]
pub trait SyncDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Reconciles one feed batch against the shipment history store.
    ///
    /// The whole write phase runs in a single atomic transaction: any store error aborts the run
    /// and rolls back every write made by it. Records that fail normalization are dropped
    /// silently; duplicate references within the batch are resolved first-occurrence-wins.
    async fn reconcile_batch(
        &self,
        batch: &[OrderRecord],
        options: ReconcileOptions,
    ) -> Result<ReconcileSummary, SyncError>;

    /// Fetches every row of `table` whose `date_field` is at or after `from`, ordered by the
    /// date field descending, decoded into dynamic JSON objects. Both identifiers are validated
    /// against a strict allow-list before being embedded in the query.
    async fn window_rows(&self, table: &str, date_field: &str, from: &str) -> Result<Vec<Value>, SnapshotError>;

    async fn close(&mut self) -> Result<(), SyncError>;
}
