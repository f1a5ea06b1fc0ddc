use std::time::Instant;

use chrono::Local;
use log::*;
use presta_feed::OrderRecord;

use crate::{
    db_types::{ReconcileOptions, ReconcileSummary},
    errors::{SnapshotError, SyncError},
    materialize::{
        effective_months,
        group_by_reference,
        window_start,
        SnapshotData,
        SnapshotDocument,
        SnapshotParams,
        DATE_FORMAT,
    },
    traits::SyncDatabase,
};

/// The high-level pipeline API. Callers hand in a feed batch or snapshot parameters and get a
/// summary back; everything store-specific lives behind the [`SyncDatabase`] backend.
pub struct SyncApi<B> {
    db: B,
}

impl<B: std::fmt::Debug> std::fmt::Debug for SyncApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyncApi ({:?})", self.db)
    }
}

impl<B> SyncApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B: SyncDatabase> SyncApi<B> {
    /// Reconciles one feed batch against the shipment history and reports what happened,
    /// including the wall-clock duration of the run.
    pub async fn reconcile(
        &self,
        batch: &[OrderRecord],
        options: ReconcileOptions,
    ) -> Result<ReconcileSummary, SyncError> {
        let started = Instant::now();
        info!("🗃️ Reconciling batch of {} records ({})", batch.len(), options.mode);
        let mut summary = self.db.reconcile_batch(batch, options).await?;
        summary.duration_seconds = round4(started.elapsed().as_secs_f64());
        Ok(summary)
    }

    /// Builds a snapshot document for the configured window. The document carries enough
    /// provenance (table, window bounds, generation time) for a reader to judge its freshness
    /// without consulting the store.
    pub async fn materialize(&self, params: &SnapshotParams) -> Result<SnapshotDocument, SnapshotError> {
        let months = effective_months(params.months);
        let from = window_start(months);
        info!("📸️ Materializing {}.{} from {from}", params.table, params.date_field);
        let rows = self.db.window_rows(&params.table, &params.date_field, &from).await?;
        let data = if params.group_by_reference {
            SnapshotData::Groups(group_by_reference(rows, &params.date_field))
        } else {
            SnapshotData::Rows(rows)
        };
        Ok(SnapshotDocument {
            ok: true,
            generated_at: Local::now().format(DATE_FORMAT).to_string(),
            table: params.table.clone(),
            date_field: params.date_field.clone(),
            months,
            from,
            count: data.len(),
            data,
        })
    }
}

pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
