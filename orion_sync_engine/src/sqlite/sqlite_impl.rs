//! `SqliteDatabase` is the concrete SQLite backend for the sync engine.
//!
//! It owns a connection pool and implements [`SyncDatabase`]. The pool is created explicitly by
//! the process that runs the pipeline and handed in by reference; nothing here caches a
//! connection in process-global state.
use std::{collections::HashSet, fmt::Debug};

use log::*;
use presta_feed::OrderRecord;
use serde_json::Value;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, shipments, snapshots};
use crate::{
    db_types::{ReconcileMode, ReconcileOptions, ReconcileSummary},
    errors::{SnapshotError, SyncError},
    normalize::normalize,
    traits::SyncDatabase,
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database handle using the URL from the environment (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl SyncDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn reconcile_batch(
        &self,
        batch: &[OrderRecord],
        options: ReconcileOptions,
    ) -> Result<ReconcileSummary, SyncError> {
        let mut summary = ReconcileSummary::default();
        // Records without a usable reference are dropped here, silently. That is feed policy,
        // not an error condition.
        let normalized: Vec<_> = batch.iter().filter_map(normalize).collect();
        let mut seen = HashSet::new();
        let refs: Vec<String> =
            normalized.iter().map(|o| o.reference.clone()).filter(|r| seen.insert(r.clone())).collect();
        if refs.is_empty() {
            debug!("🗃️ Reconcile ({}): no valid references in batch of {}", options.mode, batch.len());
            return Ok(summary);
        }
        // Membership lookup happens before the transaction opens; the known set is then kept
        // up to date in-memory so feed duplicates resolve first-occurrence-wins within the run.
        let mut conn = self.pool.acquire().await?;
        let mut known = shipments::existing_references(&refs, &mut conn).await?;
        drop(conn);

        // One transaction per run. Any error below propagates with `?`, dropping the transaction
        // and rolling back every write this run has made.
        let mut tx = self.pool.begin().await?;
        for order in &normalized {
            match options.mode {
                ReconcileMode::InsertOnly => {
                    if known.contains(&order.reference) {
                        summary.skipped_existing += 1;
                        continue;
                    }
                    let shipment = order.to_shipment(options.classify);
                    shipments::insert_shipment(&shipment, &mut tx).await?;
                    known.insert(order.reference.clone());
                    summary.inserted += 1;
                },
                ReconcileMode::UpdateOnly => {
                    if !known.contains(&order.reference) {
                        summary.skipped_not_found += 1;
                        continue;
                    }
                    let shipment = order.to_shipment(options.classify);
                    shipments::update_shipment(&shipment, options.classify, &mut tx).await?;
                    summary.updated += 1;
                },
            }
        }
        tx.commit().await?;
        debug!(
            "🗃️ Reconcile ({}) committed: inserted={} updated={} skipped_existing={} skipped_not_found={}",
            options.mode, summary.inserted, summary.updated, summary.skipped_existing, summary.skipped_not_found
        );
        Ok(summary)
    }

    async fn window_rows(&self, table: &str, date_field: &str, from: &str) -> Result<Vec<Value>, SnapshotError> {
        let mut conn = self.pool.acquire().await?;
        snapshots::window_rows(table, date_field, from, &mut conn).await
    }

    async fn close(&mut self) -> Result<(), SyncError> {
        self.pool.close().await;
        Ok(())
    }
}
