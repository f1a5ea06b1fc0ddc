use std::time::Instant;

use log::*;
use orion_sync_engine::{
    db_types::{ReconcileMode, ReconcileOptions},
    materialize::write_snapshot,
    SyncApi,
    SyncDatabase,
};
use presta_feed::{FeedApi, FeedConfig};

use crate::{
    config::{Settings, SnapshotSettings},
    reports::{round4, MasterReport, RunReport},
};

/// Pulls the order feed and inserts previously unseen references into the shipment history.
pub async fn run_import<B: SyncDatabase>(api: &SyncApi<B>, feed: FeedConfig, classify: bool) -> RunReport {
    reconcile_feed(api, feed, ReconcileMode::InsertOnly, classify, "import").await
}

/// Pulls the order feed and overwrites rows for references that already exist. Never creates.
pub async fn run_update<B: SyncDatabase>(api: &SyncApi<B>, feed: FeedConfig, classify: bool) -> RunReport {
    reconcile_feed(api, feed, ReconcileMode::UpdateOnly, classify, "update").await
}

async fn reconcile_feed<B: SyncDatabase>(
    api: &SyncApi<B>,
    feed: FeedConfig,
    mode: ReconcileMode,
    classify: bool,
    job: &str,
) -> RunReport {
    let started = Instant::now();
    let mut report = RunReport::new(job);
    report.url = Some(feed.url.clone());
    let feed_api = match FeedApi::new(feed) {
        Ok(feed_api) => feed_api,
        Err(e) => return report.failed(e, started.elapsed().as_secs_f64()),
    };
    let orders = match feed_api.fetch_orders().await {
        // An empty feed is a healthy feed with nothing to do.
        Ok(feed) => feed.orders,
        Err(e) => return report.failed(e, started.elapsed().as_secs_f64()),
    };
    match api.reconcile(&orders, ReconcileOptions { mode, classify }).await {
        Ok(summary) => {
            let mut report = report.reconciled(&summary);
            report.duration_seconds = round4(started.elapsed().as_secs_f64());
            report
        },
        Err(e) => report.failed(e, started.elapsed().as_secs_f64()),
    }
}

/// Materializes one windowed snapshot and writes it atomically to its target file.
pub async fn run_snapshot<B: SyncDatabase>(api: &SyncApi<B>, settings: &SnapshotSettings, job: &str) -> RunReport {
    let started = Instant::now();
    let mut report = RunReport::new(job);
    report.file = Some(settings.target.display().to_string());
    let document = match api.materialize(&settings.params).await {
        Ok(document) => document,
        Err(e) => return report.failed(e, started.elapsed().as_secs_f64()),
    };
    match write_snapshot(&document, &settings.target) {
        Ok(bytes) => {
            report.success = true;
            report.records = Some(document.count);
            report.bytes = Some(bytes);
            report.duration_seconds = round4(started.elapsed().as_secs_f64());
            report
        },
        Err(e) => report.failed(e, started.elapsed().as_secs_f64()),
    }
}

/// The master job: import new orders, then refresh both snapshots. Jobs run sequentially and a
/// failure does not stop the later jobs; the aggregate report carries every outcome.
pub async fn run_all<B: SyncDatabase>(
    api: &SyncApi<B>,
    feed: FeedConfig,
    classify: bool,
    settings: &Settings,
) -> MasterReport {
    let started = Instant::now();
    info!("🚀 Running the full pipeline");
    let jobs = vec![
        run_import(api, feed, classify).await,
        run_snapshot(api, &settings.orders_snapshot, "snapshot-orders").await,
        run_snapshot(api, &settings.costs_snapshot, "snapshot-costs").await,
    ];
    MasterReport::new(jobs, started.elapsed().as_secs_f64())
}
