use clap::{Args, Parser, Subcommand};
use log::*;
use orion_sync_engine::{
    sqlite::db::{create_database_if_missing, db_url, run_migrations},
    SqliteDatabase,
    SyncApi,
};
use presta_feed::FeedConfig;

mod config;
mod jobs;
mod reports;

use config::Settings;
use jobs::{run_all, run_import, run_snapshot, run_update};
use reports::RunReport;

#[derive(Parser, Debug)]
#[command(version = "0.1.0", about = "Orion order synchronization pipeline")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the order feed and insert previously unseen orders
    #[clap(name = "import")]
    Import(FeedJobParams),
    /// Fetch the order feed and refresh orders that already exist
    #[clap(name = "update")]
    Update(FeedJobParams),
    /// Write the windowed orders snapshot file
    #[clap(name = "snapshot-orders")]
    SnapshotOrders,
    /// Write the grouped shipping-cost snapshot file
    #[clap(name = "snapshot-costs")]
    SnapshotCosts,
    /// Import new orders, then refresh both snapshots
    #[clap(name = "run-all")]
    RunAll(FeedJobParams),
}

#[derive(Debug, Args)]
pub struct FeedJobParams {
    /// Override the feed URL from the environment
    #[arg(short = 'u', long = "url")]
    url: Option<String>,
    /// Leave the marketplace columns untouched for this run
    #[arg(long = "no-classify")]
    no_classify: bool,
}

impl FeedJobParams {
    fn feed_config(&self) -> FeedConfig {
        let mut config = FeedConfig::new_from_env_or_default();
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        config
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = Arguments::parse();
    let settings = Settings::new_from_env_or_default();

    let db = match prepare_store().await {
        Ok(db) => db,
        Err(e) => {
            // The store is a precondition for every job; report the failure in the same JSON
            // shape the jobs use so cron wrappers only need one parser.
            let report = RunReport::new("startup").failed(e, 0.0);
            println!("{}", to_json(&report));
            std::process::exit(1);
        },
    };
    let api = SyncApi::new(db);

    let success = match args.command {
        Command::Import(params) => {
            let report = run_import(&api, params.feed_config(), !params.no_classify).await;
            println!("{}", to_json(&report));
            report.success
        },
        Command::Update(params) => {
            let report = run_update(&api, params.feed_config(), !params.no_classify).await;
            println!("{}", to_json(&report));
            report.success
        },
        Command::SnapshotOrders => {
            let report = run_snapshot(&api, &settings.orders_snapshot, "snapshot-orders").await;
            println!("{}", to_json(&report));
            report.success
        },
        Command::SnapshotCosts => {
            let report = run_snapshot(&api, &settings.costs_snapshot, "snapshot-costs").await;
            println!("{}", to_json(&report));
            report.success
        },
        Command::RunAll(params) => {
            let report = run_all(&api, params.feed_config(), !params.no_classify, &settings).await;
            println!("{}", to_json(&report));
            report.success
        },
    };
    std::process::exit(if success { 0 } else { 1 });
}

async fn prepare_store() -> anyhow::Result<SqliteDatabase> {
    let url = db_url();
    create_database_if_missing(&url).await?;
    let db = SqliteDatabase::new_with_url(&url, 5).await?;
    run_migrations(db.pool()).await?;
    debug!("🗃️ Store ready at {url}");
    Ok(db)
}

fn to_json<T: serde::Serialize>(report: &T) -> String {
    serde_json::to_string(report).unwrap_or_else(|e| format!(r#"{{"success":false,"error":"{e}"}}"#))
}
