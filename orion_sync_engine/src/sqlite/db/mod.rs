//! # SQLite database methods
//!
//! This module contains the low-level SQLite interactions.
//!
//! All of these are simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool, or create an
//! atomic transaction as the need arises and call through to the functions without any other
//! changes.
use std::{env, path::Path};

use log::info;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Error as SqlxError, Sqlite, SqlitePool};

pub mod shipments;
pub mod snapshots;

const SQLITE_DB_URL: &str = "sqlite://data/orion_store.db";

pub fn db_url() -> String {
    let result = env::var("ORION_DATABASE_URL").unwrap_or_else(|_| {
        info!("ORION_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

/// Creates the database file (and its parent directory) when it does not exist yet. A no-op for
/// databases that are already present.
pub async fn create_database_if_missing(url: &str) -> Result<(), SqlxError> {
    if Sqlite::database_exists(url).await.unwrap_or(false) {
        return Ok(());
    }
    if let Some(path) = url.strip_prefix("sqlite://") {
        if let Some(dir) = Path::new(path).parent() {
            if !dir.as_os_str().is_empty() {
                let _ = std::fs::create_dir_all(dir);
            }
        }
    }
    Sqlite::create_database(url).await?;
    info!("Created SQLite database at {url}");
    Ok(())
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./src/sqlite/migrations").run(pool).await
}
