use log::*;
use orion_sync_engine::sqlite::{
    db::{create_database_if_missing, run_migrations},
    SqliteDatabase,
};

pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("orion_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn prepare_test_env(url: &str) -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    create_database_if_missing(url).await.expect("Could not create test database");
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating connection pool");
    run_migrations(db.pool()).await.expect("Error running migrations");
    info!("🌟 Test database at {url} ready");
    db
}
