mod support;

use chrono::{Duration, Local, Months};
use orion_sync_engine::{
    errors::SnapshotError,
    materialize::{write_snapshot, SnapshotData, SnapshotParams, DATE_FORMAT},
    sqlite::SqliteDatabase,
    SyncApi,
};
use serde_json::Value;
use support::{prepare_test_env, random_db_path};

fn days_ago(days: i64) -> String {
    (Local::now() - Duration::days(days)).format(DATE_FORMAT).to_string()
}

fn months_ago(months: u32) -> String {
    let now = Local::now();
    now.checked_sub_months(Months::new(months)).unwrap_or(now).format(DATE_FORMAT).to_string()
}

async fn seed_shipment(db: &SqliteDatabase, reference: &str, date_add: &str) {
    sqlx::query("INSERT INTO his_envios (reference, canal, date_add) VALUES ($1, 'ORION', $2)")
        .bind(reference)
        .bind(date_add)
        .execute(db.pool())
        .await
        .unwrap();
}

async fn seed_cost(db: &SqliteDatabase, reference: Option<&str>, cost: f64, date_add: &str) {
    sqlx::query(
        "INSERT INTO his_envios_estimados (reference, canal, carrier, coste_estimado, date_add) \
         VALUES ($1, 'ORION', 'GLS', $2, $3)",
    )
    .bind(reference)
    .bind(cost)
    .bind(date_add)
    .execute(db.pool())
    .await
    .unwrap();
}

fn orders_params(months: i64) -> SnapshotParams {
    SnapshotParams {
        table: "his_envios".to_string(),
        date_field: "date_add".to_string(),
        months,
        group_by_reference: false,
    }
}

#[tokio::test]
async fn flat_snapshot_windows_and_orders_rows() {
    let url = random_db_path();
    let db = prepare_test_env(&url).await;
    seed_shipment(&db, "PED-OLD", &months_ago(5)).await;
    seed_shipment(&db, "PED-A", &days_ago(10)).await;
    seed_shipment(&db, "PED-B", &days_ago(2)).await;

    let api = SyncApi::new(db);
    let document = api.materialize(&orders_params(3)).await.unwrap();
    assert!(document.ok);
    assert_eq!(document.months, 3);
    assert_eq!(document.table, "his_envios");
    assert_eq!(document.count, 2);
    match &document.data {
        SnapshotData::Rows(rows) => {
            // Newest first; the five-month-old row falls outside the window.
            assert_eq!(rows[0]["reference"], Value::from("PED-B"));
            assert_eq!(rows[1]["reference"], Value::from("PED-A"));
            assert!(rows[0]["date_add"].as_str().unwrap() >= document.from.as_str());
        },
        SnapshotData::Groups(_) => panic!("expected flat rows"),
    }
}

#[tokio::test]
async fn non_positive_months_fall_back_to_the_default_window() {
    let url = random_db_path();
    let db = prepare_test_env(&url).await;
    seed_shipment(&db, "PED-A", &days_ago(1)).await;

    let api = SyncApi::new(db);
    let document = api.materialize(&orders_params(0)).await.unwrap();
    assert_eq!(document.months, 3);
    assert_eq!(document.count, 1);
}

#[tokio::test]
async fn grouped_snapshot_aggregates_costs_by_reference() {
    let url = random_db_path();
    let db = prepare_test_env(&url).await;
    let (oldest, newest, middle, latest) = (days_ago(20), days_ago(5), days_ago(10), days_ago(1));
    seed_cost(&db, Some("PED-A"), 4.5, &oldest).await;
    seed_cost(&db, Some("PED-A"), 5.0, &newest).await;
    seed_cost(&db, Some("PED-B"), 3.2, &middle).await;
    seed_cost(&db, None, 1.0, &latest).await;

    let api = SyncApi::new(db);
    let params = SnapshotParams {
        table: "his_envios_estimados".to_string(),
        date_field: "date_add".to_string(),
        months: 3,
        group_by_reference: true,
    };
    let document = api.materialize(&params).await.unwrap();
    assert_eq!(document.count, 3);
    match &document.data {
        SnapshotData::Groups(groups) => {
            // Groups sort by their newest row, so the null-reference cost row leads.
            assert_eq!(groups[0].reference, None);
            assert_eq!(groups[1].reference.as_deref(), Some("PED-A"));
            assert_eq!(groups[1].count, 2);
            assert_eq!(groups[1].date_add_min.as_deref(), Some(oldest.as_str()));
            assert_eq!(groups[1].date_add_max.as_deref(), Some(newest.as_str()));
            assert_eq!(groups[2].reference.as_deref(), Some("PED-B"));
            assert_eq!(groups[2].items.len(), 1);
        },
        SnapshotData::Rows(_) => panic!("expected grouped data"),
    }
}

#[tokio::test]
async fn snapshot_documents_round_trip_through_the_atomic_writer() {
    let url = random_db_path();
    let db = prepare_test_env(&url).await;
    seed_shipment(&db, "PED-A", &days_ago(1)).await;

    let api = SyncApi::new(db);
    let document = api.materialize(&orders_params(3)).await.unwrap();
    let dir = std::env::temp_dir().join(format!("orion_snapshots_{}", rand::random::<u64>()));
    let target = dir.join("pedidos-bd.json");
    let bytes = write_snapshot(&document, &target).unwrap();

    let content = std::fs::read_to_string(&target).unwrap();
    assert_eq!(content.len() as u64, bytes);
    let parsed: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed["ok"], Value::Bool(true));
    assert_eq!(parsed["count"], Value::from(1));
    assert_eq!(parsed["data"][0]["reference"], Value::from("PED-A"));
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn malicious_identifiers_are_rejected_before_querying() {
    let url = random_db_path();
    let db = prepare_test_env(&url).await;
    let api = SyncApi::new(db);

    let mut params = orders_params(3);
    params.table = "his_envios; DROP TABLE his_envios".to_string();
    let err = api.materialize(&params).await.unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidIdentifier { kind: "table", .. }));

    let mut params = orders_params(3);
    params.date_field = "date_add--".to_string();
    let err = api.materialize(&params).await.unwrap_err();
    assert!(matches!(err, SnapshotError::InvalidIdentifier { kind: "date field", .. }));
}
