use std::{env, path::PathBuf};

use log::warn;
use orion_sync_engine::materialize::SnapshotParams;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_ORDERS_TABLE: &str = "his_envios";
pub const DEFAULT_COSTS_TABLE: &str = "his_envios_estimados";
pub const DEFAULT_DATE_FIELD: &str = "date_add";
pub const DEFAULT_WINDOW_MONTHS: i64 = 3;

/// One snapshot job: the windowed query parameters and the file the document lands in.
#[derive(Debug, Clone)]
pub struct SnapshotSettings {
    pub params: SnapshotParams,
    pub target: PathBuf,
}

/// Operator configuration for the pipeline jobs, resolved from `ORION_*` environment variables
/// with working defaults for a local setup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub orders_snapshot: SnapshotSettings,
    pub costs_snapshot: SnapshotSettings,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = PathBuf::from(DEFAULT_DATA_DIR);
        Self {
            orders_snapshot: SnapshotSettings {
                params: SnapshotParams {
                    table: DEFAULT_ORDERS_TABLE.to_string(),
                    date_field: DEFAULT_DATE_FIELD.to_string(),
                    months: DEFAULT_WINDOW_MONTHS,
                    group_by_reference: false,
                },
                target: data_dir.join("pedidos-bd.json"),
            },
            costs_snapshot: SnapshotSettings {
                params: SnapshotParams {
                    table: DEFAULT_COSTS_TABLE.to_string(),
                    date_field: DEFAULT_DATE_FIELD.to_string(),
                    months: DEFAULT_WINDOW_MONTHS,
                    group_by_reference: true,
                },
                target: data_dir.join("costes-bd.json"),
            },
            data_dir,
        }
    }
}

impl Settings {
    pub fn new_from_env_or_default() -> Self {
        let mut settings = Settings::default();
        if let Ok(dir) = env::var("ORION_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
            settings.orders_snapshot.target = settings.data_dir.join("pedidos-bd.json");
            settings.costs_snapshot.target = settings.data_dir.join("costes-bd.json");
        }
        read_snapshot_env(&mut settings.orders_snapshot, "ORION_ORDERS");
        read_snapshot_env(&mut settings.costs_snapshot, "ORION_COSTS");
        settings
    }
}

fn read_snapshot_env(snapshot: &mut SnapshotSettings, prefix: &str) {
    if let Ok(table) = env::var(format!("{prefix}_TABLE")) {
        snapshot.params.table = table;
    }
    if let Ok(field) = env::var(format!("{prefix}_DATE_FIELD")) {
        snapshot.params.date_field = field;
    }
    if let Ok(months) = env::var(format!("{prefix}_MONTHS")) {
        match months.parse::<i64>() {
            Ok(months) => snapshot.params.months = months,
            Err(_) => warn!("{prefix}_MONTHS is not a number ({months}). Using {}.", snapshot.params.months),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_point_at_the_local_data_dir() {
        let settings = Settings::default();
        assert_eq!(settings.orders_snapshot.target, PathBuf::from("data/pedidos-bd.json"));
        assert_eq!(settings.costs_snapshot.target, PathBuf::from("data/costes-bd.json"));
        assert_eq!(settings.orders_snapshot.params.months, 3);
        assert!(!settings.orders_snapshot.params.group_by_reference);
        assert!(settings.costs_snapshot.params.group_by_reference);
    }
}
