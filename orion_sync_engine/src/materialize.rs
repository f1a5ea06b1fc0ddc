//! Snapshot materialization.
//!
//! A snapshot is a point-in-time JSON document of one windowed store query, written to a fixed
//! path for the report views to read. The write is atomic: the document goes to a temporary file
//! first and is renamed over the target, so readers never observe a torn file and a failed run
//! leaves the previous snapshot intact.
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{Local, Months};
use log::*;
use serde::Serialize;
use serde_json::Value;

use crate::errors::SnapshotError;

/// Window length applied when the configured month count is zero or negative.
pub const DEFAULT_WINDOW_MONTHS: u32 = 3;

/// Fixed-width, lexicographically sortable timestamp format. The grouping min/max comparison
/// relies on this property.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct SnapshotParams {
    pub table: String,
    pub date_field: String,
    pub months: i64,
    pub group_by_reference: bool,
}

#[derive(Debug, Serialize)]
pub struct SnapshotDocument {
    pub ok: bool,
    pub generated_at: String,
    pub table: String,
    pub date_field: String,
    pub months: u32,
    pub from: String,
    pub count: usize,
    pub data: SnapshotData,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SnapshotData {
    Rows(Vec<Value>),
    Groups(Vec<CostGroup>),
}

impl SnapshotData {
    pub fn len(&self) -> usize {
        match self {
            SnapshotData::Rows(rows) => rows.len(),
            SnapshotData::Groups(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All rows sharing one reference, with the row count and the min/max of the date field. Rows
/// with a missing or empty reference collect under the null-reference group.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CostGroup {
    pub reference: Option<String>,
    pub count: usize,
    pub date_add_min: Option<String>,
    pub date_add_max: Option<String>,
    pub items: Vec<Value>,
}

pub fn effective_months(months: i64) -> u32 {
    if months <= 0 {
        DEFAULT_WINDOW_MONTHS
    } else {
        months as u32
    }
}

/// Lower bound of the window: local now minus `months` calendar months.
pub fn window_start(months: u32) -> String {
    let now = Local::now();
    let from = now.checked_sub_months(Months::new(months)).unwrap_or(now);
    from.format(DATE_FORMAT).to_string()
}

/// Groups rows by their `reference` field, then sorts the groups by max date descending.
/// Comparison of date strings is lexicographic, which is valid for the fixed-width format the
/// store uses.
pub fn group_by_reference(rows: Vec<Value>, date_field: &str) -> Vec<CostGroup> {
    let mut insertion_order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, CostGroup> = HashMap::new();
    for row in rows {
        let reference = row
            .get("reference")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        // The empty string keys the null-reference bucket.
        let key = reference.clone().unwrap_or_default();
        let group = buckets.entry(key.clone()).or_insert_with(|| {
            insertion_order.push(key.clone());
            CostGroup { reference, count: 0, date_add_min: None, date_add_max: None, items: Vec::new() }
        });
        group.count += 1;
        let date = row.get(date_field).and_then(Value::as_str).filter(|d| !d.is_empty()).map(str::to_string);
        if let Some(date) = date {
            if group.date_add_min.as_deref().map_or(true, |min| date.as_str() < min) {
                group.date_add_min = Some(date.clone());
            }
            if group.date_add_max.as_deref().map_or(true, |max| date.as_str() > max) {
                group.date_add_max = Some(date);
            }
        }
        group.items.push(row);
    }
    let mut groups: Vec<CostGroup> =
        insertion_order.into_iter().filter_map(|key| buckets.remove(&key)).collect();
    // Descending by max date; groups with no date at all sort last.
    groups.sort_by(|a, b| b.date_add_max.cmp(&a.date_add_max));
    groups
}

/// Serializes the document and writes it atomically: temp file first, then rename over the
/// target. Returns the number of bytes written. A failed rename removes the temp file and leaves
/// whatever was at the target untouched.
pub fn write_snapshot(document: &SnapshotDocument, target: &Path) -> Result<u64, SnapshotError> {
    let json = serde_json::to_string(document)?;
    if let Some(dir) = target.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .map_err(|e| SnapshotError::Persistence(format!("could not create {}: {e}", dir.display())))?;
        }
    }
    let mut tmp = target.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json.as_bytes())
        .map_err(|e| SnapshotError::Persistence(format!("could not write temp file {}: {e}", tmp.display())))?;
    if let Err(e) = fs::rename(&tmp, target) {
        let _ = fs::remove_file(&tmp);
        return Err(SnapshotError::Persistence(format!(
            "could not move {} to {}: {e}",
            tmp.display(),
            target.display()
        )));
    }
    debug!("📸️ Snapshot written to {} ({} bytes, {} entries)", target.display(), json.len(), document.count);
    Ok(json.len() as u64)
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn grouping_tracks_count_and_date_extremes() {
        let rows = vec![
            json!({"reference": "A", "date_add": "2024-01-01"}),
            json!({"reference": "A", "date_add": "2024-03-01"}),
            json!({"reference": "B", "date_add": "2024-02-01"}),
        ];
        let groups = group_by_reference(rows, "date_add");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].reference.as_deref(), Some("A"));
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].date_add_min.as_deref(), Some("2024-01-01"));
        assert_eq!(groups[0].date_add_max.as_deref(), Some("2024-03-01"));
        assert_eq!(groups[1].reference.as_deref(), Some("B"));
        assert_eq!(groups[1].count, 1);
    }

    #[test]
    fn empty_references_bucket_under_the_null_group() {
        let rows = vec![
            json!({"reference": "", "date_add": "2024-05-01"}),
            json!({"date_add": "2024-05-02"}),
            json!({"reference": "  ", "date_add": "2024-05-03"}),
        ];
        let groups = group_by_reference(rows, "date_add");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].reference, None);
        assert_eq!(groups[0].count, 3);
        assert_eq!(groups[0].items.len(), 3);
    }

    #[test]
    fn rows_without_dates_leave_extremes_null_and_sort_last() {
        let rows = vec![
            json!({"reference": "X"}),
            json!({"reference": "Y", "date_add": "2024-04-01"}),
        ];
        let groups = group_by_reference(rows, "date_add");
        assert_eq!(groups[0].reference.as_deref(), Some("Y"));
        assert_eq!(groups[1].reference.as_deref(), Some("X"));
        assert_eq!(groups[1].date_add_min, None);
        assert_eq!(groups[1].date_add_max, None);
    }

    #[test]
    fn months_coercion() {
        assert_eq!(effective_months(0), DEFAULT_WINDOW_MONTHS);
        assert_eq!(effective_months(-5), DEFAULT_WINDOW_MONTHS);
        assert_eq!(effective_months(6), 6);
    }

    #[test]
    fn window_start_is_sortable_format() {
        let from = window_start(3);
        assert_eq!(from.len(), 19);
        assert!(from < window_start(0));
    }

    fn doc(data: SnapshotData) -> SnapshotDocument {
        let count = data.len();
        SnapshotDocument {
            ok: true,
            generated_at: "2024-06-12 10:00:00".to_string(),
            table: "his_envios".to_string(),
            date_field: "date_add".to_string(),
            months: 3,
            from: "2024-03-12 10:00:00".to_string(),
            count,
            data,
        }
    }

    #[test]
    fn write_is_atomic_and_replaces_previous_content() {
        let dir = std::env::temp_dir().join(format!("orion_snap_{}", rand::random::<u64>()));
        let target = dir.join("pedidos-bd.json");
        let first = doc(SnapshotData::Rows(vec![json!({"reference": "A"})]));
        let bytes = write_snapshot(&first, &target).unwrap();
        assert!(bytes > 0);
        assert!(target.exists());
        assert!(!dir.join("pedidos-bd.json.tmp").exists());

        let second = doc(SnapshotData::Rows(vec![json!({"reference": "A"}), json!({"reference": "B"})]));
        write_snapshot(&second, &target).unwrap();
        let content = std::fs::read_to_string(&target).unwrap();
        let parsed: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed["count"], json!(2));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_rename_cleans_temp_and_keeps_target_untouched() {
        let dir = std::env::temp_dir().join(format!("orion_snap_{}", rand::random::<u64>()));
        // A directory at the target path makes the rename fail.
        let target = dir.join("pedidos-bd.json");
        std::fs::create_dir_all(&target).unwrap();
        let err = write_snapshot(&doc(SnapshotData::Rows(vec![])), &target).unwrap_err();
        assert!(matches!(err, SnapshotError::Persistence(_)));
        assert!(!dir.join("pedidos-bd.json.tmp").exists());
        assert!(target.is_dir());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn grouped_documents_serialize_with_the_expected_shape() {
        let groups = group_by_reference(vec![json!({"reference": "A", "date_add": "2024-01-01"})], "date_add");
        let document = doc(SnapshotData::Groups(groups));
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["ok"], json!(true));
        assert_eq!(value["data"][0]["reference"], json!("A"));
        assert_eq!(value["data"][0]["count"], json!(1));
        assert_eq!(value["data"][0]["items"][0]["date_add"], json!("2024-01-01"));
    }
}
