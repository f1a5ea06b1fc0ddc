use std::sync::OnceLock;

use log::trace;
use regex::Regex;
use serde_json::{Map, Value};
use sqlx::{sqlite::SqliteRow, Column, Row, SqliteConnection, TypeInfo, ValueRef};

use crate::errors::SnapshotError;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z0-9_]+$").expect("identifier pattern is a valid regex"))
}

/// Allow-list check for the two dynamic identifiers (table and date column) that get embedded in
/// the window query. These come from operator configuration, never from request input, but they
/// are still validated before interpolation.
pub fn check_identifier(kind: &'static str, value: &str) -> Result<(), SnapshotError> {
    if identifier_pattern().is_match(value) {
        Ok(())
    } else {
        Err(SnapshotError::InvalidIdentifier { kind, value: value.to_string() })
    }
}

/// Fetches the whole window in one query, newest first. No pagination; the caller materializes
/// the full result.
pub async fn window_rows(
    table: &str,
    date_field: &str,
    from: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Value>, SnapshotError> {
    check_identifier("table", table)?;
    check_identifier("date field", date_field)?;
    let sql = format!("SELECT * FROM {table} WHERE {date_field} >= $1 ORDER BY {date_field} DESC");
    trace!("📸️ Executing window query: {sql}");
    let rows = sqlx::query(&sql).bind(from).fetch_all(conn).await?;
    Ok(rows.iter().map(row_to_json).collect())
}

/// Decodes a dynamic row into a JSON object, column by column. Values that cannot be decoded into
/// a JSON-representable type become null rather than failing the snapshot.
pub fn row_to_json(row: &SqliteRow) -> Value {
    let mut object = Map::with_capacity(row.columns().len());
    for column in row.columns() {
        let idx = column.ordinal();
        let value = match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => Value::Null,
            Ok(raw) => match raw.type_info().name() {
                "INTEGER" => row.try_get::<i64, _>(idx).map(Value::from).unwrap_or(Value::Null),
                "REAL" => row
                    .try_get::<f64, _>(idx)
                    .ok()
                    .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
                    .unwrap_or(Value::Null),
                _ => row.try_get::<String, _>(idx).map(Value::from).unwrap_or(Value::Null),
            },
            Err(_) => Value::Null,
        };
        object.insert(column.name().to_string(), value);
    }
    Value::Object(object)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identifiers_must_match_the_allow_list() {
        assert!(check_identifier("table", "his_envios").is_ok());
        assert!(check_identifier("table", "His_Envios_2024").is_ok());
        assert!(check_identifier("table", "his_envios; DROP TABLE his_envios").is_err());
        assert!(check_identifier("date field", "date_add").is_ok());
        assert!(check_identifier("date field", "date-add").is_err());
        assert!(check_identifier("date field", "").is_err());
        assert!(check_identifier("table", "`his_envios`").is_err());
    }
}
