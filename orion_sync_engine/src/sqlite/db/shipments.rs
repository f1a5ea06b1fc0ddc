use std::collections::HashSet;

use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::db_types::{NewShipment, ShipmentRow};

/// Membership lookups are chunked to stay under the backend's bound-parameter limit.
pub const MAX_REFS_PER_QUERY: usize = 200;

/// Returns which of the given references already have a row in `his_envios`. This is a
/// set-membership lookup, not a full-row fetch.
pub async fn existing_references(
    refs: &[String],
    conn: &mut SqliteConnection,
) -> Result<HashSet<String>, sqlx::Error> {
    let mut known = HashSet::with_capacity(refs.len());
    for chunk in refs.chunks(MAX_REFS_PER_QUERY) {
        let mut builder = QueryBuilder::new("SELECT reference FROM his_envios WHERE reference IN (");
        let mut values = builder.separated(", ");
        for reference in chunk {
            values.push_bind(reference);
        }
        builder.push(")");
        let rows: Vec<(String,)> = builder.build_query_as().fetch_all(&mut *conn).await?;
        known.extend(rows.into_iter().map(|(r,)| r));
    }
    trace!("📦️ {} of {} batch references already present in the store", known.len(), refs.len());
    Ok(known)
}

/// Inserts a new shipment history row. This is not atomic on its own; the reconciliation engine
/// embeds it in a transaction by passing `&mut *tx` as the connection argument.
pub async fn insert_shipment(shipment: &NewShipment, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO his_envios (
                reference,
                canal,
                date_prestashop,
                cod_pais,
                poblacion,
                cp,
                importe_total_con_iva,
                marketplace,
                marketplace_tipo
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(&shipment.reference)
    .bind(&shipment.canal)
    .bind(&shipment.date_prestashop)
    .bind(&shipment.cod_pais)
    .bind(&shipment.poblacion)
    .bind(&shipment.cp)
    .bind(shipment.importe_total_con_iva)
    .bind(&shipment.marketplace)
    .bind(&shipment.marketplace_tipo)
    .execute(conn)
    .await?;
    Ok(())
}

/// Updates the row matching `shipment.reference`, re-stamping the channel tag and overwriting the
/// enumerated shipping/financial fields. Never creates a row. The marketplace columns are only
/// touched when `with_marketplace` is set (i.e. the run had classification enabled).
pub async fn update_shipment(
    shipment: &NewShipment,
    with_marketplace: bool,
    conn: &mut SqliteConnection,
) -> Result<u64, sqlx::Error> {
    let result = if with_marketplace {
        sqlx::query(
            r#"
                UPDATE his_envios SET
                    canal = $1,
                    date_prestashop = $2,
                    cod_pais = $3,
                    poblacion = $4,
                    cp = $5,
                    importe_total_con_iva = $6,
                    marketplace = $7,
                    marketplace_tipo = $8
                WHERE reference = $9
            "#,
        )
        .bind(&shipment.canal)
        .bind(&shipment.date_prestashop)
        .bind(&shipment.cod_pais)
        .bind(&shipment.poblacion)
        .bind(&shipment.cp)
        .bind(shipment.importe_total_con_iva)
        .bind(&shipment.marketplace)
        .bind(&shipment.marketplace_tipo)
        .bind(&shipment.reference)
        .execute(conn)
        .await?
    } else {
        sqlx::query(
            r#"
                UPDATE his_envios SET
                    canal = $1,
                    date_prestashop = $2,
                    cod_pais = $3,
                    poblacion = $4,
                    cp = $5,
                    importe_total_con_iva = $6
                WHERE reference = $7
            "#,
        )
        .bind(&shipment.canal)
        .bind(&shipment.date_prestashop)
        .bind(&shipment.cod_pais)
        .bind(&shipment.poblacion)
        .bind(&shipment.cp)
        .bind(shipment.importe_total_con_iva)
        .bind(&shipment.reference)
        .execute(conn)
        .await?
    };
    Ok(result.rows_affected())
}

pub async fn fetch_shipment_by_reference(
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<ShipmentRow>, sqlx::Error> {
    let row = sqlx::query_as("SELECT * FROM his_envios WHERE reference = $1")
        .bind(reference)
        .fetch_optional(conn)
        .await?;
    Ok(row)
}

pub async fn count_shipments(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM his_envios").fetch_one(conn).await?;
    Ok(count)
}
