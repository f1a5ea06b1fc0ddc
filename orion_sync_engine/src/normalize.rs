//! Projection of raw feed records into the fixed field set of the shipment store.
//!
//! The feed gives no typing guarantees, so each field is accepted only when it has the expected
//! shape and becomes NULL otherwise. A record without a usable reference is dropped silently;
//! that is filtering policy, not an error.
use serde_json::Value;

use crate::{
    classify::classify,
    db_types::{NewShipment, CHANNEL_TAG},
};
use presta_feed::OrderRecord;

/// The fields of one feed record after type policy has been applied, plus the classification
/// inputs carried through for the optional classification step.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOrder {
    pub reference: String,
    pub date_add: Option<String>,
    pub cod_pais: Option<String>,
    pub poblacion: Option<String>,
    pub cp: Option<String>,
    pub importe_total_con_iva: Option<f64>,
    pub state_name: Option<String>,
    pub payment: Option<String>,
}

impl NormalizedOrder {
    /// Builds the row to write. When `classify` is set the marketplace labels are derived from
    /// the state/payment text; otherwise the marketplace columns stay null.
    pub fn to_shipment(&self, classify_record: bool) -> NewShipment {
        let (marketplace, marketplace_tipo) = if classify_record {
            let (m, t) = classify(self.state_name.as_deref(), self.payment.as_deref());
            (Some(m.to_string()), Some(t.to_string()))
        } else {
            (None, None)
        };
        NewShipment {
            reference: self.reference.clone(),
            canal: CHANNEL_TAG.to_string(),
            date_prestashop: self.date_add.clone(),
            cod_pais: self.cod_pais.clone(),
            poblacion: self.poblacion.clone(),
            cp: self.cp.clone(),
            importe_total_con_iva: self.importe_total_con_iva,
            marketplace,
            marketplace_tipo,
        }
    }
}

/// Projects a raw order into [`NormalizedOrder`], or `None` when the record has no usable
/// reference (absent, non-string, or empty).
pub fn normalize(order: &OrderRecord) -> Option<NormalizedOrder> {
    let reference = order.reference.as_str().filter(|r| !r.is_empty())?.to_string();
    let date_add = string_field(&order.date_add);
    // Shipping sub-fields are only read when `shipping` is itself an object. Anything else
    // (string, number, null) nulls all three; there is no partial extraction.
    let (cod_pais, poblacion, cp) = match order.shipping.as_object() {
        Some(shipping) => (
            shipping.get("country_iso_code").and_then(Value::as_str).map(str::to_string),
            shipping.get("city").and_then(Value::as_str).map(str::to_string),
            shipping.get("postcode").and_then(Value::as_str).map(str::to_string),
        ),
        None => (None, None, None),
    };
    let importe_total_con_iva = numeric_field(&order.total_paid_tax_incl);
    Some(NormalizedOrder {
        reference,
        date_add,
        cod_pais,
        poblacion,
        cp,
        importe_total_con_iva,
        state_name: string_field(&order.current_state_name),
        payment: string_field(&order.payment),
    })
}

fn string_field(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

/// Accepts integers, floats, and numeric strings, coerced to f64. Everything else is NULL.
fn numeric_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
