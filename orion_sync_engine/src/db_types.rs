use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Every row written by this pipeline is stamped with this channel tag, identifying the
/// integration that produced it.
pub const CHANNEL_TAG: &str = "ORION";

//--------------------------------------   ReconcileMode   -----------------------------------------------------------

/// The two write modes of the reconciliation engine.
///
/// `InsertOnly` creates rows for previously unseen references and skips known ones.
/// `UpdateOnly` overwrites rows for known references and never creates rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileMode {
    InsertOnly,
    UpdateOnly,
}

impl Display for ReconcileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileMode::InsertOnly => write!(f, "insert_only"),
            ReconcileMode::UpdateOnly => write!(f, "update_only"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    pub mode: ReconcileMode,
    /// When set, the marketplace classifier runs over each record and its labels are written
    /// alongside the normalized fields. Feeds that do not carry the classification inputs leave
    /// this off and the marketplace columns stay null.
    pub classify: bool,
}

impl ReconcileOptions {
    pub fn insert_only() -> Self {
        Self { mode: ReconcileMode::InsertOnly, classify: false }
    }

    pub fn update_only() -> Self {
        Self { mode: ReconcileMode::UpdateOnly, classify: false }
    }

    pub fn with_classification(mut self) -> Self {
        self.classify = true;
        self
    }
}

//--------------------------------------  ReconcileSummary  ----------------------------------------------------------

/// Counts for one reconciliation run. Exactly one of the insert pair / update pair is meaningful
/// depending on the mode; the other stays zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ReconcileSummary {
    pub inserted: u64,
    pub updated: u64,
    pub skipped_existing: u64,
    pub skipped_not_found: u64,
    /// Wall-clock seconds for the whole reconcile call, stamped by [`crate::SyncApi`].
    pub duration_seconds: f64,
}

//--------------------------------------    NewShipment    -----------------------------------------------------------

/// A shipment history row about to be written. Nullable fields mirror the permissive feed: a
/// missing or wrong-typed source field becomes NULL rather than an error.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShipment {
    pub reference: String,
    pub canal: String,
    pub date_prestashop: Option<String>,
    pub cod_pais: Option<String>,
    pub poblacion: Option<String>,
    pub cp: Option<String>,
    pub importe_total_con_iva: Option<f64>,
    pub marketplace: Option<String>,
    pub marketplace_tipo: Option<String>,
}

//--------------------------------------    ShipmentRow    -----------------------------------------------------------

/// A persisted row of `his_envios`. `reference` is the unique business key; at most one row per
/// reference ever exists and rows are never deleted by this pipeline.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShipmentRow {
    pub id: i64,
    pub reference: String,
    pub canal: String,
    pub date_prestashop: Option<String>,
    pub cod_pais: Option<String>,
    pub poblacion: Option<String>,
    pub cp: Option<String>,
    pub importe_total_con_iva: Option<f64>,
    pub marketplace: Option<String>,
    pub marketplace_tipo: Option<String>,
    pub date_add: NaiveDateTime,
}
