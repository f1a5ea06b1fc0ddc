//! Orion Sync Engine
//!
//! The Orion sync engine reconciles order records pulled from a remote shop feed against the
//! local shipment history store, and materializes windowed views of that store as JSON snapshot
//! files for the report front end.
//!
//! The library is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. Callers
//!    should not need to touch the low-level query functions; the [`SyncDatabase`] trait is the
//!    surface the rest of the pipeline programs against.
//! 2. The pure pipeline stages: [`mod@normalize`] projects raw feed records into store fields,
//!    and [`mod@classify`] derives marketplace labels from order state and payment text. Both are
//!    plain functions with no I/O, so the reconciliation loop stays deterministic per batch.
//! 3. The engine public API ([`mod@sync_api`] and [`mod@materialize`]): [`SyncApi`] wraps a
//!    backend with duration accounting for reconciliation runs and builds/persists
//!    [`materialize::SnapshotDocument`]s atomically.
pub mod classify;
pub mod db_types;
pub mod errors;
pub mod materialize;
pub mod normalize;
mod sync_api;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use sync_api::SyncApi;
pub use traits::SyncDatabase;
