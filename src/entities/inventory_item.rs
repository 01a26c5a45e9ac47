use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{DeleteRequest, HistoryLog, InventoryStatus};

/// The `inventory_items` table. One row per physical unit (or batch) of a
/// part received against a purchase order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Generated label identifier, e.g. `UML-<part>-<supplier>-<qty>-<lot>/<year>`.
    #[sea_orm(unique)]
    pub unique_id: String,

    /// Optional scanner barcode bound to the physical label.
    pub barcode: Option<String>,

    /// Serialized scan payload as printed into the QR code.
    pub qr_payload: Option<String>,

    /// Opaque encoded label image returned by the rendering collaborator.
    pub qr_label: Option<String>,

    pub part_id: Uuid,
    pub po_id: Uuid,

    /// Denormalized owning PO number, maintained by the sync engine.
    pub po_number: String,

    /// Quantity in this unit/batch, fixed at creation.
    pub quantity: i32,

    pub status: InventoryStatus,
    pub lot_id: String,
    pub gate_id: Option<String>,
    pub location: Option<String>,

    /// Append-only status history; the last entry mirrors `status`.
    #[sea_orm(column_type = "Json")]
    pub history: HistoryLog,

    /// Pending or resolved delete request, if one was ever filed.
    #[sea_orm(column_type = "Json", nullable)]
    pub delete_request: Option<DeleteRequest>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
