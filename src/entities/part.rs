use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The `parts` table. Catalog entry owned by a customer; mirrors the number
/// of its most recently associated purchase order.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "parts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub part_number: String,
    pub name: String,
    pub customer_id: Uuid,

    /// Supplier identifiers used when generating item unique ids.
    pub supplier_id: String,
    pub supplier_part_number: String,

    /// Denormalized PO number mirror; written only by the sync engine.
    pub po_number: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
