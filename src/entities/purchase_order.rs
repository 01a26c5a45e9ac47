use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PoStatus;

/// The `purchase_orders` table. A commercial order for a quantity of one
/// part from one customer; fulfillment is tracked against it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Globally unique commercial PO number.
    #[sea_orm(unique)]
    pub po_number: String,

    pub part_id: Uuid,
    pub customer_id: Uuid,

    /// Committed quantity; immutable after creation.
    pub total_quantity: i32,

    /// Sum of quantities received against this PO over surviving items.
    /// Never exceeds `total_quantity`.
    pub delivered_quantity: i32,

    pub status: PoStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
