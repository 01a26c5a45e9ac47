use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ReportType;

/// The `reports` table. Immutable scan event ledger: one row per committed
/// scan transaction, denormalizing display names for query efficiency.
/// Rows are never updated or deleted by normal operation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub report_type: ReportType,

    pub item_id: Uuid,
    pub item_unique_id: String,
    pub quantity: i32,
    pub lot_id: String,
    pub gate_id: Option<String>,
    pub location: Option<String>,

    pub customer_name: String,
    pub part_name: String,
    pub po_number: String,

    pub actor_id: Uuid,
    pub actor_name: String,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
