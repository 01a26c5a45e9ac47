use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CustomerStatus, DeleteRequest, PoNumberSet};

/// The `customers` table. Owns parts and purchase orders; carries the set of
/// PO numbers referencing it and its own delete-request lifecycle.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,
    pub code: String,

    /// PO numbers of all non-deleted POs referencing this customer; written
    /// only by the sync engine.
    #[sea_orm(column_type = "Json")]
    pub po_numbers: PoNumberSet,

    pub status: CustomerStatus,

    #[sea_orm(column_type = "Json", nullable)]
    pub delete_request: Option<DeleteRequest>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
