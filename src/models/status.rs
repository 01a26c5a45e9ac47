use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enum representing the possible statuses of an inventory item.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum InventoryStatus {
    #[sea_orm(string_value = "IN")]
    #[strum(serialize = "IN")]
    In,
    #[sea_orm(string_value = "OUT")]
    #[strum(serialize = "OUT")]
    Out,
    #[sea_orm(string_value = "PENDING_DELETE")]
    #[strum(serialize = "PENDING_DELETE")]
    PendingDelete,
    #[sea_orm(string_value = "DAMAGED")]
    #[strum(serialize = "DAMAGED")]
    Damaged,
}

/// Enum representing the possible statuses of a purchase order.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PoStatus {
    #[sea_orm(string_value = "open")]
    #[strum(serialize = "open")]
    Open,
    #[sea_orm(string_value = "partial")]
    #[strum(serialize = "partial")]
    Partial,
    #[sea_orm(string_value = "completed")]
    #[strum(serialize = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    #[strum(serialize = "cancelled")]
    Cancelled,
}

/// Enum representing the lifecycle status of a customer record.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum CustomerStatus {
    #[sea_orm(string_value = "active")]
    #[strum(serialize = "active")]
    Active,
    #[sea_orm(string_value = "pending_delete")]
    #[strum(serialize = "pending_delete")]
    PendingDelete,
    #[sea_orm(string_value = "deleted")]
    #[strum(serialize = "deleted")]
    Deleted,
}

/// Enum representing the type of a scan ledger entry.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ReportType {
    #[sea_orm(string_value = "SCAN_IN")]
    #[strum(serialize = "SCAN_IN")]
    ScanIn,
    #[sea_orm(string_value = "SCAN_OUT")]
    #[strum(serialize = "SCAN_OUT")]
    ScanOut,
}

/// Derives a purchase order's fulfillment status from its quantities.
///
/// Cancellation is sticky and handled by callers before this function runs;
/// this only covers the open/partial/completed progression.
pub fn derive_po_status(delivered_quantity: i32, total_quantity: i32) -> PoStatus {
    if delivered_quantity <= 0 {
        PoStatus::Open
    } else if delivered_quantity < total_quantity {
        PoStatus::Partial
    } else {
        PoStatus::Completed
    }
}
