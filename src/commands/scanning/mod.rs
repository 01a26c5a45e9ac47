use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::entities::inventory_item::{self, Entity as InventoryItem};
use crate::errors::ServiceError;
use crate::models::{HistoryLog, InventoryStatus};

pub mod mark_damaged_command;
pub mod scan_in_command;
pub mod scan_out_command;

pub use mark_damaged_command::MarkDamagedCommand;
pub use scan_in_command::ScanInCommand;
pub use scan_out_command::ScanOutCommand;

/// How a scanned item is identified at the gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScanIdentifier {
    /// Structured payload decoded from a QR code.
    Payload { unique_id: String },
    /// Raw scanner output, matched against unique id, serialized payload,
    /// then barcode.
    Raw(String),
}

/// Outcome of a committed scan transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub item_id: Uuid,
    pub unique_id: String,
    pub status: InventoryStatus,
    pub report_id: Uuid,
    /// False for the idempotent re-scan of an item already `IN`.
    pub status_changed: bool,
}

/// Writes an item's new status and history, keyed on the status the caller
/// read. A concurrent mutation between the read and this write leaves the
/// filter matching zero rows; that surfaces as ConcurrentModification and
/// rolls the enclosing transaction back instead of overwriting the other
/// writer's history entry.
pub async fn persist_status_change<C: ConnectionTrait>(
    conn: &C,
    item: &inventory_item::Model,
    new_status: InventoryStatus,
    history: HistoryLog,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    let update = InventoryItem::update_many()
        .col_expr(inventory_item::Column::Status, Expr::value(new_status))
        .col_expr(inventory_item::Column::History, Expr::value(history))
        .col_expr(inventory_item::Column::UpdatedAt, Expr::value(now))
        .filter(inventory_item::Column::Id.eq(item.id))
        .filter(inventory_item::Column::Status.eq(item.status))
        .exec(conn)
        .await?;
    if update.rows_affected == 0 {
        warn!(item_id = %item.id, "concurrent scan detected on inventory item");
        return Err(ServiceError::ConcurrentModification(item.id));
    }
    Ok(())
}

/// Resolves a scan identifier to an inventory item. First match wins, in
/// priority order: unique id payload, raw unique id, serialized payload,
/// barcode.
pub(crate) async fn resolve_item<C: ConnectionTrait>(
    conn: &C,
    identifier: &ScanIdentifier,
) -> Result<inventory_item::Model, ServiceError> {
    let found = match identifier {
        ScanIdentifier::Payload { unique_id } => {
            InventoryItem::find()
                .filter(inventory_item::Column::UniqueId.eq(unique_id))
                .one(conn)
                .await?
        }
        ScanIdentifier::Raw(raw) => {
            let mut found = InventoryItem::find()
                .filter(inventory_item::Column::UniqueId.eq(raw))
                .one(conn)
                .await?;
            if found.is_none() {
                found = InventoryItem::find()
                    .filter(inventory_item::Column::QrPayload.eq(raw))
                    .one(conn)
                    .await?;
            }
            if found.is_none() {
                found = InventoryItem::find()
                    .filter(inventory_item::Column::Barcode.eq(raw))
                    .one(conn)
                    .await?;
            }
            found
        }
    };

    found.ok_or_else(|| {
        let shown = match identifier {
            ScanIdentifier::Payload { unique_id } => unique_id,
            ScanIdentifier::Raw(raw) => raw,
        };
        ServiceError::NotFound(format!("No inventory item matches identifier '{}'", shown))
    })
}

/// Display names denormalized into a report row.
pub(crate) struct DisplayNames {
    pub customer_name: String,
    pub part_name: String,
}

/// Looks up the customer and part display names for an item. Missing master
/// data degrades to empty names rather than failing the scan.
pub(crate) async fn resolve_display_names<C: ConnectionTrait>(
    conn: &C,
    item: &inventory_item::Model,
) -> Result<DisplayNames, ServiceError> {
    use crate::entities::{customer, part, purchase_order};

    let part_name = part::Entity::find_by_id(item.part_id)
        .one(conn)
        .await?
        .map(|p| p.name)
        .unwrap_or_default();

    let customer_name = match purchase_order::Entity::find_by_id(item.po_id).one(conn).await? {
        Some(po) => customer::Entity::find_by_id(po.customer_id)
            .one(conn)
            .await?
            .map(|c| c.name)
            .unwrap_or_default(),
        None => String::new(),
    };

    Ok(DisplayNames {
        customer_name,
        part_name,
    })
}
