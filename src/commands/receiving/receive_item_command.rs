use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionError,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::Command,
    db::DbPool,
    entities::{
        inventory_item::{self, Entity as InventoryItem},
        purchase_order::{self, Entity as PurchaseOrder},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{derive_po_status, HistoryLog, InventoryStatus, PoStatus},
};

lazy_static! {
    static ref ITEM_RECEIPTS: IntCounter =
        IntCounter::new("item_receipts_total", "Total number of received inventory items")
            .expect("metric can be created");
    static ref ITEM_RECEIPT_FAILURES: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new(
            "item_receipt_failures_total",
            "Total number of rejected goods receipts"
        ),
        &["error_type"]
    )
    .expect("metric can be created");
}

/// Creates an inventory item against a purchase order and advances the PO's
/// delivered quantity, all in one transaction.
///
/// The delivered-quantity update is a conditional write filtered on the
/// value read at the start of the transaction, so two concurrent receipts
/// against the same PO cannot both pass the capacity check.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReceiveItemCommand {
    pub po_id: Uuid,
    pub part_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(min = 1, message = "Lot id must not be empty"))]
    pub lot_id: String,
    pub gate_id: Option<String>,
    pub location: Option<String>,
    pub barcode: Option<String>,
    /// Label identifier built from the part's supplier fields.
    #[validate(length(min = 1))]
    pub unique_id: String,
    /// Serialized scan payload printed into the QR code.
    pub qr_payload: Option<String>,
    /// Opaque encoded label image from the rendering collaborator.
    pub qr_label: Option<String>,
    pub actor_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveItemResult {
    pub item_id: Uuid,
    pub unique_id: String,
    pub po_status: PoStatus,
    pub delivered_quantity: i32,
}

#[async_trait::async_trait]
impl Command for ReceiveItemCommand {
    type Result = ReceiveItemResult;

    #[instrument(skip(self, db_pool, event_sender), fields(po_id = %self.po_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            ITEM_RECEIPT_FAILURES.with_label_values(&["validation_error"]).inc();
            ServiceError::ValidationError(e.to_string())
        })?;

        let result = self.receive_in_db(db_pool.as_ref()).await.map_err(|e| {
            ITEM_RECEIPT_FAILURES
                .with_label_values(&[match &e {
                    ServiceError::NotFound(_) => "not_found",
                    ServiceError::CapacityExceeded { .. } => "capacity_exceeded",
                    ServiceError::InvalidOperation(_) => "invalid_operation",
                    ServiceError::Conflict(_) | ServiceError::ConcurrentModification(_) => "conflict",
                    _ => "unexpected",
                }])
                .inc();
            e
        })?;

        info!(
            item_id = %result.item_id,
            unique_id = %result.unique_id,
            delivered = result.delivered_quantity,
            "goods receipt committed"
        );
        ITEM_RECEIPTS.inc();

        event_sender
            .send(Event::ItemReceived {
                item_id: result.item_id,
                po_id: self.po_id,
                quantity: self.quantity,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(result)
    }
}

impl ReceiveItemCommand {
    async fn receive_in_db(&self, db: &DbPool) -> Result<ReceiveItemResult, ServiceError> {
        let cmd = self.clone();
        db.transaction::<_, ReceiveItemResult, ServiceError>(move |txn| {
            Box::pin(async move {
                let po = PurchaseOrder::find_by_id(cmd.po_id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Purchase order {} not found", cmd.po_id))
                    })?;

                if po.status == PoStatus::Cancelled {
                    return Err(ServiceError::InvalidOperation(format!(
                        "Purchase order {} is cancelled and cannot receive items",
                        po.po_number
                    )));
                }

                // A completed PO has zero remaining capacity, so receipts
                // against it fail here with the remaining figure.
                let remaining = po.total_quantity - po.delivered_quantity;
                if cmd.quantity > remaining {
                    return Err(ServiceError::CapacityExceeded { remaining });
                }

                let duplicate = InventoryItem::find()
                    .filter(inventory_item::Column::UniqueId.eq(&cmd.unique_id))
                    .one(txn)
                    .await?;
                if duplicate.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        "An inventory item with unique id '{}' already exists",
                        cmd.unique_id
                    )));
                }

                let now = Utc::now();
                let new_delivered = po.delivered_quantity + cmd.quantity;
                let new_status = derive_po_status(new_delivered, po.total_quantity);

                // Conditional update keyed on the delivered quantity we read;
                // a concurrent receipt makes this touch zero rows.
                let update = PurchaseOrder::update_many()
                    .col_expr(
                        purchase_order::Column::DeliveredQuantity,
                        Expr::value(new_delivered),
                    )
                    .col_expr(purchase_order::Column::Status, Expr::value(new_status))
                    .col_expr(purchase_order::Column::UpdatedAt, Expr::value(now))
                    .filter(purchase_order::Column::Id.eq(po.id))
                    .filter(purchase_order::Column::DeliveredQuantity.eq(po.delivered_quantity))
                    .exec(txn)
                    .await?;
                if update.rows_affected == 0 {
                    warn!(po_id = %po.id, "concurrent receipt detected on purchase order");
                    return Err(ServiceError::ConcurrentModification(po.id));
                }

                let item_id = Uuid::new_v4();
                let item = inventory_item::ActiveModel {
                    id: Set(item_id),
                    unique_id: Set(cmd.unique_id.clone()),
                    barcode: Set(cmd.barcode.clone()),
                    qr_payload: Set(cmd.qr_payload.clone()),
                    qr_label: Set(cmd.qr_label.clone()),
                    part_id: Set(cmd.part_id),
                    po_id: Set(po.id),
                    po_number: Set(po.po_number.clone()),
                    quantity: Set(cmd.quantity),
                    status: Set(InventoryStatus::In),
                    lot_id: Set(cmd.lot_id.clone()),
                    gate_id: Set(cmd.gate_id.clone()),
                    location: Set(cmd.location.clone()),
                    history: Set(HistoryLog::seeded(
                        InventoryStatus::In,
                        cmd.actor_id,
                        cmd.notes.clone(),
                    )),
                    delete_request: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                item.insert(txn).await?;

                Ok(ReceiveItemResult {
                    item_id,
                    unique_id: cmd.unique_id.clone(),
                    po_status: new_status,
                    delivered_quantity: new_delivered,
                })
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }
}
