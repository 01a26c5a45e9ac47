use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, EntityTrait, ModelTrait, QueryFilter, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    commands::Command,
    db::DbPool,
    entities::{
        inventory_item::Entity as InventoryItem,
        purchase_order::{self, Entity as PurchaseOrder},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{derive_po_status, DeleteRequest, PoStatus},
};

/// Approves a pending item delete request: the row is hard-deleted and the
/// owning purchase order's delivered quantity is wound back so it keeps
/// reflecting surviving items only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveItemDeleteCommand {
    pub item_id: Uuid,
    pub approver_id: Uuid,
}

#[async_trait::async_trait]
impl Command for ApproveItemDeleteCommand {
    type Result = ();

    #[instrument(skip(self, db_pool, event_sender), fields(item_id = %self.item_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        let cmd = self.clone();
        db_pool
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let item = InventoryItem::find_by_id(cmd.item_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Inventory item {} not found",
                                cmd.item_id
                            ))
                        })?;

                    let pending = item
                        .delete_request
                        .as_ref()
                        .map(DeleteRequest::is_pending)
                        .unwrap_or(false);
                    if !pending {
                        return Err(ServiceError::Conflict(format!(
                            "Inventory item {} has no pending delete request",
                            item.unique_id
                        )));
                    }

                    let po = PurchaseOrder::find_by_id(item.po_id).one(txn).await?;
                    if let Some(po) = po {
                        let new_delivered = (po.delivered_quantity - item.quantity).max(0);
                        // Cancellation stays sticky; otherwise re-derive.
                        let new_status = if po.status == PoStatus::Cancelled {
                            PoStatus::Cancelled
                        } else {
                            derive_po_status(new_delivered, po.total_quantity)
                        };
                        let update = PurchaseOrder::update_many()
                            .col_expr(
                                purchase_order::Column::DeliveredQuantity,
                                Expr::value(new_delivered),
                            )
                            .col_expr(purchase_order::Column::Status, Expr::value(new_status))
                            .col_expr(purchase_order::Column::UpdatedAt, Expr::value(Utc::now()))
                            .filter(purchase_order::Column::Id.eq(po.id))
                            .filter(
                                purchase_order::Column::DeliveredQuantity
                                    .eq(po.delivered_quantity),
                            )
                            .exec(txn)
                            .await?;
                        if update.rows_affected == 0 {
                            warn!(po_id = %po.id, "concurrent fulfillment update during delete approval");
                            return Err(ServiceError::ConcurrentModification(po.id));
                        }
                    }

                    item.delete(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!("item delete approved and row removed");
        event_sender
            .send(Event::ItemDeleteApproved {
                item_id: self.item_id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }
}
