use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionError, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::Command,
    db::DbPool,
    entities::inventory_item::{self, Entity as InventoryItem},
    errors::ServiceError,
    events::{Event, EventSender},
    lifecycle,
    models::{DeleteRequest, InventoryStatus},
};

/// Files a delete request against an inventory item: the item moves to
/// `PENDING_DELETE` and carries the pending request until it is resolved.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestItemDeleteCommand {
    pub item_id: Uuid,
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    pub reason: String,
    pub actor_id: Uuid,
}

#[async_trait::async_trait]
impl Command for RequestItemDeleteCommand {
    type Result = inventory_item::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(item_id = %self.item_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let cmd = self.clone();
        let item = db_pool
            .transaction::<_, inventory_item::Model, ServiceError>(move |txn| {
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

                    if item
                        .delete_request
                        .as_ref()
                        .map(DeleteRequest::is_pending)
                        .unwrap_or(false)
                    {
                        return Err(ServiceError::Conflict(format!(
                            "Inventory item {} already has a pending delete request",
                            item.unique_id
                        )));
                    }

                    if !lifecycle::can_request_delete(item.status) {
                        return Err(ServiceError::InvalidTransition {
                            current: item.status,
                            requested: InventoryStatus::PendingDelete,
                        });
                    }

                    let mut history = item.history.clone();
                    history.append(
                        InventoryStatus::PendingDelete,
                        cmd.actor_id,
                        Some(cmd.reason.clone()),
                    );

                    let mut active: inventory_item::ActiveModel = item.into();
                    active.status = Set(InventoryStatus::PendingDelete);
                    active.history = Set(history);
                    active.delete_request =
                        Set(Some(DeleteRequest::pending(cmd.actor_id, cmd.reason.clone())));
                    active.updated_at = Set(Utc::now());

                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(unique_id = %item.unique_id, "delete request filed");
        event_sender
            .send(Event::ItemDeleteRequested { item_id: item.id })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(item)
    }
}
