use chrono::Utc;
use sea_orm::{EntityTrait, TransactionError, TransactionTrait};
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
    models::InventoryStatus,
};

use super::persist_status_change;

/// Flags an item as damaged. A damaged item is frozen for scanning; the only
/// way out is a delete request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarkDamagedCommand {
    pub item_id: Uuid,
    pub actor_id: Uuid,
    #[validate(length(min = 1, max = 500, message = "Notes must be between 1 and 500 characters"))]
    pub notes: String,
}

#[async_trait::async_trait]
impl Command for MarkDamagedCommand {
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

                    if !lifecycle::can_mark_damaged(item.status) {
                        return Err(ServiceError::InvalidTransition {
                            current: item.status,
                            requested: InventoryStatus::Damaged,
                        });
                    }

                    let mut history = item.history.clone();
                    history.append(
                        InventoryStatus::Damaged,
                        cmd.actor_id,
                        Some(cmd.notes.clone()),
                    );

                    let now = Utc::now();
                    persist_status_change(
                        txn,
                        &item,
                        InventoryStatus::Damaged,
                        history.clone(),
                        now,
                    )
                    .await?;

                    Ok(inventory_item::Model {
                        status: InventoryStatus::Damaged,
                        history,
                        updated_at: now,
                        ..item
                    })
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(unique_id = %item.unique_id, "item flagged damaged");
        event_sender
            .send(Event::ItemMarkedDamaged { item_id: item.id })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(item)
    }
}
