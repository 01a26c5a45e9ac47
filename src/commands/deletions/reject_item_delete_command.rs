use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionError, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    commands::Command,
    db::DbPool,
    entities::inventory_item::{self, Entity as InventoryItem},
    errors::ServiceError,
    events::{Event, EventSender},
    lifecycle,
    models::DeleteRequestStatus,
};

/// Rejects a pending item delete request. The item is restored to the status
/// it held before the request, found by scanning history backward; the
/// resolved request stays on the item as an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectItemDeleteCommand {
    pub item_id: Uuid,
    pub approver_id: Uuid,
    pub notes: Option<String>,
}

#[async_trait::async_trait]
impl Command for RejectItemDeleteCommand {
    type Result = inventory_item::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(item_id = %self.item_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
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

                    let mut request = item.delete_request.clone().ok_or_else(|| {
                        ServiceError::Conflict(format!(
                            "Inventory item {} has no delete request",
                            item.unique_id
                        ))
                    })?;
                    if !request.is_pending() {
                        return Err(ServiceError::Conflict(format!(
                            "Delete request for item {} is already {}",
                            item.unique_id, request.status
                        )));
                    }

                    let restored =
                        lifecycle::prior_status(&item.history, lifecycle::DEFAULT_REJECT_FALLBACK);
                    request.resolve(
                        DeleteRequestStatus::Rejected,
                        cmd.approver_id,
                        cmd.notes.clone(),
                    );

                    let mut history = item.history.clone();
                    history.append(restored, cmd.approver_id, cmd.notes.clone());

                    let mut active: inventory_item::ActiveModel = item.into();
                    active.status = Set(restored);
                    active.history = Set(history);
                    active.delete_request = Set(Some(request));
                    active.updated_at = Set(Utc::now());

                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(unique_id = %item.unique_id, status = %item.status, "item delete rejected");
        event_sender
            .send(Event::ItemDeleteRejected { item_id: item.id })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(item)
    }
}
