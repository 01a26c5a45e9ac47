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
    entities::customer::{self, Entity as Customer},
    errors::ServiceError,
    events::{Event, EventSender},
    lifecycle,
    models::{CustomerStatus, DeleteRequest},
};

use super::{customer_reference_counts, ensure_no_customer_references};

/// Files a delete request against a customer. The referential integrity
/// check runs here as well as at approval time: a customer still referenced
/// by parts or purchase orders can never reach the terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RequestCustomerDeleteCommand {
    pub customer_id: Uuid,
    #[validate(length(min = 1, max = 500, message = "Reason must be between 1 and 500 characters"))]
    pub reason: String,
    pub actor_id: Uuid,
}

#[async_trait::async_trait]
impl Command for RequestCustomerDeleteCommand {
    type Result = customer::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(customer_id = %self.customer_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let cmd = self.clone();
        let model = db_pool
            .transaction::<_, customer::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let model = Customer::find_by_id(cmd.customer_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Customer {} not found",
                                cmd.customer_id
                            ))
                        })?;

                    if model.status == CustomerStatus::Deleted {
                        return Err(ServiceError::Conflict(format!(
                            "Customer {} is already deleted",
                            model.name
                        )));
                    }
                    if model
                        .delete_request
                        .as_ref()
                        .map(DeleteRequest::is_pending)
                        .unwrap_or(false)
                    {
                        return Err(ServiceError::Conflict(format!(
                            "Customer {} already has a pending delete request",
                            model.name
                        )));
                    }

                    lifecycle::check_customer_transition(
                        model.status,
                        CustomerStatus::PendingDelete,
                    )?;

                    let (parts, pos) = customer_reference_counts(txn, model.id).await?;
                    ensure_no_customer_references(parts, pos)?;

                    let mut active: customer::ActiveModel = model.into();
                    active.status = Set(CustomerStatus::PendingDelete);
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

        info!(customer = %model.name, "customer delete request filed");
        event_sender
            .send(Event::CustomerDeleteRequested {
                customer_id: model.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(model)
    }
}
