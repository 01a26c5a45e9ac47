use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionError, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    commands::Command,
    db::DbPool,
    entities::customer::{self, Entity as Customer},
    errors::ServiceError,
    events::{Event, EventSender},
    lifecycle,
    models::{CustomerStatus, DeleteRequestStatus},
};

/// Rejects a pending customer delete request: the customer returns to
/// `active` and the resolved request stays as an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectCustomerDeleteCommand {
    pub customer_id: Uuid,
    pub approver_id: Uuid,
    pub notes: Option<String>,
}

#[async_trait::async_trait]
impl Command for RejectCustomerDeleteCommand {
    type Result = customer::Model;

    #[instrument(skip(self, db_pool, event_sender), fields(customer_id = %self.customer_id))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
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

                    let mut request = model.delete_request.clone().ok_or_else(|| {
                        ServiceError::Conflict(format!(
                            "Customer {} has no delete request",
                            model.name
                        ))
                    })?;
                    if !request.is_pending() {
                        return Err(ServiceError::Conflict(format!(
                            "Delete request for customer {} is already {}",
                            model.name, request.status
                        )));
                    }

                    lifecycle::check_customer_transition(model.status, CustomerStatus::Active)?;

                    request.resolve(
                        DeleteRequestStatus::Rejected,
                        cmd.approver_id,
                        cmd.notes.clone(),
                    );

                    let mut active: customer::ActiveModel = model.into();
                    active.status = Set(CustomerStatus::Active);
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

        info!(customer = %model.name, "customer delete rejected");
        event_sender
            .send(Event::CustomerDeleteRejected {
                customer_id: model.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(model)
    }
}
