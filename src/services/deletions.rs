use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::{
    audit::{dispatch_audit, AuditEntry, AuditLogger},
    auth::{actions, resources, AuthenticatedUser, Authorization},
    commands::deletions::{
        ApproveCustomerDeleteCommand, ApproveItemDeleteCommand, RejectCustomerDeleteCommand,
        RejectItemDeleteCommand, RequestCustomerDeleteCommand, RequestItemDeleteCommand,
    },
    commands::Command,
    db::DbPool,
    entities::{customer, inventory_item},
    errors::ServiceError,
    events::EventSender,
};

/// Service for the two-phase delete workflow on inventory items and
/// customers. Requesting needs only the base permission; resolving a
/// request is gated behind the elevated one.
#[derive(Clone)]
pub struct DeleteRequestService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    authorization: Arc<dyn Authorization>,
    audit: Arc<dyn AuditLogger>,
}

impl DeleteRequestService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        authorization: Arc<dyn Authorization>,
        audit: Arc<dyn AuditLogger>,
    ) -> Self {
        Self {
            db,
            event_sender,
            authorization,
            audit,
        }
    }

    #[instrument(skip(self, actor), fields(item_id = %item_id, actor = %actor.username))]
    pub async fn request_item_delete(
        &self,
        item_id: Uuid,
        reason: String,
        actor: &AuthenticatedUser,
    ) -> Result<inventory_item::Model, ServiceError> {
        self.authorization
            .authorize(actor, resources::INVENTORY_ITEM, actions::REQUEST_DELETE)
            .await?;

        let item = RequestItemDeleteCommand {
            item_id,
            reason,
            actor_id: actor.id,
        }
        .execute(self.db.clone(), self.event_sender.clone())
        .await?;

        self.audit_item(actor, "REQUEST_ITEM_DELETE", item_id);
        Ok(item)
    }

    #[instrument(skip(self, approver), fields(item_id = %item_id, approver = %approver.username))]
    pub async fn approve_item_delete(
        &self,
        item_id: Uuid,
        approver: &AuthenticatedUser,
    ) -> Result<(), ServiceError> {
        self.authorization
            .authorize(approver, resources::INVENTORY_ITEM, actions::RESOLVE_DELETE)
            .await?;

        ApproveItemDeleteCommand {
            item_id,
            approver_id: approver.id,
        }
        .execute(self.db.clone(), self.event_sender.clone())
        .await?;

        self.audit_item(approver, "APPROVE_ITEM_DELETE", item_id);
        Ok(())
    }

    #[instrument(skip(self, approver), fields(item_id = %item_id, approver = %approver.username))]
    pub async fn reject_item_delete(
        &self,
        item_id: Uuid,
        approver: &AuthenticatedUser,
        notes: Option<String>,
    ) -> Result<inventory_item::Model, ServiceError> {
        self.authorization
            .authorize(approver, resources::INVENTORY_ITEM, actions::RESOLVE_DELETE)
            .await?;

        let item = RejectItemDeleteCommand {
            item_id,
            approver_id: approver.id,
            notes,
        }
        .execute(self.db.clone(), self.event_sender.clone())
        .await?;

        self.audit_item(approver, "REJECT_ITEM_DELETE", item_id);
        Ok(item)
    }

    #[instrument(skip(self, actor), fields(customer_id = %customer_id, actor = %actor.username))]
    pub async fn request_customer_delete(
        &self,
        customer_id: Uuid,
        reason: String,
        actor: &AuthenticatedUser,
    ) -> Result<customer::Model, ServiceError> {
        self.authorization
            .authorize(actor, resources::CUSTOMER, actions::REQUEST_DELETE)
            .await?;

        let model = RequestCustomerDeleteCommand {
            customer_id,
            reason,
            actor_id: actor.id,
        }
        .execute(self.db.clone(), self.event_sender.clone())
        .await?;

        self.audit_customer(actor, "REQUEST_CUSTOMER_DELETE", customer_id);
        Ok(model)
    }

    #[instrument(skip(self, approver), fields(customer_id = %customer_id, approver = %approver.username))]
    pub async fn approve_customer_delete(
        &self,
        customer_id: Uuid,
        approver: &AuthenticatedUser,
    ) -> Result<customer::Model, ServiceError> {
        self.authorization
            .authorize(approver, resources::CUSTOMER, actions::RESOLVE_DELETE)
            .await?;

        let model = ApproveCustomerDeleteCommand {
            customer_id,
            approver_id: approver.id,
        }
        .execute(self.db.clone(), self.event_sender.clone())
        .await?;

        self.audit_customer(approver, "APPROVE_CUSTOMER_DELETE", customer_id);
        Ok(model)
    }

    #[instrument(skip(self, approver), fields(customer_id = %customer_id, approver = %approver.username))]
    pub async fn reject_customer_delete(
        &self,
        customer_id: Uuid,
        approver: &AuthenticatedUser,
        notes: Option<String>,
    ) -> Result<customer::Model, ServiceError> {
        self.authorization
            .authorize(approver, resources::CUSTOMER, actions::RESOLVE_DELETE)
            .await?;

        let model = RejectCustomerDeleteCommand {
            customer_id,
            approver_id: approver.id,
            notes,
        }
        .execute(self.db.clone(), self.event_sender.clone())
        .await?;

        self.audit_customer(approver, "REJECT_CUSTOMER_DELETE", customer_id);
        Ok(model)
    }

    fn audit_item(&self, actor: &AuthenticatedUser, action: &str, item_id: Uuid) {
        dispatch_audit(
            self.audit.clone(),
            AuditEntry {
                actor_id: actor.id,
                actor_name: actor.name.clone(),
                action: action.into(),
                details: String::new(),
                resource_type: resources::INVENTORY_ITEM.into(),
                resource_id: item_id.to_string(),
            },
        );
    }

    fn audit_customer(&self, actor: &AuthenticatedUser, action: &str, customer_id: Uuid) {
        dispatch_audit(
            self.audit.clone(),
            AuditEntry {
                actor_id: actor.id,
                actor_name: actor.name.clone(),
                action: action.into(),
                details: String::new(),
                resource_type: resources::CUSTOMER.into(),
                resource_id: customer_id.to_string(),
            },
        );
    }
}
