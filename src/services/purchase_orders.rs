use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{actions, resources, AuthenticatedUser, Authorization},
    db::DbPool,
    entities::{
        customer::Entity as Customer,
        inventory_item::{self, Entity as InventoryItem},
        part::Entity as Part,
        purchase_order::{self, Entity as PurchaseOrder},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::PoStatus,
    services::po_sync::PoSyncService,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePurchaseOrderInput {
    #[validate(length(min = 1, message = "PO number must not be empty"))]
    pub po_number: String,
    pub part_id: Uuid,
    pub customer_id: Uuid,
    #[validate(range(min = 1, message = "Total quantity must be at least 1"))]
    pub total_quantity: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePurchaseOrderInput {
    pub po_number: Option<String>,
    pub part_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
}

/// Service for purchase order master data. Quantity and fulfillment status
/// belong to the receiving path; this service owns creation, renames,
/// reassignment, cancellation, and deletion, and drives the sync engine's
/// fan-out for each of them.
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    authorization: Arc<dyn Authorization>,
    sync: PoSyncService,
}

impl PurchaseOrderService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        authorization: Arc<dyn Authorization>,
        sync: PoSyncService,
    ) -> Self {
        Self {
            db,
            event_sender,
            authorization,
            sync,
        }
    }

    #[instrument(skip(self, input, actor), fields(po_number = %input.po_number, actor = %actor.username))]
    pub async fn create_purchase_order(
        &self,
        input: CreatePurchaseOrderInput,
        actor: &AuthenticatedUser,
    ) -> Result<purchase_order::Model, ServiceError> {
        self.authorization
            .authorize(actor, resources::PURCHASE_ORDER, actions::MANAGE)
            .await?;
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let duplicate = PurchaseOrder::find()
            .filter(purchase_order::Column::PoNumber.eq(&input.po_number))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Purchase order number '{}' already exists",
                input.po_number
            )));
        }

        Part::find_by_id(input.part_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", input.part_id)))?;
        Customer::find_by_id(input.customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", input.customer_id))
            })?;

        let now = Utc::now();
        let po = purchase_order::ActiveModel {
            id: Set(Uuid::new_v4()),
            po_number: Set(input.po_number.clone()),
            part_id: Set(input.part_id),
            customer_id: Set(input.customer_id),
            total_quantity: Set(input.total_quantity),
            delivered_quantity: Set(0),
            status: Set(PoStatus::Open),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let po = po.insert(&*self.db).await?;

        self.sync.on_create(&po).await?;

        info!(po_id = %po.id, "purchase order created");
        self.event_sender
            .send(Event::PurchaseOrderCreated(po.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(po)
    }

    /// Applies master-data changes and fans the new identifying number out
    /// to every denormalized location.
    #[instrument(skip(self, input, actor), fields(po_id = %po_id, actor = %actor.username))]
    pub async fn update_purchase_order(
        &self,
        po_id: Uuid,
        input: UpdatePurchaseOrderInput,
        actor: &AuthenticatedUser,
    ) -> Result<purchase_order::Model, ServiceError> {
        self.authorization
            .authorize(actor, resources::PURCHASE_ORDER, actions::MANAGE)
            .await?;

        let previous = self.get_purchase_order(po_id).await?;

        if let Some(new_number) = &input.po_number {
            if new_number.is_empty() {
                return Err(ServiceError::ValidationError(
                    "PO number must not be empty".into(),
                ));
            }
            if new_number != &previous.po_number {
                let taken = PurchaseOrder::find()
                    .filter(purchase_order::Column::PoNumber.eq(new_number))
                    .one(&*self.db)
                    .await?;
                if taken.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        "Purchase order number '{}' already exists",
                        new_number
                    )));
                }
            }
        }
        if let Some(part_id) = input.part_id {
            Part::find_by_id(part_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", part_id)))?;
        }
        if let Some(customer_id) = input.customer_id {
            Customer::find_by_id(customer_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Customer {} not found", customer_id))
                })?;
        }

        let mut active: purchase_order::ActiveModel = previous.clone().into();
        if let Some(number) = input.po_number {
            active.po_number = Set(number);
        }
        if let Some(part_id) = input.part_id {
            active.part_id = Set(part_id);
        }
        if let Some(customer_id) = input.customer_id {
            active.customer_id = Set(customer_id);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;

        self.sync.on_update(&updated, &previous).await?;

        let po_number_changed = updated.po_number != previous.po_number;
        info!(po_number_changed, "purchase order updated");
        self.event_sender
            .send(Event::PurchaseOrderUpdated {
                po_id,
                po_number_changed,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Cancels a purchase order. Cancellation is sticky: fulfillment updates
    /// never overwrite it afterwards.
    #[instrument(skip(self, actor), fields(po_id = %po_id, actor = %actor.username))]
    pub async fn cancel_purchase_order(
        &self,
        po_id: Uuid,
        actor: &AuthenticatedUser,
    ) -> Result<purchase_order::Model, ServiceError> {
        self.authorization
            .authorize(actor, resources::PURCHASE_ORDER, actions::MANAGE)
            .await?;

        let po = self.get_purchase_order(po_id).await?;
        if po.status == PoStatus::Cancelled {
            return Err(ServiceError::Conflict(format!(
                "Purchase order {} is already cancelled",
                po.po_number
            )));
        }

        let mut active: purchase_order::ActiveModel = po.into();
        active.status = Set(PoStatus::Cancelled);
        active.updated_at = Set(Utc::now());
        let po = active.update(&*self.db).await?;

        info!(po_number = %po.po_number, "purchase order cancelled");
        self.event_sender
            .send(Event::PurchaseOrderCancelled(po_id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(po)
    }

    /// Deletes a purchase order. Blocked while any inventory item still
    /// references it; on success the sync engine clears the part mirror and
    /// the customer's set, leaving items' historical numbers untouched.
    #[instrument(skip(self, actor), fields(po_id = %po_id, actor = %actor.username))]
    pub async fn delete_purchase_order(
        &self,
        po_id: Uuid,
        actor: &AuthenticatedUser,
    ) -> Result<(), ServiceError> {
        self.authorization
            .authorize(actor, resources::PURCHASE_ORDER, actions::MANAGE)
            .await?;

        let po = self.get_purchase_order(po_id).await?;

        let referencing_items = InventoryItem::find()
            .filter(inventory_item::Column::PoId.eq(po.id))
            .count(&*self.db)
            .await?;
        if referencing_items > 0 {
            return Err(ServiceError::ReferentialIntegrity {
                message: format!(
                    "Purchase order {} cannot be deleted ({} item(s) still reference it)",
                    po.po_number, referencing_items
                ),
                parts: 0,
                purchase_orders: 0,
                items: referencing_items,
            });
        }

        po.clone().delete(&*self.db).await?;
        self.sync.on_delete(&po).await?;

        info!(po_number = %po.po_number, "purchase order deleted");
        self.event_sender
            .send(Event::PurchaseOrderDeleted(po_id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    pub async fn get_purchase_order(
        &self,
        po_id: Uuid,
    ) -> Result<purchase_order::Model, ServiceError> {
        PurchaseOrder::find_by_id(po_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", po_id)))
    }

    pub async fn get_by_number(
        &self,
        po_number: &str,
    ) -> Result<Option<purchase_order::Model>, ServiceError> {
        Ok(PurchaseOrder::find()
            .filter(purchase_order::Column::PoNumber.eq(po_number))
            .one(&*self.db)
            .await?)
    }
}
