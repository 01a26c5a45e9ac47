use std::sync::Arc;

use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit::{dispatch_audit, AuditEntry, AuditLogger},
    auth::{actions, resources, AuthenticatedUser, Authorization},
    commands::receiving::{build_unique_id, ReceiveItemCommand, ReceiveItemResult},
    commands::Command,
    db::DbPool,
    entities::part::Entity as Part,
    errors::ServiceError,
    events::EventSender,
    labels::LabelRenderer,
};

/// Goods receipt payload as it arrives from the boundary.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReceiveItemInput {
    pub po_id: Uuid,
    pub part_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    #[validate(length(min = 1, message = "Lot id must not be empty"))]
    pub lot_id: String,
    pub gate_id: Option<String>,
    pub location: Option<String>,
    pub barcode: Option<String>,
    pub notes: Option<String>,
}

/// Service for goods receipt: creates inventory items against purchase
/// orders and keeps the PO's delivered quantity within its commitment.
#[derive(Clone)]
pub struct ReceivingService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    authorization: Arc<dyn Authorization>,
    audit: Arc<dyn AuditLogger>,
    labels: Arc<dyn LabelRenderer>,
}

impl ReceivingService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        authorization: Arc<dyn Authorization>,
        audit: Arc<dyn AuditLogger>,
        labels: Arc<dyn LabelRenderer>,
    ) -> Self {
        Self {
            db,
            event_sender,
            authorization,
            audit,
            labels,
        }
    }

    #[instrument(skip(self, input, actor), fields(po_id = %input.po_id, actor = %actor.username))]
    pub async fn receive_item(
        &self,
        input: ReceiveItemInput,
        actor: &AuthenticatedUser,
    ) -> Result<ReceiveItemResult, ServiceError> {
        self.authorization
            .authorize(actor, resources::INVENTORY_ITEM, actions::RECEIVE)
            .await?;
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let part = Part::find_by_id(input.part_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", input.part_id)))?;

        let unique_id = build_unique_id(&part, input.quantity, &input.lot_id);
        let qr_payload = json!({ "uniqueId": unique_id }).to_string();
        // Label rendering happens before the transaction; the image is
        // opaque to everything past this point.
        let qr_label = self.labels.render(&unique_id).await?;
        let qr_label = (!qr_label.is_empty()).then_some(qr_label);

        let command = ReceiveItemCommand {
            po_id: input.po_id,
            part_id: input.part_id,
            quantity: input.quantity,
            lot_id: input.lot_id,
            gate_id: input.gate_id,
            location: input.location,
            barcode: input.barcode,
            unique_id,
            qr_payload: Some(qr_payload),
            qr_label,
            actor_id: actor.id,
            notes: input.notes,
        };
        let result = command
            .execute(self.db.clone(), self.event_sender.clone())
            .await?;

        dispatch_audit(
            self.audit.clone(),
            AuditEntry {
                actor_id: actor.id,
                actor_name: actor.name.clone(),
                action: "RECEIVE_ITEM".into(),
                details: format!("item {} received", result.unique_id),
                resource_type: resources::INVENTORY_ITEM.into(),
                resource_id: result.item_id.to_string(),
            },
        );
        Ok(result)
    }
}
