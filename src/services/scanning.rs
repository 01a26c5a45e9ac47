use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    audit::{dispatch_audit, AuditEntry, AuditLogger},
    auth::{actions, resources, AuthenticatedUser, Authorization},
    commands::scanning::{MarkDamagedCommand, ScanIdentifier, ScanInCommand, ScanOutCommand, ScanResult},
    commands::Command,
    db::DbPool,
    entities::{
        inventory_item::{self, Entity as InventoryItem},
        report::{self, Entity as Report},
    },
    errors::ServiceError,
    events::EventSender,
};

/// Service for the scan transaction processor: records custody changes at
/// the gates, one bounded transaction per scan.
#[derive(Clone)]
pub struct ScanService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    authorization: Arc<dyn Authorization>,
    audit: Arc<dyn AuditLogger>,
    txn_timeout: Duration,
}

impl ScanService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        authorization: Arc<dyn Authorization>,
        audit: Arc<dyn AuditLogger>,
        txn_timeout: Duration,
    ) -> Self {
        Self {
            db,
            event_sender,
            authorization,
            audit,
            txn_timeout,
        }
    }

    /// Scans an item out of custody. The identifier resolves by unique id,
    /// serialized payload, or barcode.
    #[instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn scan_out(
        &self,
        identifier: ScanIdentifier,
        actor: &AuthenticatedUser,
        notes: Option<String>,
    ) -> Result<ScanResult, ServiceError> {
        self.authorization
            .authorize(actor, resources::INVENTORY_ITEM, actions::SCAN)
            .await?;

        let command = ScanOutCommand {
            identifier,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            notes,
        };
        let result = self.run_bounded(command.execute(self.db.clone(), self.event_sender.clone())).await?;

        dispatch_audit(
            self.audit.clone(),
            AuditEntry {
                actor_id: actor.id,
                actor_name: actor.name.clone(),
                action: "SCAN_OUT".into(),
                details: format!("item {} scanned out", result.unique_id),
                resource_type: resources::INVENTORY_ITEM.into(),
                resource_id: result.item_id.to_string(),
            },
        );
        Ok(result)
    }

    /// Re-admits an item by internal id, e.g. on a return.
    #[instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn scan_in(
        &self,
        item_id: Uuid,
        actor: &AuthenticatedUser,
        notes: Option<String>,
    ) -> Result<ScanResult, ServiceError> {
        self.authorization
            .authorize(actor, resources::INVENTORY_ITEM, actions::SCAN)
            .await?;

        let command = ScanInCommand {
            item_id,
            actor_id: actor.id,
            actor_name: actor.name.clone(),
            notes,
        };
        let result = self.run_bounded(command.execute(self.db.clone(), self.event_sender.clone())).await?;

        dispatch_audit(
            self.audit.clone(),
            AuditEntry {
                actor_id: actor.id,
                actor_name: actor.name.clone(),
                action: "SCAN_IN".into(),
                details: format!("item {} scanned in", result.unique_id),
                resource_type: resources::INVENTORY_ITEM.into(),
                resource_id: result.item_id.to_string(),
            },
        );
        Ok(result)
    }

    /// Flags an item as damaged, freezing it for further scans.
    #[instrument(skip(self, actor), fields(item_id = %item_id, actor = %actor.username))]
    pub async fn mark_damaged(
        &self,
        item_id: Uuid,
        actor: &AuthenticatedUser,
        notes: String,
    ) -> Result<inventory_item::Model, ServiceError> {
        self.authorization
            .authorize(actor, resources::INVENTORY_ITEM, actions::SCAN)
            .await?;

        let item = MarkDamagedCommand {
            item_id,
            actor_id: actor.id,
            notes,
        }
        .execute(self.db.clone(), self.event_sender.clone())
        .await?;

        dispatch_audit(
            self.audit.clone(),
            AuditEntry {
                actor_id: actor.id,
                actor_name: actor.name.clone(),
                action: "MARK_DAMAGED".into(),
                details: format!("item {} flagged damaged", item.unique_id),
                resource_type: resources::INVENTORY_ITEM.into(),
                resource_id: item.id.to_string(),
            },
        );
        Ok(item)
    }

    /// Bounds a scan transaction; a timed-out transaction aborts exactly as
    /// any other failure.
    async fn run_bounded<F>(&self, fut: F) -> Result<ScanResult, ServiceError>
    where
        F: std::future::Future<Output = Result<ScanResult, ServiceError>>,
    {
        tokio::time::timeout(self.txn_timeout, fut)
            .await
            .map_err(|_| ServiceError::InternalError("scan transaction timed out".into()))?
    }

    pub async fn get_item(&self, item_id: Uuid) -> Result<inventory_item::Model, ServiceError> {
        InventoryItem::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory item {} not found", item_id)))
    }

    pub async fn find_by_unique_id(
        &self,
        unique_id: &str,
    ) -> Result<Option<inventory_item::Model>, ServiceError> {
        Ok(InventoryItem::find()
            .filter(inventory_item::Column::UniqueId.eq(unique_id))
            .one(&*self.db)
            .await?)
    }

    /// Ledger rows for one item, oldest first.
    pub async fn reports_for_item(
        &self,
        item_id: Uuid,
    ) -> Result<Vec<report::Model>, ServiceError> {
        Ok(Report::find()
            .filter(report::Column::ItemId.eq(item_id))
            .order_by_asc(report::Column::CreatedAt)
            .all(&*self.db)
            .await?)
    }
}
