use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::IntCounter;
use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionError, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::Command,
    db::DbPool,
    entities::{
        inventory_item::Entity as InventoryItem,
        report,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    lifecycle,
    models::{InventoryStatus, ReportType},
};

use super::{persist_status_change, resolve_display_names, ScanResult};

lazy_static! {
    static ref SCAN_INS: IntCounter =
        IntCounter::new("scan_ins_total", "Total number of committed scan-in transactions")
            .expect("metric can be created");
}

/// Re-admits an item into custody by internal id, e.g. after a return.
///
/// If the item is already `IN` the status and history are untouched, but a
/// ledger row is still inserted: each scan is an event, not a state
/// assertion.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScanInCommand {
    pub item_id: Uuid,
    pub actor_id: Uuid,
    pub actor_name: String,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[async_trait::async_trait]
impl Command for ScanInCommand {
    type Result = ScanResult;

    #[instrument(skip(self, db_pool, event_sender), fields(actor = %self.actor_name))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let result = self.scan_in_in_db(db_pool.as_ref()).await?;

        info!(
            item_id = %result.item_id,
            status_changed = result.status_changed,
            "item scanned in"
        );
        SCAN_INS.inc();

        event_sender
            .send(Event::ItemScannedIn {
                item_id: result.item_id,
                status_changed: result.status_changed,
            })
            .await
            .map_err(|e| {
                error!("failed to send scan-in event: {}", e);
                ServiceError::EventError(e)
            })?;

        Ok(result)
    }
}

impl ScanInCommand {
    async fn scan_in_in_db(&self, db: &DbPool) -> Result<ScanResult, ServiceError> {
        let cmd = self.clone();
        db.transaction::<_, ScanResult, ServiceError>(move |txn| {
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

                lifecycle::check_scan_transition(item.status, InventoryStatus::In)?;

                let names = resolve_display_names(txn, &item).await?;
                let now = Utc::now();
                let status_changed = item.status != InventoryStatus::In;

                let report_id = Uuid::new_v4();
                let ledger_row = report::ActiveModel {
                    id: Set(report_id),
                    report_type: Set(ReportType::ScanIn),
                    item_id: Set(item.id),
                    item_unique_id: Set(item.unique_id.clone()),
                    quantity: Set(item.quantity),
                    lot_id: Set(item.lot_id.clone()),
                    gate_id: Set(item.gate_id.clone()),
                    location: Set(item.location.clone()),
                    customer_name: Set(names.customer_name),
                    part_name: Set(names.part_name),
                    po_number: Set(item.po_number.clone()),
                    actor_id: Set(cmd.actor_id),
                    actor_name: Set(cmd.actor_name.clone()),
                    notes: Set(cmd.notes.clone()),
                    created_at: Set(now),
                    updated_at: Set(now),
                };

                let item_id = item.id;
                let unique_id = item.unique_id.clone();

                // Only mutate the item when the status actually changes.
                if status_changed {
                    let mut history = item.history.clone();
                    history.append(InventoryStatus::In, cmd.actor_id, cmd.notes.clone());
                    persist_status_change(txn, &item, InventoryStatus::In, history, now).await?;
                }

                ledger_row.insert(txn).await?;

                Ok(ScanResult {
                    item_id,
                    unique_id,
                    status: InventoryStatus::In,
                    report_id,
                    status_changed,
                })
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })
    }
}
