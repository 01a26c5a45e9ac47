use chrono::Utc;
use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec};
use sea_orm::{ActiveModelTrait, Set, TransactionError, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::{
    commands::Command,
    db::DbPool,
    entities::report,
    errors::ServiceError,
    events::{Event, EventSender},
    lifecycle,
    models::{InventoryStatus, ReportType},
};

use super::{persist_status_change, resolve_display_names, resolve_item, ScanIdentifier, ScanResult};

lazy_static! {
    static ref SCAN_OUTS: IntCounter =
        IntCounter::new("scan_outs_total", "Total number of committed scan-out transactions")
            .expect("metric can be created");
    static ref SCAN_OUT_FAILURES: IntCounterVec = IntCounterVec::new(
        prometheus::Opts::new(
            "scan_out_failures_total",
            "Total number of failed scan-out attempts"
        ),
        &["error_type"]
    )
    .expect("metric can be created");
}

/// Records that a physical unit left custody at a gate: item goes `OUT`,
/// one history entry is appended, and one ledger row is inserted, all in a
/// single transaction.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScanOutCommand {
    pub identifier: ScanIdentifier,
    pub actor_id: Uuid,
    pub actor_name: String,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub notes: Option<String>,
}

#[async_trait::async_trait]
impl Command for ScanOutCommand {
    type Result = ScanResult;

    #[instrument(skip(self, db_pool, event_sender), fields(actor = %self.actor_name))]
    async fn execute(
        &self,
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
    ) -> Result<Self::Result, ServiceError> {
        self.validate().map_err(|e| {
            SCAN_OUT_FAILURES.with_label_values(&["validation_error"]).inc();
            ServiceError::ValidationError(e.to_string())
        })?;

        let result = self.scan_out_in_db(db_pool.as_ref()).await.map_err(|e| {
            SCAN_OUT_FAILURES
                .with_label_values(&[match &e {
                    ServiceError::NotFound(_) => "not_found",
                    ServiceError::InvalidTransition { .. } => "invalid_transition",
                    ServiceError::Conflict(_) | ServiceError::ConcurrentModification(_) => "conflict",
                    _ => "unexpected",
                }])
                .inc();
            e
        })?;

        info!(item_id = %result.item_id, unique_id = %result.unique_id, "item scanned out");
        SCAN_OUTS.inc();

        event_sender
            .send(Event::ItemScannedOut {
                item_id: result.item_id,
            })
            .await
            .map_err(|e| {
                error!("failed to send scan-out event: {}", e);
                ServiceError::EventError(e)
            })?;

        Ok(result)
    }
}

impl ScanOutCommand {
    async fn scan_out_in_db(&self, db: &DbPool) -> Result<ScanResult, ServiceError> {
        let cmd = self.clone();
        db.transaction::<_, ScanResult, ServiceError>(move |txn| {
            Box::pin(async move {
                let item = resolve_item(txn, &cmd.identifier).await?;

                lifecycle::check_scan_transition(item.status, InventoryStatus::Out)?;

                let names = resolve_display_names(txn, &item).await?;
                let now = Utc::now();

                let mut history = item.history.clone();
                history.append(InventoryStatus::Out, cmd.actor_id, cmd.notes.clone());

                let report_id = Uuid::new_v4();
                let ledger_row = report::ActiveModel {
                    id: Set(report_id),
                    report_type: Set(ReportType::ScanOut),
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

                persist_status_change(txn, &item, InventoryStatus::Out, history, now).await?;

                ledger_row.insert(txn).await?;

                Ok(ScanResult {
                    item_id,
                    unique_id,
                    status: InventoryStatus::Out,
                    report_id,
                    status_changed: true,
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
