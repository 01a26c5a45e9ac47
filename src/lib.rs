//! Stocktrace API Library
//!
//! Core of a warehouse scan-ledger backend: the inventory item lifecycle,
//! the transactional scan processor, PO fulfillment tracking, the
//! delete-request workflow, and the PO-number synchronization engine.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod audit;
pub mod auth;
pub mod commands;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod labels;
pub mod lifecycle;
pub mod logging;
pub mod migrator;
pub mod models;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::audit::AuditLogger;
use crate::auth::Authorization;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::labels::LabelRenderer;
use crate::services::{
    DeleteRequestService, PoSyncService, PurchaseOrderService, ReceivingService, ScanService,
};

/// Collaborators injected at the edges of the core.
pub struct Collaborators {
    pub authorization: Arc<dyn Authorization>,
    pub audit: Arc<dyn AuditLogger>,
    pub labels: Arc<dyn LabelRenderer>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            authorization: Arc::new(auth::AllowAll),
            audit: Arc::new(audit::TracingAuditLogger),
            labels: Arc::new(labels::NoopLabelRenderer),
        }
    }
}

/// The wired-up service layer.
#[derive(Clone)]
pub struct AppServices {
    pub scanning: ScanService,
    pub receiving: ReceivingService,
    pub deletions: DeleteRequestService,
    pub purchase_orders: PurchaseOrderService,
    pub po_sync: PoSyncService,
}

impl AppServices {
    pub fn build(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        collaborators: Collaborators,
        txn_timeout: Duration,
    ) -> Self {
        let po_sync = PoSyncService::new(db.clone());
        Self {
            scanning: ScanService::new(
                db.clone(),
                event_sender.clone(),
                collaborators.authorization.clone(),
                collaborators.audit.clone(),
                txn_timeout,
            ),
            receiving: ReceivingService::new(
                db.clone(),
                event_sender.clone(),
                collaborators.authorization.clone(),
                collaborators.audit.clone(),
                collaborators.labels.clone(),
            ),
            deletions: DeleteRequestService::new(
                db.clone(),
                event_sender.clone(),
                collaborators.authorization.clone(),
                collaborators.audit.clone(),
            ),
            purchase_orders: PurchaseOrderService::new(
                db,
                event_sender,
                collaborators.authorization,
                po_sync.clone(),
            ),
            po_sync,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub event_sender: Arc<EventSender>,
    pub services: AppServices,
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Minimal router; the full HTTP surface lives outside this crate.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}
