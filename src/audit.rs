//! Audit-log collaborator boundary.
//!
//! Audit entries are written after a transaction commits, as a best-effort
//! side channel. A failing audit sink never fails or rolls back the
//! operation that produced the entry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor_id: Uuid,
    pub actor_name: String,
    pub action: String,
    pub details: String,
    pub resource_type: String,
    pub resource_id: String,
}

#[async_trait]
pub trait AuditLogger: Send + Sync {
    async fn log(&self, entry: AuditEntry) -> Result<(), ServiceError>;
}

/// Default sink that emits audit entries as structured log lines.
#[derive(Debug, Default, Clone)]
pub struct TracingAuditLogger;

#[async_trait]
impl AuditLogger for TracingAuditLogger {
    async fn log(&self, entry: AuditEntry) -> Result<(), ServiceError> {
        info!(
            actor = %entry.actor_name,
            action = %entry.action,
            resource_type = %entry.resource_type,
            resource_id = %entry.resource_id,
            details = %entry.details,
            "audit"
        );
        Ok(())
    }
}

/// Dispatches an audit entry outside the caller's transaction boundary.
/// Failures are logged and swallowed.
pub fn dispatch_audit(logger: Arc<dyn AuditLogger>, entry: AuditEntry) {
    tokio::spawn(async move {
        if let Err(e) = logger.log(entry).await {
            warn!(error = %e, "audit log write failed");
        }
    });
}
