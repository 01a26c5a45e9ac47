use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resolution state of a delete request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
pub enum DeleteRequestStatus {
    #[strum(serialize = "pending")]
    Pending,
    #[strum(serialize = "approved")]
    Approved,
    #[strum(serialize = "rejected")]
    Rejected,
}

/// Two-phase delete request, stored as a JSON sub-record on the entity it
/// targets. Resolved requests stay populated as an audit trail.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct DeleteRequest {
    pub requested_by: Uuid,
    pub reason: String,
    pub requested_at: DateTime<Utc>,
    pub status: DeleteRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl DeleteRequest {
    pub fn pending(requested_by: Uuid, reason: String) -> Self {
        Self {
            requested_by,
            reason,
            requested_at: Utc::now(),
            status: DeleteRequestStatus::Pending,
            resolved_by: None,
            resolved_at: None,
            notes: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == DeleteRequestStatus::Pending
    }

    /// Stamps the request as resolved. The caller has already verified it is
    /// still pending.
    pub fn resolve(
        &mut self,
        status: DeleteRequestStatus,
        resolved_by: Uuid,
        notes: Option<String>,
    ) {
        self.status = status;
        self.resolved_by = Some(resolved_by);
        self.resolved_at = Some(Utc::now());
        self.notes = notes;
    }
}
