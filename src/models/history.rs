use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::InventoryStatus;

/// One recorded status change on an inventory item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub status: InventoryStatus,
    pub timestamp: DateTime<Utc>,
    pub actor_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Append-only, insertion-ordered status history stored as a JSON column.
///
/// The last entry's status always mirrors the item's current status; entries
/// are never rewritten or removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct HistoryLog(pub Vec<HistoryEntry>);

impl HistoryLog {
    /// Starts a new log with its seed entry.
    pub fn seeded(status: InventoryStatus, actor_id: Uuid, notes: Option<String>) -> Self {
        let mut log = Self::default();
        log.append(status, actor_id, notes);
        log
    }

    pub fn append(&mut self, status: InventoryStatus, actor_id: Uuid, notes: Option<String>) {
        self.0.push(HistoryEntry {
            status,
            timestamp: Utc::now(),
            actor_id,
            notes,
        });
    }

    pub fn last_status(&self) -> Option<InventoryStatus> {
        self.0.last().map(|entry| entry.status)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.0
    }
}
