//! Pure transition rules for the inventory item lifecycle.
//!
//! Everything here is synchronous and store-agnostic; the scan and deletion
//! commands call into it before touching the database.

use crate::errors::ServiceError;
use crate::models::{CustomerStatus, HistoryLog, InventoryStatus};

/// Status restored when a delete request is rejected and the item's history
/// holds no non-pending entry to fall back to. Policy decision: such an item
/// is treated as still in custody.
pub const DEFAULT_REJECT_FALLBACK: InventoryStatus = InventoryStatus::In;

/// An item may be scanned out only while it is in custody.
pub fn can_scan_out(status: InventoryStatus) -> bool {
    status == InventoryStatus::In
}

/// Scanning in re-admits an item. Items pending deletion or flagged damaged
/// are frozen; an item already `IN` may be re-scanned (event without a
/// status change).
pub fn can_scan_in(status: InventoryStatus) -> bool {
    matches!(status, InventoryStatus::In | InventoryStatus::Out)
}

/// A delete request may be filed from any settled status.
pub fn can_request_delete(status: InventoryStatus) -> bool {
    matches!(
        status,
        InventoryStatus::In | InventoryStatus::Out | InventoryStatus::Damaged
    )
}

/// An item in custody or in transit can be flagged damaged; a parked or
/// already-damaged item cannot.
pub fn can_mark_damaged(status: InventoryStatus) -> bool {
    matches!(status, InventoryStatus::In | InventoryStatus::Out)
}

/// Validates a requested scan transition, naming the blocking status on
/// failure.
pub fn check_scan_transition(
    current: InventoryStatus,
    requested: InventoryStatus,
) -> Result<(), ServiceError> {
    let allowed = match requested {
        InventoryStatus::Out => can_scan_out(current),
        InventoryStatus::In => can_scan_in(current),
        _ => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(ServiceError::InvalidTransition { current, requested })
    }
}

/// Finds the status an item held before its pending delete was filed by
/// scanning history in reverse for the most recent non-pending entry.
pub fn prior_status(history: &HistoryLog, fallback: InventoryStatus) -> InventoryStatus {
    history
        .entries()
        .iter()
        .rev()
        .map(|entry| entry.status)
        .find(|status| *status != InventoryStatus::PendingDelete)
        .unwrap_or(fallback)
}

/// Validates a customer lifecycle move: `active → pending_delete` and
/// `pending_delete → {deleted, active}` only.
pub fn check_customer_transition(
    current: CustomerStatus,
    requested: CustomerStatus,
) -> Result<(), ServiceError> {
    let allowed = matches!(
        (current, requested),
        (CustomerStatus::Active, CustomerStatus::PendingDelete)
            | (CustomerStatus::PendingDelete, CustomerStatus::Deleted)
            | (CustomerStatus::PendingDelete, CustomerStatus::Active)
    );
    if allowed {
        Ok(())
    } else {
        Err(ServiceError::InvalidOperation(format!(
            "customer is {}, cannot move to {}",
            current, requested
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use uuid::Uuid;

    #[test_case(InventoryStatus::In, InventoryStatus::Out => true; "in to out")]
    #[test_case(InventoryStatus::Out, InventoryStatus::Out => false; "out to out")]
    #[test_case(InventoryStatus::PendingDelete, InventoryStatus::Out => false; "pending to out")]
    #[test_case(InventoryStatus::Damaged, InventoryStatus::Out => false; "damaged to out")]
    #[test_case(InventoryStatus::Out, InventoryStatus::In => true; "out to in")]
    #[test_case(InventoryStatus::In, InventoryStatus::In => true; "in to in is idempotent")]
    #[test_case(InventoryStatus::PendingDelete, InventoryStatus::In => false; "pending to in")]
    #[test_case(InventoryStatus::Damaged, InventoryStatus::In => false; "damaged to in")]
    fn scan_transition_table(current: InventoryStatus, requested: InventoryStatus) -> bool {
        check_scan_transition(current, requested).is_ok()
    }

    #[test_case(InventoryStatus::In => true)]
    #[test_case(InventoryStatus::Out => true)]
    #[test_case(InventoryStatus::Damaged => true)]
    #[test_case(InventoryStatus::PendingDelete => false)]
    fn delete_request_table(current: InventoryStatus) -> bool {
        can_request_delete(current)
    }

    #[test_case(InventoryStatus::In => true)]
    #[test_case(InventoryStatus::Out => true)]
    #[test_case(InventoryStatus::Damaged => false)]
    #[test_case(InventoryStatus::PendingDelete => false)]
    fn mark_damaged_table(current: InventoryStatus) -> bool {
        can_mark_damaged(current)
    }

    #[test]
    fn rejected_transition_names_blocking_status() {
        let err = check_scan_transition(InventoryStatus::Out, InventoryStatus::Out).unwrap_err();
        match err {
            ServiceError::InvalidTransition { current, .. } => {
                assert_eq!(current, InventoryStatus::Out)
            }
            other => panic!("expected InvalidTransition, got {other:?}"),
        }
    }

    #[test]
    fn prior_status_skips_pending_entries() {
        let actor = Uuid::new_v4();
        let mut log = HistoryLog::seeded(InventoryStatus::In, actor, None);
        log.append(InventoryStatus::Out, actor, None);
        log.append(InventoryStatus::PendingDelete, actor, Some("obsolete".into()));
        assert_eq!(prior_status(&log, DEFAULT_REJECT_FALLBACK), InventoryStatus::Out);
    }

    #[test]
    fn prior_status_falls_back_when_history_is_only_pending() {
        let actor = Uuid::new_v4();
        let log = HistoryLog::seeded(InventoryStatus::PendingDelete, actor, None);
        assert_eq!(prior_status(&log, DEFAULT_REJECT_FALLBACK), InventoryStatus::In);
    }

    #[test]
    fn history_appends_exactly_one_entry() {
        let actor = Uuid::new_v4();
        let mut log = HistoryLog::seeded(InventoryStatus::In, actor, None);
        let before = log.entries().to_vec();
        log.append(InventoryStatus::Out, actor, Some("gate 3".into()));
        assert_eq!(log.len(), before.len() + 1);
        assert_eq!(&log.entries()[..before.len()], &before[..]);
        assert_eq!(log.last_status(), Some(InventoryStatus::Out));
    }

    #[test]
    fn customer_transitions() {
        assert!(check_customer_transition(CustomerStatus::Active, CustomerStatus::PendingDelete).is_ok());
        assert!(check_customer_transition(CustomerStatus::PendingDelete, CustomerStatus::Active).is_ok());
        assert!(check_customer_transition(CustomerStatus::PendingDelete, CustomerStatus::Deleted).is_ok());
        assert!(check_customer_transition(CustomerStatus::Deleted, CustomerStatus::Active).is_err());
        assert!(check_customer_transition(CustomerStatus::Active, CustomerStatus::Deleted).is_err());
    }
}
