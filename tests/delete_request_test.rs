mod common;

use common::TestApp;
use stocktrace_api::commands::scanning::ScanIdentifier;
use stocktrace_api::errors::ServiceError;
use stocktrace_api::models::{CustomerStatus, DeleteRequestStatus, InventoryStatus, PoStatus};

#[tokio::test]
async fn item_delete_request_marks_pending_and_blocks_scans() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    let item = app
        .services
        .deletions
        .request_item_delete(received.item_id, "damaged on arrival".to_string(), &operator)
        .await
        .expect("request delete");

    assert_eq!(item.status, InventoryStatus::PendingDelete);
    let request = item.delete_request.expect("request stored");
    assert_eq!(request.status, DeleteRequestStatus::Pending);
    assert_eq!(request.reason, "damaged on arrival");

    // A parked item cannot move through the gates.
    let err = app
        .services
        .scanning
        .scan_out(ScanIdentifier::Raw(received.unique_id), &operator, None)
        .await
        .expect_err("scan of a parked item must fail");
    assert!(matches!(err, ServiceError::InvalidTransition { .. }));
    let err = app
        .services
        .scanning
        .scan_in(received.item_id, &operator, None)
        .await
        .expect_err("scan in of a parked item must fail");
    assert!(matches!(err, ServiceError::InvalidTransition { .. }));
}

#[tokio::test]
async fn duplicate_pending_request_conflicts() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    app.services
        .deletions
        .request_item_delete(received.item_id, "first".to_string(), &operator)
        .await
        .expect("first request");
    let err = app
        .services
        .deletions
        .request_item_delete(received.item_id, "second".to_string(), &operator)
        .await
        .expect_err("second request must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn empty_reason_is_rejected() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    let err = app
        .services
        .deletions
        .request_item_delete(received.item_id, String::new(), &operator)
        .await
        .expect_err("empty reason must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn rejecting_restores_the_pre_request_status() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    // The item was OUT when the request was filed, so rejection puts it
    // back OUT rather than IN.
    app.services
        .scanning
        .scan_out(
            ScanIdentifier::Raw(received.unique_id.clone()),
            &operator,
            None,
        )
        .await
        .expect("scan out");
    app.services
        .deletions
        .request_item_delete(received.item_id, "mis-filed".to_string(), &operator)
        .await
        .expect("request delete");

    let item = app
        .services
        .deletions
        .reject_item_delete(
            received.item_id,
            &operator,
            Some("still in rotation".to_string()),
        )
        .await
        .expect("reject delete");

    assert_eq!(item.status, InventoryStatus::Out);
    let request = item.delete_request.expect("resolved request kept");
    assert_eq!(request.status, DeleteRequestStatus::Rejected);
    assert_eq!(request.notes.as_deref(), Some("still in rotation"));
    assert!(request.resolved_at.is_some());
}

#[tokio::test]
async fn resolving_twice_conflicts() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    app.services
        .deletions
        .request_item_delete(received.item_id, "mis-filed".to_string(), &operator)
        .await
        .expect("request delete");
    app.services
        .deletions
        .reject_item_delete(received.item_id, &operator, None)
        .await
        .expect("first rejection");

    let err = app
        .services
        .deletions
        .reject_item_delete(received.item_id, &operator, None)
        .await
        .expect_err("second rejection must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));
    let err = app
        .services
        .deletions
        .approve_item_delete(received.item_id, &operator)
        .await
        .expect_err("approval after rejection must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn approving_deletes_the_item_and_releases_po_capacity() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 20, "LOT-A").await;
    assert_eq!(received.po_status, PoStatus::Partial);

    app.services
        .deletions
        .request_item_delete(received.item_id, "wrong lot".to_string(), &operator)
        .await
        .expect("request delete");
    app.services
        .deletions
        .approve_item_delete(received.item_id, &operator)
        .await
        .expect("approve delete");

    let err = app
        .services
        .scanning
        .get_item(received.item_id)
        .await
        .expect_err("item is gone");
    assert!(matches!(err, ServiceError::NotFound(_)));

    // The PO got its capacity back.
    let po = app
        .services
        .purchase_orders
        .get_purchase_order(po.id)
        .await
        .expect("po lookup");
    assert_eq!(po.delivered_quantity, 0);
    assert_eq!(po.status, PoStatus::Open);
}

#[tokio::test]
async fn approval_without_a_pending_request_conflicts() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    let err = app
        .services
        .deletions
        .approve_item_delete(received.item_id, &operator)
        .await
        .expect_err("no pending request to approve");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn customer_delete_workflow_soft_deletes() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Orphan Inc", "ORPH").await;

    let pending = app
        .services
        .deletions
        .request_customer_delete(customer.id, "account closed".to_string(), &operator)
        .await
        .expect("request customer delete");
    assert_eq!(pending.status, CustomerStatus::PendingDelete);

    let deleted = app
        .services
        .deletions
        .approve_customer_delete(customer.id, &operator)
        .await
        .expect("approve customer delete");
    assert_eq!(deleted.status, CustomerStatus::Deleted);
    assert_eq!(
        deleted.delete_request.expect("request kept").status,
        DeleteRequestStatus::Approved
    );

    // A deleted customer cannot be re-requested.
    let err = app
        .services
        .deletions
        .request_customer_delete(customer.id, "again".to_string(), &operator)
        .await
        .expect_err("request on deleted customer must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn customer_with_references_cannot_be_requested() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    app.create_po("PO-100", part.id, customer.id, 50).await;

    let err = app
        .services
        .deletions
        .request_customer_delete(customer.id, "cleanup".to_string(), &operator)
        .await
        .expect_err("referenced customer must not be deletable");
    match err {
        ServiceError::ReferentialIntegrity {
            parts,
            purchase_orders,
            items,
            ..
        } => {
            assert_eq!(parts, 1);
            assert_eq!(purchase_orders, 1);
            assert_eq!(items, 0);
        }
        other => panic!("expected ReferentialIntegrity, got {:?}", other),
    }
}

#[tokio::test]
async fn references_added_after_the_request_block_approval() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    app.services
        .deletions
        .request_customer_delete(customer.id, "cleanup".to_string(), &operator)
        .await
        .expect("request customer delete");

    // A part arrives while the request is pending.
    app.seed_part(customer.id, "P-2002").await;

    let err = app
        .services
        .deletions
        .approve_customer_delete(customer.id, &operator)
        .await
        .expect_err("approval must re-check references");
    assert!(matches!(err, ServiceError::ReferentialIntegrity { .. }));
}

#[tokio::test]
async fn rejecting_a_customer_request_restores_active() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    app.services
        .deletions
        .request_customer_delete(customer.id, "cleanup".to_string(), &operator)
        .await
        .expect("request customer delete");

    let restored = app
        .services
        .deletions
        .reject_customer_delete(customer.id, &operator, Some("keep the account".to_string()))
        .await
        .expect("reject customer delete");
    assert_eq!(restored.status, CustomerStatus::Active);
    assert_eq!(
        restored.delete_request.expect("request kept").status,
        DeleteRequestStatus::Rejected
    );
}
