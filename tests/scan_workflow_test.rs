mod common;

use chrono::Utc;
use common::TestApp;
use sea_orm::{ConnectionTrait, DatabaseBackend, EntityTrait, Statement};
use stocktrace_api::commands::scanning::{persist_status_change, ScanIdentifier};
use stocktrace_api::entities::inventory_item::Entity as InventoryItem;
use stocktrace_api::errors::ServiceError;
use stocktrace_api::models::{InventoryStatus, ReportType};

#[tokio::test]
async fn scan_out_moves_item_out_and_writes_report() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    let result = app
        .services
        .scanning
        .scan_out(
            ScanIdentifier::Raw(received.unique_id.clone()),
            &operator,
            Some("outbound to line 3".to_string()),
        )
        .await
        .expect("scan out should succeed");

    assert_eq!(result.status, InventoryStatus::Out);
    assert!(result.status_changed);

    let item = app
        .services
        .scanning
        .get_item(result.item_id)
        .await
        .expect("item still exists");
    assert_eq!(item.status, InventoryStatus::Out);
    assert_eq!(item.history.last_status(), Some(InventoryStatus::Out));

    let reports = app
        .services
        .scanning
        .reports_for_item(result.item_id)
        .await
        .expect("reports query");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_type, ReportType::ScanOut);
    assert_eq!(reports[0].item_unique_id, received.unique_id);
    assert_eq!(reports[0].customer_name, "Acme Corp");
    assert_eq!(reports[0].po_number, "PO-100");
    assert_eq!(reports[0].notes.as_deref(), Some("outbound to line 3"));
}

#[tokio::test]
async fn double_scan_out_is_rejected_and_leaves_item_untouched() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    app.services
        .scanning
        .scan_out(
            ScanIdentifier::Raw(received.unique_id.clone()),
            &operator,
            None,
        )
        .await
        .expect("first scan out");

    let err = app
        .services
        .scanning
        .scan_out(ScanIdentifier::Raw(received.unique_id), &operator, None)
        .await
        .expect_err("second scan out must fail");

    match err {
        ServiceError::InvalidTransition { current, requested } => {
            assert_eq!(current, InventoryStatus::Out);
            assert_eq!(requested, InventoryStatus::Out);
        }
        other => panic!("expected InvalidTransition, got {:?}", other),
    }

    // The failed scan left no trace: status and ledger are unchanged.
    let item = app
        .services
        .scanning
        .get_item(received.item_id)
        .await
        .expect("item lookup");
    assert_eq!(item.status, InventoryStatus::Out);
    assert_eq!(item.history.len(), 2);
    let reports = app
        .services
        .scanning
        .reports_for_item(received.item_id)
        .await
        .expect("reports query");
    assert_eq!(reports.len(), 1);
}

#[tokio::test]
async fn scan_in_of_item_already_in_is_idempotent_but_ledgered() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    let result = app
        .services
        .scanning
        .scan_in(received.item_id, &operator, None)
        .await
        .expect("scan in of an IN item succeeds");

    assert_eq!(result.status, InventoryStatus::In);
    assert!(!result.status_changed);

    let item = app
        .services
        .scanning
        .get_item(received.item_id)
        .await
        .expect("item lookup");
    // No status change means no history append, but the ledger still
    // records that the scan happened.
    assert_eq!(item.history.len(), 1);
    let reports = app
        .services
        .scanning
        .reports_for_item(received.item_id)
        .await
        .expect("reports query");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report_type, ReportType::ScanIn);
}

#[tokio::test]
async fn scan_in_after_scan_out_returns_item_to_stock() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    app.services
        .scanning
        .scan_out(ScanIdentifier::Raw(received.unique_id), &operator, None)
        .await
        .expect("scan out");
    let result = app
        .services
        .scanning
        .scan_in(received.item_id, &operator, Some("returned".to_string()))
        .await
        .expect("scan in");

    assert_eq!(result.status, InventoryStatus::In);
    assert!(result.status_changed);

    let item = app
        .services
        .scanning
        .get_item(received.item_id)
        .await
        .expect("item lookup");
    assert_eq!(item.status, InventoryStatus::In);
    assert_eq!(item.history.len(), 3);
    let reports = app
        .services
        .scanning
        .reports_for_item(received.item_id)
        .await
        .expect("reports query");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].report_type, ReportType::ScanOut);
    assert_eq!(reports[1].report_type, ReportType::ScanIn);
}

#[tokio::test]
async fn raw_identifier_resolves_payload_and_barcode() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    let item = app
        .services
        .scanning
        .get_item(received.item_id)
        .await
        .expect("item lookup");
    let payload = item.qr_payload.clone().expect("payload present");
    let barcode = item.barcode.clone().expect("barcode present");

    // Serialized QR payload resolves the item.
    let result = app
        .services
        .scanning
        .scan_out(ScanIdentifier::Raw(payload), &operator, None)
        .await
        .expect("scan by payload");
    assert_eq!(result.item_id, received.item_id);

    app.services
        .scanning
        .scan_in(received.item_id, &operator, None)
        .await
        .expect("scan back in");

    // Barcode resolves it too.
    let result = app
        .services
        .scanning
        .scan_out(ScanIdentifier::Raw(barcode), &operator, None)
        .await
        .expect("scan by barcode");
    assert_eq!(result.item_id, received.item_id);
}

#[tokio::test]
async fn unknown_identifier_is_not_found() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let err = app
        .services
        .scanning
        .scan_out(
            ScanIdentifier::Raw("no-such-label".to_string()),
            &operator,
            None,
        )
        .await
        .expect_err("unknown identifier must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn failed_report_insert_rolls_back_the_item_mutation() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    // Breaking the ledger table makes the report insert fail mid-transaction.
    app.db
        .execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            "DROP TABLE reports;".to_string(),
        ))
        .await
        .expect("drop reports table");

    let err = app
        .services
        .scanning
        .scan_out(ScanIdentifier::Raw(received.unique_id), &operator, None)
        .await
        .expect_err("scan must fail without the ledger");
    assert!(matches!(err, ServiceError::DatabaseError(_)));

    // The item mutation rolled back with it.
    let item = InventoryItem::find_by_id(received.item_id)
        .one(&*app.db)
        .await
        .expect("item query")
        .expect("item exists");
    assert_eq!(item.status, InventoryStatus::In);
    assert_eq!(item.history.len(), 1);
}

#[tokio::test]
async fn stale_status_write_is_rejected_as_concurrent_modification() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    // Snapshot the item, then let another scan commit behind the
    // snapshot's back.
    let stale = app
        .services
        .scanning
        .get_item(received.item_id)
        .await
        .expect("snapshot");
    assert_eq!(stale.status, InventoryStatus::In);
    app.services
        .scanning
        .scan_out(ScanIdentifier::Raw(received.unique_id), &operator, None)
        .await
        .expect("interleaving scan");

    // The status-keyed write sees zero matching rows and refuses to
    // overwrite the committed history.
    let mut history = stale.history.clone();
    history.append(InventoryStatus::Out, operator.id, None);
    let err = persist_status_change(&*app.db, &stale, InventoryStatus::Out, history, Utc::now())
        .await
        .expect_err("stale write must be rejected");
    match err {
        ServiceError::ConcurrentModification(id) => assert_eq!(id, stale.id),
        other => panic!("expected ConcurrentModification, got {:?}", other),
    }

    let item = app
        .services
        .scanning
        .get_item(received.item_id)
        .await
        .expect("item lookup");
    assert_eq!(item.status, InventoryStatus::Out);
    assert_eq!(item.history.len(), 2);
}

#[tokio::test]
async fn marking_an_item_damaged_freezes_it_for_scanning() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    let item = app
        .services
        .scanning
        .mark_damaged(received.item_id, &operator, "crushed corner".to_string())
        .await
        .expect("mark damaged");
    assert_eq!(item.status, InventoryStatus::Damaged);
    assert_eq!(item.history.len(), 2);
    assert_eq!(item.history.last_status(), Some(InventoryStatus::Damaged));

    let err = app
        .services
        .scanning
        .scan_out(ScanIdentifier::Raw(received.unique_id), &operator, None)
        .await
        .expect_err("a damaged item cannot be scanned out");
    assert!(matches!(
        err,
        ServiceError::InvalidTransition {
            current: InventoryStatus::Damaged,
            ..
        }
    ));

    let err = app
        .services
        .scanning
        .scan_in(received.item_id, &operator, None)
        .await
        .expect_err("a damaged item cannot be scanned in");
    assert!(matches!(
        err,
        ServiceError::InvalidTransition {
            current: InventoryStatus::Damaged,
            ..
        }
    ));

    // Damage is a custody note, not a scan: the ledger stays empty.
    let reports = app
        .services
        .scanning
        .reports_for_item(received.item_id)
        .await
        .expect("reports query");
    assert!(reports.is_empty());
}

#[tokio::test]
async fn marking_damaged_twice_is_rejected() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    app.services
        .scanning
        .mark_damaged(received.item_id, &operator, "crushed corner".to_string())
        .await
        .expect("first mark");

    let err = app
        .services
        .scanning
        .mark_damaged(received.item_id, &operator, "still crushed".to_string())
        .await
        .expect_err("second mark must fail");
    assert!(matches!(
        err,
        ServiceError::InvalidTransition {
            current: InventoryStatus::Damaged,
            requested: InventoryStatus::Damaged,
        }
    ));
}

#[tokio::test]
async fn damage_notes_are_required() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    let err = app
        .services
        .scanning
        .mark_damaged(received.item_id, &operator, String::new())
        .await
        .expect_err("empty notes must fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn rejected_delete_of_a_damaged_item_restores_damaged() {
    let app = TestApp::new().await;
    let operator = TestApp::operator();

    let customer = app.seed_customer("Acme Corp", "ACME").await;
    let part = app.seed_part(customer.id, "P-1001").await;
    let po = app.create_po("PO-100", part.id, customer.id, 50).await;
    let received = app.receive(po.id, part.id, 5, "LOT-A").await;

    app.services
        .scanning
        .mark_damaged(received.item_id, &operator, "crushed corner".to_string())
        .await
        .expect("mark damaged");
    let item = app
        .services
        .deletions
        .request_item_delete(received.item_id, "write-off".to_string(), &operator)
        .await
        .expect("delete request from damaged");
    assert_eq!(item.status, InventoryStatus::PendingDelete);

    let item = app
        .services
        .deletions
        .reject_item_delete(received.item_id, &operator, None)
        .await
        .expect("reject");
    assert_eq!(item.status, InventoryStatus::Damaged);
}
