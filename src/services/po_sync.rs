use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        customer::{self, Entity as Customer},
        inventory_item::{self, Entity as InventoryItem},
        part::{self, Entity as Part},
        purchase_order::{self, Entity as PurchaseOrder},
    },
    errors::ServiceError,
    models::PoNumberSet,
};

/// Counters for a completed resync pass. A second pass over consistent data
/// reports zero writes everywhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub parts_updated: u64,
    pub customers_updated: u64,
    pub items_updated: u64,
    pub pruned_po_numbers: u64,
}

impl SyncReport {
    pub fn total_writes(&self) -> u64 {
        self.parts_updated + self.customers_updated + self.items_updated
    }
}

/// A denormalized value that disagrees with the purchase-order source of
/// truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncMismatch {
    pub entity: String,
    pub entity_id: Uuid,
    pub field: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// A denormalized value with no backing purchase order at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOrphan {
    pub entity: String,
    pub entity_id: Uuid,
    pub field: String,
    pub value: String,
}

/// Read-only drift report: mismatches are errors, orphans are warnings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub mismatches: Vec<SyncMismatch>,
    pub orphans: Vec<SyncOrphan>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty() && self.orphans.is_empty()
    }
}

/// Keeps the denormalized PO number consistent across parts, customers, and
/// inventory items whenever a purchase order is created, renamed,
/// reassigned, or deleted.
///
/// The fan-out writes are deliberately independent (no cross-collection
/// transaction); `resync` and `validate` are the drift repair pass.
#[derive(Clone)]
pub struct PoSyncService {
    db: Arc<DbPool>,
}

impl PoSyncService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Fan-out after a purchase order is created: mirror the number onto the
    /// part and add it to the customer's set.
    #[instrument(skip(self, po), fields(po_number = %po.po_number))]
    pub async fn on_create(&self, po: &purchase_order::Model) -> Result<(), ServiceError> {
        self.set_part_mirror(po.part_id, Some(po.po_number.clone()))
            .await?;
        self.add_customer_number(po.customer_id, &po.po_number)
            .await?;
        Ok(())
    }

    /// Fan-out after a purchase order changed number, part, or customer.
    #[instrument(skip(self, po, previous), fields(po_number = %po.po_number))]
    pub async fn on_update(
        &self,
        po: &purchase_order::Model,
        previous: &purchase_order::Model,
    ) -> Result<(), ServiceError> {
        let number_changed = po.po_number != previous.po_number;

        if po.part_id != previous.part_id {
            self.set_part_mirror(previous.part_id, None).await?;
            self.set_part_mirror(po.part_id, Some(po.po_number.clone()))
                .await?;
        } else if number_changed {
            self.set_part_mirror(po.part_id, Some(po.po_number.clone()))
                .await?;
        }

        if po.customer_id != previous.customer_id {
            self.remove_customer_number(previous.customer_id, &previous.po_number)
                .await?;
            self.add_customer_number(po.customer_id, &po.po_number)
                .await?;
        } else if number_changed {
            self.remove_customer_number(po.customer_id, &previous.po_number)
                .await?;
            self.add_customer_number(po.customer_id, &po.po_number)
                .await?;
        }

        if number_changed {
            let updated = InventoryItem::update_many()
                .col_expr(
                    inventory_item::Column::PoNumber,
                    Expr::value(po.po_number.clone()),
                )
                .col_expr(inventory_item::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(inventory_item::Column::PoId.eq(po.id))
                .exec(&*self.db)
                .await?;
            info!(
                items = updated.rows_affected,
                old = %previous.po_number,
                new = %po.po_number,
                "propagated PO number change to inventory items"
            );
        }

        Ok(())
    }

    /// Fan-out after a purchase order is deleted: clear the part mirror and
    /// drop the number from the customer's set. Inventory items keep their
    /// historical number; deletion is blocked upstream while any item still
    /// references the PO.
    #[instrument(skip(self, po), fields(po_number = %po.po_number))]
    pub async fn on_delete(&self, po: &purchase_order::Model) -> Result<(), ServiceError> {
        self.set_part_mirror(po.part_id, None).await?;
        self.remove_customer_number(po.customer_id, &po.po_number)
            .await?;
        Ok(())
    }

    /// Full-corpus repair pass with the purchase-order collection as source
    /// of truth. Overwrites drifted part mirrors, rebuilds each customer's
    /// number set (pruning entries with no backing PO), and rewrites drifted
    /// item numbers. Idempotent.
    #[instrument(skip(self))]
    pub async fn resync(&self) -> Result<SyncReport, ServiceError> {
        let truth = self.load_source_of_truth().await?;
        let mut report = SyncReport::default();

        for part in Part::find().all(&*self.db).await? {
            let expected = truth.part_mirror.get(&part.id).cloned();
            if part.po_number != expected {
                let mut active: part::ActiveModel = part.into();
                active.po_number = Set(expected);
                active.updated_at = Set(Utc::now());
                active.update(&*self.db).await?;
                report.parts_updated += 1;
            }
        }

        for model in Customer::find().all(&*self.db).await? {
            let expected_numbers = truth
                .customer_numbers
                .get(&model.id)
                .cloned()
                .unwrap_or_default();
            let expected = PoNumberSet::new(expected_numbers);
            // Membership comparison: an order-permuted but equal set is not
            // drift and must not be rewritten.
            if !model.po_numbers.same_members(&expected) {
                let mut stale = model.po_numbers.clone();
                report.pruned_po_numbers +=
                    stale.retain(|n| truth.numbers.contains_key(n)) as u64;
                let mut active: customer::ActiveModel = model.into();
                active.po_numbers = Set(expected);
                active.updated_at = Set(Utc::now());
                active.update(&*self.db).await?;
                report.customers_updated += 1;
            }
        }

        for item in InventoryItem::find().all(&*self.db).await? {
            // A missing PO means the link is historical; leave it alone.
            if let Some(expected) = truth.po_number_by_id.get(&item.po_id) {
                if &item.po_number != expected {
                    let mut active: inventory_item::ActiveModel = item.into();
                    active.po_number = Set(expected.clone());
                    active.updated_at = Set(Utc::now());
                    active.update(&*self.db).await?;
                    report.items_updated += 1;
                }
            }
        }

        info!(
            parts = report.parts_updated,
            customers = report.customers_updated,
            items = report.items_updated,
            pruned = report.pruned_po_numbers,
            "resync pass complete"
        );
        Ok(report)
    }

    /// Read-only diff of every denormalized location against the
    /// purchase-order collection. Mutates nothing.
    #[instrument(skip(self))]
    pub async fn validate(&self) -> Result<ValidationReport, ServiceError> {
        let truth = self.load_source_of_truth().await?;
        let mut report = ValidationReport::default();

        for part in Part::find().all(&*self.db).await? {
            let expected = truth.part_mirror.get(&part.id).cloned();
            if part.po_number == expected {
                continue;
            }
            match &part.po_number {
                Some(actual) if !truth.numbers.contains_key(actual) => {
                    report.orphans.push(SyncOrphan {
                        entity: "part".into(),
                        entity_id: part.id,
                        field: "po_number".into(),
                        value: actual.clone(),
                    });
                }
                _ => report.mismatches.push(SyncMismatch {
                    entity: "part".into(),
                    entity_id: part.id,
                    field: "po_number".into(),
                    expected,
                    actual: part.po_number.clone(),
                }),
            }
        }

        for model in Customer::find().all(&*self.db).await? {
            let expected = truth
                .customer_numbers
                .get(&model.id)
                .cloned()
                .unwrap_or_default();
            for number in model.po_numbers.iter() {
                if !truth.numbers.contains_key(number) {
                    report.orphans.push(SyncOrphan {
                        entity: "customer".into(),
                        entity_id: model.id,
                        field: "po_numbers".into(),
                        value: number.to_string(),
                    });
                } else if !expected.iter().any(|n| n == number) {
                    report.mismatches.push(SyncMismatch {
                        entity: "customer".into(),
                        entity_id: model.id,
                        field: "po_numbers".into(),
                        expected: None,
                        actual: Some(number.to_string()),
                    });
                }
            }
            for number in &expected {
                if !model.po_numbers.contains(number) {
                    report.mismatches.push(SyncMismatch {
                        entity: "customer".into(),
                        entity_id: model.id,
                        field: "po_numbers".into(),
                        expected: Some(number.clone()),
                        actual: None,
                    });
                }
            }
        }

        for item in InventoryItem::find().all(&*self.db).await? {
            match truth.po_number_by_id.get(&item.po_id) {
                Some(expected) if &item.po_number != expected => {
                    report.mismatches.push(SyncMismatch {
                        entity: "inventory_item".into(),
                        entity_id: item.id,
                        field: "po_number".into(),
                        expected: Some(expected.clone()),
                        actual: Some(item.po_number.clone()),
                    });
                }
                None => report.orphans.push(SyncOrphan {
                    entity: "inventory_item".into(),
                    entity_id: item.id,
                    field: "po_number".into(),
                    value: item.po_number.clone(),
                }),
                _ => {}
            }
        }

        if !report.is_clean() {
            warn!(
                mismatches = report.mismatches.len(),
                orphans = report.orphans.len(),
                "PO number drift detected"
            );
        }
        Ok(report)
    }

    async fn load_source_of_truth(&self) -> Result<SourceOfTruth, ServiceError> {
        let pos = PurchaseOrder::find().all(&*self.db).await?;

        let mut truth = SourceOfTruth::default();
        for po in &pos {
            truth.numbers.insert(po.po_number.clone(), po.id);
            truth.po_number_by_id.insert(po.id, po.po_number.clone());
            truth
                .customer_numbers
                .entry(po.customer_id)
                .or_default()
                .push(po.po_number.clone());
        }
        // The part mirror holds the most recently touched PO designating it.
        let mut latest: HashMap<Uuid, chrono::DateTime<Utc>> = HashMap::new();
        for po in &pos {
            let newer = latest
                .get(&po.part_id)
                .map(|seen| po.updated_at > *seen)
                .unwrap_or(true);
            if newer {
                latest.insert(po.part_id, po.updated_at);
                truth.part_mirror.insert(po.part_id, po.po_number.clone());
            }
        }
        Ok(truth)
    }

    async fn set_part_mirror(
        &self,
        part_id: Uuid,
        po_number: Option<String>,
    ) -> Result<(), ServiceError> {
        let Some(model) = Part::find_by_id(part_id).one(&*self.db).await? else {
            warn!(%part_id, "sync target part not found");
            return Ok(());
        };
        if model.po_number == po_number {
            return Ok(());
        }
        let mut active: part::ActiveModel = model.into();
        active.po_number = Set(po_number);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;
        Ok(())
    }

    async fn add_customer_number(
        &self,
        customer_id: Uuid,
        po_number: &str,
    ) -> Result<(), ServiceError> {
        let Some(model) = Customer::find_by_id(customer_id).one(&*self.db).await? else {
            warn!(%customer_id, "sync target customer not found");
            return Ok(());
        };
        let mut numbers = model.po_numbers.clone();
        if !numbers.insert(po_number) {
            return Ok(());
        }
        let mut active: customer::ActiveModel = model.into();
        active.po_numbers = Set(numbers);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;
        Ok(())
    }

    async fn remove_customer_number(
        &self,
        customer_id: Uuid,
        po_number: &str,
    ) -> Result<(), ServiceError> {
        let Some(model) = Customer::find_by_id(customer_id).one(&*self.db).await? else {
            warn!(%customer_id, "sync target customer not found");
            return Ok(());
        };
        let mut numbers = model.po_numbers.clone();
        if !numbers.remove(po_number) {
            return Ok(());
        }
        let mut active: customer::ActiveModel = model.into();
        active.po_numbers = Set(numbers);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;
        Ok(())
    }
}

#[derive(Default)]
struct SourceOfTruth {
    numbers: HashMap<String, Uuid>,
    po_number_by_id: HashMap<Uuid, String>,
    part_mirror: HashMap<Uuid, String>,
    customer_numbers: HashMap<Uuid, Vec<String>>,
}
