use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use stocktrace_api::{
    auth::AuthenticatedUser,
    commands::receiving::ReceiveItemResult,
    db::{self, DbConfig, DbPool},
    entities::{customer, part, purchase_order},
    events,
    models::{CustomerStatus, PoNumberSet},
    services::{purchase_orders::CreatePurchaseOrderInput, receiving::ReceiveItemInput},
    AppServices, Collaborators,
};

/// Harness for spinning up the service layer against an in-memory SQLite
/// database. One connection keeps the database alive for the lifetime of
/// the harness and isolates it from other tests.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let cfg = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");
        let pool = Arc::new(pool);

        let (event_sender, event_rx) = events::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::build(
            pool.clone(),
            Arc::new(event_sender),
            Collaborators::default(),
            Duration::from_secs(10),
        );

        Self {
            db: pool,
            services,
            _event_task: event_task,
        }
    }

    /// The default warehouse operator used across tests.
    pub fn operator() -> AuthenticatedUser {
        AuthenticatedUser::system("test-operator")
    }

    pub async fn seed_customer(&self, name: &str, code: &str) -> customer::Model {
        let now = Utc::now();
        customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            code: Set(code.to_string()),
            po_numbers: Set(PoNumberSet::default()),
            status: Set(CustomerStatus::Active),
            delete_request: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .expect("seed customer for tests")
    }

    pub async fn seed_part(&self, customer_id: Uuid, part_number: &str) -> part::Model {
        let now = Utc::now();
        part::ActiveModel {
            id: Set(Uuid::new_v4()),
            part_number: Set(part_number.to_string()),
            name: Set(format!("Test Part {}", part_number)),
            customer_id: Set(customer_id),
            supplier_id: Set("SUP01".to_string()),
            supplier_part_number: Set(format!("SPN-{}", part_number)),
            po_number: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .expect("seed part for tests")
    }

    /// Creates a purchase order through the service so the sync engine's
    /// fan-out runs like it would in production.
    pub async fn create_po(
        &self,
        po_number: &str,
        part_id: Uuid,
        customer_id: Uuid,
        total_quantity: i32,
    ) -> purchase_order::Model {
        self.services
            .purchase_orders
            .create_purchase_order(
                CreatePurchaseOrderInput {
                    po_number: po_number.to_string(),
                    part_id,
                    customer_id,
                    total_quantity,
                },
                &Self::operator(),
            )
            .await
            .expect("seed purchase order for tests")
    }

    /// Receives one item against a PO with a distinct barcode per lot.
    pub async fn receive(
        &self,
        po_id: Uuid,
        part_id: Uuid,
        quantity: i32,
        lot_id: &str,
    ) -> ReceiveItemResult {
        self.services
            .receiving
            .receive_item(
                ReceiveItemInput {
                    po_id,
                    part_id,
                    quantity,
                    lot_id: lot_id.to_string(),
                    gate_id: Some("GATE-1".to_string()),
                    location: Some("A-01".to_string()),
                    barcode: Some(format!("BC-{}", lot_id)),
                    notes: None,
                },
                &Self::operator(),
            )
            .await
            .expect("receive item for tests")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}
