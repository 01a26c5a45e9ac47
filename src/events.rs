use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Domain events emitted after a committed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ItemReceived {
        item_id: Uuid,
        po_id: Uuid,
        quantity: i32,
    },
    ItemScannedIn {
        item_id: Uuid,
        status_changed: bool,
    },
    ItemScannedOut {
        item_id: Uuid,
    },
    ItemMarkedDamaged {
        item_id: Uuid,
    },
    ItemDeleteRequested {
        item_id: Uuid,
    },
    ItemDeleteApproved {
        item_id: Uuid,
    },
    ItemDeleteRejected {
        item_id: Uuid,
    },
    CustomerDeleteRequested {
        customer_id: Uuid,
    },
    CustomerDeleteApproved {
        customer_id: Uuid,
    },
    CustomerDeleteRejected {
        customer_id: Uuid,
    },
    PurchaseOrderCreated(Uuid),
    PurchaseOrderUpdated {
        po_id: Uuid,
        po_number_changed: bool,
    },
    PurchaseOrderCancelled(Uuid),
    PurchaseOrderDeleted(Uuid),
}

/// Cloneable handle over the event channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a bounded event channel.
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        debug!(?event, "processing domain event");
    }
    warn!("event channel closed, stopping event processor");
}
