use chrono::Datelike;

use crate::entities::part;

pub mod receive_item_command;

pub use receive_item_command::{ReceiveItemCommand, ReceiveItemResult};

/// Builds the label identifier for a received unit:
/// `UML-{supplier part number}-{supplier id}-{quantity}-{lot}/{year}`.
pub fn build_unique_id(part: &part::Model, quantity: i32, lot_id: &str) -> String {
    let year = chrono::Utc::now().year();
    format!(
        "UML-{}-{}-{}-{}/{}",
        part.supplier_part_number, part.supplier_id, quantity, lot_id, year
    )
}
