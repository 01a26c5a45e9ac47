use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{part, purchase_order};
use crate::errors::ServiceError;

pub mod approve_customer_delete_command;
pub mod approve_item_delete_command;
pub mod reject_customer_delete_command;
pub mod reject_item_delete_command;
pub mod request_customer_delete_command;
pub mod request_item_delete_command;

pub use approve_customer_delete_command::ApproveCustomerDeleteCommand;
pub use approve_item_delete_command::ApproveItemDeleteCommand;
pub use reject_customer_delete_command::RejectCustomerDeleteCommand;
pub use reject_item_delete_command::RejectItemDeleteCommand;
pub use request_customer_delete_command::RequestCustomerDeleteCommand;
pub use request_item_delete_command::RequestItemDeleteCommand;

/// Counts the parts and purchase orders still referencing a customer.
/// A customer may only be deleted when both counts are zero; the check runs
/// at request time and again at approval time, since references may have
/// appeared in between.
pub(crate) async fn customer_reference_counts<C: ConnectionTrait>(
    conn: &C,
    customer_id: Uuid,
) -> Result<(u64, u64), ServiceError> {
    let parts = part::Entity::find()
        .filter(part::Column::CustomerId.eq(customer_id))
        .count(conn)
        .await?;
    let purchase_orders = purchase_order::Entity::find()
        .filter(purchase_order::Column::CustomerId.eq(customer_id))
        .count(conn)
        .await?;
    Ok((parts, purchase_orders))
}

pub(crate) fn ensure_no_customer_references(
    parts: u64,
    purchase_orders: u64,
) -> Result<(), ServiceError> {
    if parts > 0 || purchase_orders > 0 {
        return Err(ServiceError::ReferentialIntegrity {
            message: format!(
                "Customer cannot be deleted ({} part(s), {} purchase order(s) still reference it)",
                parts, purchase_orders
            ),
            parts,
            purchase_orders,
            items: 0,
        });
    }
    Ok(())
}
