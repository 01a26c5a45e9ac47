pub mod customer;
pub mod inventory_item;
pub mod part;
pub mod purchase_order;
pub mod report;
