pub mod delete_request;
pub mod history;
pub mod po_numbers;
pub mod status;

pub use delete_request::{DeleteRequest, DeleteRequestStatus};
pub use history::{HistoryEntry, HistoryLog};
pub use po_numbers::PoNumberSet;
pub use status::{derive_po_status, CustomerStatus, InventoryStatus, PoStatus, ReportType};
