pub mod deletions;
pub mod po_sync;
pub mod purchase_orders;
pub mod receiving;
pub mod scanning;

pub use deletions::DeleteRequestService;
pub use po_sync::PoSyncService;
pub use purchase_orders::PurchaseOrderService;
pub use receiving::ReceivingService;
pub use scanning::ScanService;
