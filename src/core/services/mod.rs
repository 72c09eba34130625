pub mod invoice_service;
pub mod renter_service;
pub mod summary_service;

pub use invoice_service::InvoiceService;
pub use renter_service::RenterService;
pub use summary_service::{DashboardStats, MonthCollection, RenterStatement, SummaryService};
