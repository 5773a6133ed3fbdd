//! Business logic services for the Restaurant POS Inventory Platform

pub mod alert;
pub mod grn;
pub mod ledger;
pub mod raw_material;
pub mod report;
pub mod vendor;

pub use alert::AlertService;
pub use grn::GrnService;
pub use ledger::LedgerService;
pub use raw_material::RawMaterialService;
pub use report::ReportService;
pub use vendor::VendorService;
