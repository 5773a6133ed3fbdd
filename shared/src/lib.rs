//! Shared domain logic for the Restaurant POS Inventory Platform
//!
//! This crate contains the pure, I/O-free parts of the inventory core:
//! unit conversion, weighted-average costing, low-stock crossing decisions,
//! variance arithmetic, and input validation shared across services.

pub mod alerting;
pub mod costing;
pub mod reporting;
pub mod units;
pub mod validation;

pub use alerting::*;
pub use costing::*;
pub use reporting::*;
pub use units::*;
pub use validation::*;
