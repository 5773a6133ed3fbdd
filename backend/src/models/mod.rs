//! Domain models for the Restaurant POS Inventory Platform
//!
//! Re-exports pure domain types from the shared crate and adds
//! backend-specific models

pub use shared::*;

use uuid::Uuid;

/// Tenant scope every inventory row is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    pub restaurant_id: Uuid,
    pub outlet_id: Uuid,
}

impl TenantScope {
    pub fn new(restaurant_id: Uuid, outlet_id: Uuid) -> Self {
        Self {
            restaurant_id,
            outlet_id,
        }
    }
}

impl From<&crate::middleware::AuthUser> for TenantScope {
    fn from(user: &crate::middleware::AuthUser) -> Self {
        Self {
            restaurant_id: user.restaurant_id,
            outlet_id: user.outlet_id,
        }
    }
}
