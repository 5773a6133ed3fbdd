//! Vendor registry service
//!
//! Suppliers are scoped to an outlet and referenced by goods receipts.
//! Deactivation is soft; GRN history keeps its vendor snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::TenantScope;

/// Vendor registry service
#[derive(Clone)]
pub struct VendorService {
    db: PgPool,
}

/// Supplier record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vendor {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub outlet_id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a vendor
#[derive(Debug, Deserialize)]
pub struct CreateVendorInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
}

impl VendorService {
    /// Create a new VendorService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a vendor
    pub async fn create(&self, scope: TenantScope, input: CreateVendorInput) -> AppResult<Vendor> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name must not be empty".to_string(),
            });
        }

        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM vendors WHERE outlet_id = $1 AND name = $2)",
        )
        .bind(scope.outlet_id)
        .bind(&name)
        .fetch_one(&self.db)
        .await?;

        if name_taken {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (restaurant_id, outlet_id, name, contact_person, phone, is_active)
            VALUES ($1, $2, $3, $4, $5, true)
            RETURNING id, restaurant_id, outlet_id, name, contact_person, phone,
                      is_active, created_at
            "#,
        )
        .bind(scope.restaurant_id)
        .bind(scope.outlet_id)
        .bind(&name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .fetch_one(&self.db)
        .await?;

        Ok(vendor)
    }

    /// List vendors for an outlet
    pub async fn list(&self, scope: TenantScope) -> AppResult<Vec<Vendor>> {
        let vendors = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT id, restaurant_id, outlet_id, name, contact_person, phone,
                   is_active, created_at
            FROM vendors
            WHERE outlet_id = $1
            ORDER BY name
            "#,
        )
        .bind(scope.outlet_id)
        .fetch_all(&self.db)
        .await?;

        Ok(vendors)
    }

    /// Get a vendor by id
    pub async fn get(&self, scope: TenantScope, vendor_id: Uuid) -> AppResult<Vendor> {
        let vendor = sqlx::query_as::<_, Vendor>(
            r#"
            SELECT id, restaurant_id, outlet_id, name, contact_person, phone,
                   is_active, created_at
            FROM vendors
            WHERE id = $1 AND outlet_id = $2
            "#,
        )
        .bind(vendor_id)
        .bind(scope.outlet_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor".to_string()))?;

        Ok(vendor)
    }

    /// Soft-deactivate a vendor
    pub async fn deactivate(&self, scope: TenantScope, vendor_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE vendors SET is_active = false WHERE id = $1 AND outlet_id = $2",
        )
        .bind(vendor_id)
        .bind(scope.outlet_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vendor".to_string()));
        }

        Ok(())
    }
}
