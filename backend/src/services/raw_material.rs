//! Raw material registry service
//!
//! Master data for everything the kitchen stocks: identity, units and
//! conversion factor, costing snapshot, active flag and low-stock threshold.
//! Stock quantity is never stored here; it is always derived from the
//! inventory ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    validate_compatibility, validate_conversion_factor, validate_material_code,
    validate_threshold, BaseUnit, PurchaseUnit, TenantScope,
};
use crate::services::alert;

/// Raw material registry service
#[derive(Clone)]
pub struct RawMaterialService {
    db: PgPool,
}

/// Raw material master record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RawMaterial {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub outlet_id: Uuid,
    pub name: String,
    pub code: String,
    pub category: String,
    pub base_unit: String,
    pub purchase_unit: String,
    pub conversion_factor: Decimal,
    /// Weighted-average cost per base unit
    pub average_cost: Decimal,
    /// Cost per base unit of the most recent purchase
    pub last_purchase_cost: Decimal,
    pub is_active: bool,
    pub low_stock_threshold: Option<Decimal>,
    pub is_perishable: bool,
    pub shelf_life_in_days: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RawMaterial {
    /// Parsed purchase unit; registry writes guarantee the stored value
    pub fn purchase_unit_parsed(&self) -> AppResult<PurchaseUnit> {
        self.purchase_unit
            .parse()
            .map_err(|e| AppError::Internal(format!("corrupt purchase unit: {}", e)))
    }

    /// Parsed base unit; registry writes guarantee the stored value
    pub fn base_unit_parsed(&self) -> AppResult<BaseUnit> {
        self.base_unit
            .parse()
            .map_err(|e| AppError::Internal(format!("corrupt base unit: {}", e)))
    }
}

/// Input for registering a raw material
#[derive(Debug, Deserialize)]
pub struct CreateRawMaterialInput {
    pub name: String,
    pub code: String,
    pub category: String,
    pub base_unit: BaseUnit,
    pub purchase_unit: PurchaseUnit,
    pub conversion_factor: Decimal,
    pub low_stock_threshold: Option<Decimal>,
    pub is_perishable: Option<bool>,
    pub shelf_life_in_days: Option<i32>,
}

/// Input for changing the low-stock threshold
#[derive(Debug, Deserialize)]
pub struct UpdateThresholdInput {
    /// New threshold in base units; null clears the threshold
    pub low_stock_threshold: Option<Decimal>,
}

/// Costing snapshot entry served to pricing collaborators
#[derive(Debug, Clone, Serialize)]
pub struct CostSnapshot {
    pub average_cost: Decimal,
}

/// Input for the cost snapshot lookup
#[derive(Debug, Deserialize)]
pub struct CostSnapshotInput {
    pub raw_material_ids: Vec<Uuid>,
}

impl RawMaterialService {
    /// Create a new RawMaterialService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Register a raw material
    pub async fn create(
        &self,
        scope: TenantScope,
        input: CreateRawMaterialInput,
    ) -> AppResult<RawMaterial> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name must not be empty".to_string(),
            });
        }

        validate_material_code(&input.code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
        })?;

        validate_conversion_factor(input.conversion_factor).map_err(|msg| {
            AppError::Validation {
                field: "conversion_factor".to_string(),
                message: msg.to_string(),
            }
        })?;

        if let Some(threshold) = input.low_stock_threshold {
            validate_threshold(threshold).map_err(|msg| AppError::Validation {
                field: "low_stock_threshold".to_string(),
                message: msg.to_string(),
            })?;
        }

        validate_compatibility(input.purchase_unit, input.base_unit)
            .map_err(|e| AppError::BusinessRule(e.to_string()))?;

        // (name, outlet) and (code, outlet) are each unique
        let name_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM raw_materials WHERE outlet_id = $1 AND name = $2)",
        )
        .bind(scope.outlet_id)
        .bind(&name)
        .fetch_one(&self.db)
        .await?;

        if name_taken {
            return Err(AppError::DuplicateEntry("name".to_string()));
        }

        let code_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM raw_materials WHERE outlet_id = $1 AND code = $2)",
        )
        .bind(scope.outlet_id)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;

        if code_taken {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let material = sqlx::query_as::<_, RawMaterial>(
            r#"
            INSERT INTO raw_materials (
                restaurant_id, outlet_id, name, code, category, base_unit, purchase_unit,
                conversion_factor, average_cost, last_purchase_cost, is_active,
                low_stock_threshold, is_perishable, shelf_life_in_days
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, 0, true, $9, $10, $11)
            RETURNING id, restaurant_id, outlet_id, name, code, category, base_unit,
                      purchase_unit, conversion_factor, average_cost, last_purchase_cost,
                      is_active, low_stock_threshold, is_perishable, shelf_life_in_days,
                      created_at, updated_at
            "#,
        )
        .bind(scope.restaurant_id)
        .bind(scope.outlet_id)
        .bind(&name)
        .bind(&input.code)
        .bind(&input.category)
        .bind(input.base_unit.as_str())
        .bind(input.purchase_unit.as_str())
        .bind(input.conversion_factor)
        .bind(input.low_stock_threshold)
        .bind(input.is_perishable.unwrap_or(false))
        .bind(input.shelf_life_in_days)
        .fetch_one(&self.db)
        .await?;

        Ok(material)
    }

    /// List raw materials for an outlet
    pub async fn list(
        &self,
        scope: TenantScope,
        include_inactive: bool,
    ) -> AppResult<Vec<RawMaterial>> {
        let materials = sqlx::query_as::<_, RawMaterial>(
            r#"
            SELECT id, restaurant_id, outlet_id, name, code, category, base_unit,
                   purchase_unit, conversion_factor, average_cost, last_purchase_cost,
                   is_active, low_stock_threshold, is_perishable, shelf_life_in_days,
                   created_at, updated_at
            FROM raw_materials
            WHERE outlet_id = $1 AND (is_active OR $2)
            ORDER BY name
            "#,
        )
        .bind(scope.outlet_id)
        .bind(include_inactive)
        .fetch_all(&self.db)
        .await?;

        Ok(materials)
    }

    /// Get a raw material by id
    pub async fn get(&self, scope: TenantScope, raw_material_id: Uuid) -> AppResult<RawMaterial> {
        let material = sqlx::query_as::<_, RawMaterial>(
            r#"
            SELECT id, restaurant_id, outlet_id, name, code, category, base_unit,
                   purchase_unit, conversion_factor, average_cost, last_purchase_cost,
                   is_active, low_stock_threshold, is_perishable, shelf_life_in_days,
                   created_at, updated_at
            FROM raw_materials
            WHERE id = $1 AND outlet_id = $2
            "#,
        )
        .bind(raw_material_id)
        .bind(scope.outlet_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Raw material".to_string()))?;

        Ok(material)
    }

    /// Change or clear the low-stock threshold, then reconcile alert state
    /// against the fresh stock level inside the same transaction
    pub async fn update_threshold(
        &self,
        scope: TenantScope,
        raw_material_id: Uuid,
        input: UpdateThresholdInput,
    ) -> AppResult<RawMaterial> {
        if let Some(threshold) = input.low_stock_threshold {
            validate_threshold(threshold).map_err(|msg| AppError::Validation {
                field: "low_stock_threshold".to_string(),
                message: msg.to_string(),
            })?;
        }

        let mut tx = self.db.begin().await?;

        let material = sqlx::query_as::<_, RawMaterial>(
            r#"
            UPDATE raw_materials
            SET low_stock_threshold = $1, updated_at = NOW()
            WHERE id = $2 AND outlet_id = $3
            RETURNING id, restaurant_id, outlet_id, name, code, category, base_unit,
                      purchase_unit, conversion_factor, average_cost, last_purchase_cost,
                      is_active, low_stock_threshold, is_perishable, shelf_life_in_days,
                      created_at, updated_at
            "#,
        )
        .bind(input.low_stock_threshold)
        .bind(raw_material_id)
        .bind(scope.outlet_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Raw material".to_string()))?;

        alert::reconcile(&mut tx, &material).await?;

        tx.commit().await?;

        Ok(material)
    }

    /// Soft-deactivate a raw material; ledger history is preserved
    pub async fn deactivate(&self, scope: TenantScope, raw_material_id: Uuid) -> AppResult<()> {
        self.set_active(scope, raw_material_id, false).await
    }

    /// Reactivate a previously deactivated raw material
    pub async fn reactivate(&self, scope: TenantScope, raw_material_id: Uuid) -> AppResult<()> {
        self.set_active(scope, raw_material_id, true).await
    }

    async fn set_active(
        &self,
        scope: TenantScope,
        raw_material_id: Uuid,
        is_active: bool,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE raw_materials SET is_active = $1, updated_at = NOW() WHERE id = $2 AND outlet_id = $3",
        )
        .bind(is_active)
        .bind(raw_material_id)
        .bind(scope.outlet_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Raw material".to_string()));
        }

        Ok(())
    }

    /// Current average cost per base unit for a set of materials, keyed by
    /// id; missing ids are simply absent from the map
    pub async fn cost_snapshot(
        &self,
        input: CostSnapshotInput,
    ) -> AppResult<HashMap<Uuid, CostSnapshot>> {
        let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
            "SELECT id, average_cost FROM raw_materials WHERE id = ANY($1)",
        )
        .bind(&input.raw_material_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, average_cost)| (id, CostSnapshot { average_cost }))
            .collect())
    }
}

/// Load a raw material inside an open transaction
pub(crate) async fn fetch_raw_material_tx(
    tx: &mut Transaction<'_, Postgres>,
    raw_material_id: Uuid,
) -> Result<Option<RawMaterial>, sqlx::Error> {
    sqlx::query_as::<_, RawMaterial>(
        r#"
        SELECT id, restaurant_id, outlet_id, name, code, category, base_unit,
               purchase_unit, conversion_factor, average_cost, last_purchase_cost,
               is_active, low_stock_threshold, is_perishable, shelf_life_in_days,
               created_at, updated_at
        FROM raw_materials
        WHERE id = $1
        "#,
    )
    .bind(raw_material_id)
    .fetch_optional(&mut **tx)
    .await
}
