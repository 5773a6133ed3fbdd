//! Inventory ledger service
//!
//! The ledger is the single source of truth for stock: an append-only log of
//! signed quantity changes in base units. Entries are never updated or
//! deleted; corrections are new entries, and current stock is always a live
//! aggregation over the log.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::TenantScope;
use crate::services::alert;
use crate::services::raw_material::{fetch_raw_material_tx, RawMaterial};

/// Inventory ledger service
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Ledger transaction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "inventory_transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Purchase,
    SaleConsumption,
    Wastage,
    Adjustment,
    OpeningBalance,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "purchase",
            TransactionType::SaleConsumption => "sale_consumption",
            TransactionType::Wastage => "wastage",
            TransactionType::Adjustment => "adjustment",
            TransactionType::OpeningBalance => "opening_balance",
        }
    }
}

/// Source document kinds a ledger entry can point back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ledger_reference_type", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    Order,
    Grn,
    Wastage,
    Adjustment,
}

/// One immutable stock movement
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct InventoryLedgerEntry {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub outlet_id: Uuid,
    pub raw_material_id: Uuid,
    pub transaction_type: TransactionType,
    /// Signed change in base units; positive = stock in, negative = stock out
    pub quantity_change: Decimal,
    /// Always the material's base unit, never the purchase unit
    pub unit: String,
    pub reference_type: Option<ReferenceType>,
    pub reference_id: Option<Uuid>,
    pub remarks: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Current stock reading for one material
#[derive(Debug, Clone, Serialize)]
pub struct CurrentStock {
    pub raw_material_id: Uuid,
    pub stock: Decimal,
    pub unit: String,
}

/// One recipe component of an ordered menu item, snapshotted by the order
/// service at ordering time
#[derive(Debug, Deserialize)]
pub struct RecipeComponent {
    pub raw_material_id: Uuid,
    pub quantity_per_unit: Decimal,
    pub unit: String,
}

/// One ordered menu item with its recipe snapshot
#[derive(Debug, Deserialize)]
pub struct ConsumeOrderItem {
    pub menu_item_id: Uuid,
    pub quantity_ordered: Decimal,
    pub recipe_snapshot: Vec<RecipeComponent>,
}

/// Input for order consumption (service-to-service)
#[derive(Debug, Deserialize)]
pub struct ConsumeOrderInput {
    pub order_id: Uuid,
    pub outlet_id: Uuid,
    pub items: Vec<ConsumeOrderItem>,
}

/// Result of order consumption; empty when the order was already applied
#[derive(Debug, Serialize)]
pub struct ConsumeOrderResult {
    pub ledger_entry_ids: Vec<Uuid>,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize)]
pub struct RecordAdjustmentInput {
    pub raw_material_id: Uuid,
    /// Signed change in base units; must be non-zero
    pub quantity_change: Decimal,
    pub remarks: Option<String>,
}

/// Input for recording wastage
#[derive(Debug, Deserialize)]
pub struct RecordWastageInput {
    pub raw_material_id: Uuid,
    /// Wasted quantity in base units; must be positive
    pub quantity: Decimal,
    /// Reason for the wastage (spoilage, breakage, ...); feeds the wastage
    /// report's reason dimension
    pub reason: String,
}

/// Input for recording an opening balance
#[derive(Debug, Deserialize)]
pub struct RecordOpeningBalanceInput {
    pub raw_material_id: Uuid,
    /// Opening quantity in base units; must be positive
    pub quantity: Decimal,
    pub remarks: Option<String>,
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply an order's recipe consumption to the ledger.
    ///
    /// Idempotent per order id: if SALE_CONSUMPTION entries referencing the
    /// order already exist, the call is a successful no-op returning an
    /// empty id list. Recipe lines are aggregated per raw material so each
    /// order writes at most one entry per material.
    pub async fn consume(&self, input: ConsumeOrderInput) -> AppResult<ConsumeOrderResult> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Order must contain at least one item".to_string(),
            });
        }

        // Aggregate recipe lines per material, remembering the units the
        // recipe snapshot claimed so they can be checked against the registry
        let mut totals: BTreeMap<Uuid, (Decimal, Vec<String>)> = BTreeMap::new();
        for item in &input.items {
            if item.quantity_ordered <= Decimal::ZERO {
                return Err(AppError::BusinessRule(format!(
                    "Ordered quantity for menu item {} must be positive",
                    item.menu_item_id
                )));
            }
            for component in &item.recipe_snapshot {
                if component.quantity_per_unit <= Decimal::ZERO {
                    return Err(AppError::BusinessRule(format!(
                        "Recipe quantity for raw material {} must be positive",
                        component.raw_material_id
                    )));
                }
                let entry = totals
                    .entry(component.raw_material_id)
                    .or_insert_with(|| (Decimal::ZERO, Vec::new()));
                entry.0 += item.quantity_ordered * component.quantity_per_unit;
                entry.1.push(component.unit.clone());
            }
        }

        if totals.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Order items carry no recipe components".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        // Idempotency by reference: a retry of an already-applied order must
        // not double-count consumption
        let already_applied = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM inventory_ledger
                WHERE reference_type = 'order' AND reference_id = $1
                  AND transaction_type = 'sale_consumption' AND outlet_id = $2
            )
            "#,
        )
        .bind(input.order_id)
        .bind(input.outlet_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_applied {
            tracing::debug!(order_id = %input.order_id, "consumption already applied, skipping");
            return Ok(ConsumeOrderResult {
                ledger_entry_ids: Vec::new(),
            });
        }

        let mut entry_ids = Vec::with_capacity(totals.len());
        for (raw_material_id, (total_base_qty, units)) in &totals {
            let material = fetch_raw_material_tx(&mut tx, *raw_material_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Raw material".to_string()))?;

            if material.outlet_id != input.outlet_id {
                return Err(AppError::BusinessRule(format!(
                    "Raw material {} does not belong to this outlet",
                    material.name
                )));
            }

            // Consumption of a deactivated material is allowed (the sale has
            // already happened), but the recipe must agree on the base unit
            for unit in units {
                if unit != &material.base_unit {
                    return Err(AppError::BusinessRule(format!(
                        "Recipe unit {} does not match base unit {} of {}",
                        unit, material.base_unit, material.name
                    )));
                }
            }

            let delta = -*total_base_qty;
            let entry_id = insert_entry_tx(
                &mut tx,
                &material,
                TransactionType::SaleConsumption,
                delta,
                Some(ReferenceType::Order),
                Some(input.order_id),
                None,
                None,
            )
            .await?;
            entry_ids.push(entry_id);

            alert::check_after_delta(&mut tx, &material, delta).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %input.order_id,
            entries = entry_ids.len(),
            "order consumption recorded"
        );

        Ok(ConsumeOrderResult {
            ledger_entry_ids: entry_ids,
        })
    }

    /// Record a manual stock adjustment (stocktake corrections)
    pub async fn record_adjustment(
        &self,
        scope: TenantScope,
        user_id: Uuid,
        input: RecordAdjustmentInput,
    ) -> AppResult<InventoryLedgerEntry> {
        if input.quantity_change.is_zero() {
            return Err(AppError::BusinessRule(
                "Adjustment quantity must be non-zero".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;
        let material = load_active_material(&mut tx, scope, input.raw_material_id).await?;

        let entry_id = insert_entry_tx(
            &mut tx,
            &material,
            TransactionType::Adjustment,
            input.quantity_change,
            Some(ReferenceType::Adjustment),
            None,
            input.remarks.as_deref(),
            Some(user_id),
        )
        .await?;

        alert::check_after_delta(&mut tx, &material, input.quantity_change).await?;
        tx.commit().await?;

        self.get_entry(entry_id).await
    }

    /// Record wastage (spoilage, breakage) as a negative ledger entry
    pub async fn record_wastage(
        &self,
        scope: TenantScope,
        user_id: Uuid,
        input: RecordWastageInput,
    ) -> AppResult<InventoryLedgerEntry> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Wastage quantity must be positive".to_string(),
            });
        }
        if input.reason.trim().is_empty() {
            return Err(AppError::Validation {
                field: "reason".to_string(),
                message: "Wastage reason must not be empty".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;
        let material = load_active_material(&mut tx, scope, input.raw_material_id).await?;

        let delta = -input.quantity;
        let entry_id = insert_entry_tx(
            &mut tx,
            &material,
            TransactionType::Wastage,
            delta,
            Some(ReferenceType::Wastage),
            None,
            Some(input.reason.trim()),
            Some(user_id),
        )
        .await?;

        alert::check_after_delta(&mut tx, &material, delta).await?;
        tx.commit().await?;

        self.get_entry(entry_id).await
    }

    /// Record the one-time opening balance for a material.
    ///
    /// Unlike consumption retries, a second opening balance is a rejected
    /// request, not a silent no-op.
    pub async fn record_opening_balance(
        &self,
        scope: TenantScope,
        user_id: Uuid,
        input: RecordOpeningBalanceInput,
    ) -> AppResult<InventoryLedgerEntry> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Opening balance quantity must be positive".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;
        let material = load_active_material(&mut tx, scope, input.raw_material_id).await?;

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM inventory_ledger
                WHERE raw_material_id = $1 AND outlet_id = $2
                  AND transaction_type = 'opening_balance'
            )
            "#,
        )
        .bind(material.id)
        .bind(material.outlet_id)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            return Err(AppError::BusinessRule(format!(
                "Opening balance already recorded for {}",
                material.name
            )));
        }

        let entry_id = insert_entry_tx(
            &mut tx,
            &material,
            TransactionType::OpeningBalance,
            input.quantity,
            None,
            None,
            input.remarks.as_deref(),
            Some(user_id),
        )
        .await?;

        alert::check_after_delta(&mut tx, &material, input.quantity).await?;
        tx.commit().await?;

        self.get_entry(entry_id).await
    }

    /// Canonical stock read: a live sum over the ledger, never a cached value
    pub async fn get_current_stock(
        &self,
        scope: TenantScope,
        raw_material_id: Uuid,
    ) -> AppResult<CurrentStock> {
        let material = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT id, base_unit FROM raw_materials WHERE id = $1 AND outlet_id = $2",
        )
        .bind(raw_material_id)
        .bind(scope.outlet_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Raw material".to_string()))?;

        let stock = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(quantity_change), 0)
            FROM inventory_ledger
            WHERE raw_material_id = $1 AND outlet_id = $2
            "#,
        )
        .bind(raw_material_id)
        .bind(scope.outlet_id)
        .fetch_one(&self.db)
        .await?;

        Ok(CurrentStock {
            raw_material_id: material.0,
            stock,
            unit: material.1,
        })
    }

    /// Chronological ledger for one material
    pub async fn list_entries(
        &self,
        scope: TenantScope,
        raw_material_id: Uuid,
    ) -> AppResult<Vec<InventoryLedgerEntry>> {
        let material_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM raw_materials WHERE id = $1 AND outlet_id = $2)",
        )
        .bind(raw_material_id)
        .bind(scope.outlet_id)
        .fetch_one(&self.db)
        .await?;

        if !material_exists {
            return Err(AppError::NotFound("Raw material".to_string()));
        }

        let entries = sqlx::query_as::<_, InventoryLedgerEntry>(
            r#"
            SELECT id, restaurant_id, outlet_id, raw_material_id, transaction_type,
                   quantity_change, unit, reference_type, reference_id, remarks,
                   created_by, created_at
            FROM inventory_ledger
            WHERE raw_material_id = $1 AND outlet_id = $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(raw_material_id)
        .bind(scope.outlet_id)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    async fn get_entry(&self, entry_id: Uuid) -> AppResult<InventoryLedgerEntry> {
        let entry = sqlx::query_as::<_, InventoryLedgerEntry>(
            r#"
            SELECT id, restaurant_id, outlet_id, raw_material_id, transaction_type,
                   quantity_change, unit, reference_type, reference_id, remarks,
                   created_by, created_at
            FROM inventory_ledger
            WHERE id = $1
            "#,
        )
        .bind(entry_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ledger entry".to_string()))?;

        Ok(entry)
    }
}

/// Live stock sum inside an open transaction
pub(crate) async fn current_stock_tx(
    tx: &mut Transaction<'_, Postgres>,
    raw_material_id: Uuid,
    outlet_id: Uuid,
) -> Result<Decimal, sqlx::Error> {
    sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(quantity_change), 0)
        FROM inventory_ledger
        WHERE raw_material_id = $1 AND outlet_id = $2
        "#,
    )
    .bind(raw_material_id)
    .bind(outlet_id)
    .fetch_one(&mut **tx)
    .await
}

/// Append one ledger entry inside an open transaction
#[allow(clippy::too_many_arguments)]
pub(crate) async fn insert_entry_tx(
    tx: &mut Transaction<'_, Postgres>,
    material: &RawMaterial,
    transaction_type: TransactionType,
    quantity_change: Decimal,
    reference_type: Option<ReferenceType>,
    reference_id: Option<Uuid>,
    remarks: Option<&str>,
    created_by: Option<Uuid>,
) -> Result<Uuid, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO inventory_ledger (
            restaurant_id, outlet_id, raw_material_id, transaction_type,
            quantity_change, unit, reference_type, reference_id, remarks, created_by
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(material.restaurant_id)
    .bind(material.outlet_id)
    .bind(material.id)
    .bind(transaction_type)
    .bind(quantity_change)
    .bind(&material.base_unit)
    .bind(reference_type)
    .bind(reference_id)
    .bind(remarks)
    .bind(created_by)
    .fetch_one(&mut **tx)
    .await
}

/// Load a material for a staff-facing write: must exist, belong to the
/// outlet, and be active
async fn load_active_material(
    tx: &mut Transaction<'_, Postgres>,
    scope: TenantScope,
    raw_material_id: Uuid,
) -> AppResult<RawMaterial> {
    let material = fetch_raw_material_tx(tx, raw_material_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Raw material".to_string()))?;

    if material.outlet_id != scope.outlet_id {
        return Err(AppError::BusinessRule(format!(
            "Raw material {} does not belong to this outlet",
            material.name
        )));
    }
    if !material.is_active {
        return Err(AppError::BusinessRule(format!(
            "Raw material {} is inactive",
            material.name
        )));
    }

    Ok(material)
}
