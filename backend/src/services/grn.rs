//! Goods-receipt (GRN) service
//!
//! A GRN records one purchase event from a vendor. Creating one validates
//! the vendor and every line item, converts purchase-unit quantities and
//! costs to base units, appends PURCHASE ledger entries, re-blends each
//! material's weighted-average cost from the pre-transaction stock
//! snapshot, and reconciles low-stock alerts. All of it commits or rolls
//! back as a single transaction; a GRN is never edited after creation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{convert_to_base, weighted_average_cost, TenantScope};
use crate::services::alert;
use crate::services::ledger::{current_stock_tx, insert_entry_tx, ReferenceType, TransactionType};
use crate::services::raw_material::{fetch_raw_material_tx, RawMaterial};

/// Goods-receipt service
#[derive(Clone)]
pub struct GrnService {
    db: PgPool,
}

/// Goods receipt note header
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GoodsReceiptNote {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub outlet_id: Uuid,
    pub vendor_id: Uuid,
    /// Vendor name snapshot at receipt time
    pub vendor_name: String,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub total_purchase_cost: Decimal,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One received line, carrying both purchase-unit and base-unit figures
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GrnLineItem {
    pub id: Uuid,
    pub grn_id: Uuid,
    pub raw_material_id: Uuid,
    pub raw_material_name: String,
    pub purchase_quantity: Decimal,
    pub purchase_unit: String,
    pub base_quantity: Decimal,
    pub base_unit: String,
    /// Cost per purchase unit as invoiced
    pub unit_cost: Decimal,
    /// Cost per base unit (unit_cost / conversion factor)
    pub cost_per_base_unit: Decimal,
    pub line_total: Decimal,
}

/// GRN with its line items
#[derive(Debug, Serialize)]
pub struct GrnWithItems {
    #[serde(flatten)]
    pub grn: GoodsReceiptNote,
    pub items: Vec<GrnLineItem>,
}

/// Input line for creating a GRN
#[derive(Debug, Deserialize)]
pub struct CreateGrnItemInput {
    pub raw_material_id: Uuid,
    /// Quantity in the material's purchase unit
    pub purchase_quantity: Decimal,
    /// Cost per purchase unit
    pub unit_cost: Decimal,
}

/// Input for creating a GRN
#[derive(Debug, Deserialize)]
pub struct CreateGrnInput {
    pub vendor_id: Uuid,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
    pub items: Vec<CreateGrnItemInput>,
}

/// Row for vendor validation
#[derive(Debug, FromRow)]
struct VendorRow {
    id: Uuid,
    name: String,
    outlet_id: Uuid,
    is_active: bool,
}

/// Line figures computed during validation, before anything is written
struct PreparedLine {
    material: RawMaterial,
    purchase_quantity: Decimal,
    unit_cost: Decimal,
    base_quantity: Decimal,
    cost_per_base_unit: Decimal,
    line_total: Decimal,
    /// Stock before this GRN, read once and reused for costing
    prior_stock: Decimal,
}

impl GrnService {
    /// Create a new GrnService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a goods receipt note
    pub async fn create_grn(
        &self,
        scope: TenantScope,
        user_id: Uuid,
        input: CreateGrnInput,
    ) -> AppResult<GrnWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "GRN must contain at least one line item".to_string(),
            });
        }

        let invoice_number = input
            .invoice_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mut tx = self.db.begin().await?;

        let vendor = sqlx::query_as::<_, VendorRow>(
            "SELECT id, name, outlet_id, is_active FROM vendors WHERE id = $1",
        )
        .bind(input.vendor_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Vendor".to_string()))?;

        if vendor.outlet_id != scope.outlet_id {
            return Err(AppError::BusinessRule(format!(
                "Vendor {} does not belong to this outlet",
                vendor.name
            )));
        }
        if !vendor.is_active {
            return Err(AppError::BusinessRule(format!(
                "Vendor {} is inactive",
                vendor.name
            )));
        }

        // Best-effort duplicate-invoice guard per (outlet, invoice number)
        if let Some(ref invoice) = invoice_number {
            let duplicate = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM goods_receipt_notes WHERE outlet_id = $1 AND invoice_number = $2)",
            )
            .bind(scope.outlet_id)
            .bind(invoice)
            .fetch_one(&mut *tx)
            .await?;

            if duplicate {
                return Err(AppError::Conflict {
                    resource: "invoice_number".to_string(),
                    message: format!("A GRN for invoice {} already exists", invoice),
                });
            }
        }

        // Validate every line and compute its conversions before writing
        // anything; any failure aborts the whole GRN
        let mut seen_materials: HashSet<Uuid> = HashSet::new();
        let mut lines: Vec<PreparedLine> = Vec::with_capacity(input.items.len());
        let mut total_purchase_cost = Decimal::ZERO;

        for item in &input.items {
            if !seen_materials.insert(item.raw_material_id) {
                return Err(AppError::BusinessRule(format!(
                    "Raw material {} appears more than once in this GRN",
                    item.raw_material_id
                )));
            }
            if item.purchase_quantity <= Decimal::ZERO {
                return Err(AppError::BusinessRule(
                    "Purchase quantity must be positive".to_string(),
                ));
            }
            if item.unit_cost <= Decimal::ZERO {
                return Err(AppError::BusinessRule(
                    "Unit cost must be positive".to_string(),
                ));
            }

            let material = fetch_raw_material_tx(&mut tx, item.raw_material_id)
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

            let purchase_unit = material.purchase_unit_parsed()?;
            let base_unit = material.base_unit_parsed()?;

            let base_quantity = convert_to_base(
                item.purchase_quantity,
                purchase_unit,
                base_unit,
                material.conversion_factor,
            )
            .map_err(|e| AppError::BusinessRule(e.to_string()))?;

            // Pre-transaction snapshot, read once per material and reused
            // for costing after the PURCHASE entry lands
            let prior_stock = current_stock_tx(&mut tx, material.id, material.outlet_id).await?;

            let cost_per_base_unit = item.unit_cost / material.conversion_factor;
            let line_total = base_quantity * cost_per_base_unit;
            total_purchase_cost += line_total;

            lines.push(PreparedLine {
                material,
                purchase_quantity: item.purchase_quantity,
                unit_cost: item.unit_cost,
                base_quantity,
                cost_per_base_unit,
                line_total,
                prior_stock,
            });
        }

        let grn_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO goods_receipt_notes (
                restaurant_id, outlet_id, vendor_id, vendor_name,
                invoice_number, invoice_date, total_purchase_cost, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(scope.restaurant_id)
        .bind(scope.outlet_id)
        .bind(vendor.id)
        .bind(&vendor.name)
        .bind(&invoice_number)
        .bind(input.invoice_date)
        .bind(total_purchase_cost)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO grn_line_items (
                    grn_id, raw_material_id, raw_material_name, purchase_quantity,
                    purchase_unit, base_quantity, base_unit, unit_cost,
                    cost_per_base_unit, line_total
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(grn_id)
            .bind(line.material.id)
            .bind(&line.material.name)
            .bind(line.purchase_quantity)
            .bind(&line.material.purchase_unit)
            .bind(line.base_quantity)
            .bind(&line.material.base_unit)
            .bind(line.unit_cost)
            .bind(line.cost_per_base_unit)
            .bind(line.line_total)
            .execute(&mut *tx)
            .await?;

            insert_entry_tx(
                &mut tx,
                &line.material,
                TransactionType::Purchase,
                line.base_quantity,
                Some(ReferenceType::Grn),
                Some(grn_id),
                invoice_number.as_deref(),
                Some(user_id),
            )
            .await?;
        }

        // Costing: blend from the pre-transaction snapshot, then overwrite
        // the last purchase cost unconditionally
        for line in &lines {
            let new_average = weighted_average_cost(
                line.prior_stock,
                line.material.average_cost,
                line.base_quantity,
                line.cost_per_base_unit,
            );

            sqlx::query(
                r#"
                UPDATE raw_materials
                SET average_cost = $1, last_purchase_cost = $2, updated_at = NOW()
                WHERE id = $3
                "#,
            )
            .bind(new_average)
            .bind(line.cost_per_base_unit)
            .bind(line.material.id)
            .execute(&mut *tx)
            .await?;
        }

        for line in &lines {
            alert::check_after_delta(&mut tx, &line.material, line.base_quantity).await?;
        }

        tx.commit().await?;

        tracing::info!(
            %grn_id,
            vendor = %vendor.name,
            lines = lines.len(),
            %total_purchase_cost,
            "goods receipt recorded"
        );

        self.get_grn(scope, grn_id).await
    }

    /// Get a GRN with its line items
    pub async fn get_grn(&self, scope: TenantScope, grn_id: Uuid) -> AppResult<GrnWithItems> {
        let grn = sqlx::query_as::<_, GoodsReceiptNote>(
            r#"
            SELECT id, restaurant_id, outlet_id, vendor_id, vendor_name,
                   invoice_number, invoice_date, total_purchase_cost, created_by, created_at
            FROM goods_receipt_notes
            WHERE id = $1 AND outlet_id = $2
            "#,
        )
        .bind(grn_id)
        .bind(scope.outlet_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Goods receipt note".to_string()))?;

        let items = sqlx::query_as::<_, GrnLineItem>(
            r#"
            SELECT id, grn_id, raw_material_id, raw_material_name, purchase_quantity,
                   purchase_unit, base_quantity, base_unit, unit_cost,
                   cost_per_base_unit, line_total
            FROM grn_line_items
            WHERE grn_id = $1
            ORDER BY raw_material_name
            "#,
        )
        .bind(grn_id)
        .fetch_all(&self.db)
        .await?;

        Ok(GrnWithItems { grn, items })
    }

    /// List GRN headers for an outlet, newest first
    pub async fn list_grns(&self, scope: TenantScope) -> AppResult<Vec<GoodsReceiptNote>> {
        let grns = sqlx::query_as::<_, GoodsReceiptNote>(
            r#"
            SELECT id, restaurant_id, outlet_id, vendor_id, vendor_name,
                   invoice_number, invoice_date, total_purchase_cost, created_by, created_at
            FROM goods_receipt_notes
            WHERE outlet_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(scope.outlet_id)
        .fetch_all(&self.db)
        .await?;

        Ok(grns)
    }
}
