//! Inventory reports
//!
//! Read-only aggregations computed entirely from the ledger and the raw
//! material registry. There is no cached derived state: every report is a
//! fresh query over the append-only log.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{compute_variance, validate_report_range, TenantScope, VarianceInputs};

/// Reporting service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// Optional inclusive date window for report queries
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl ReportRange {
    /// Validate the window against today's date
    fn validate(&self) -> AppResult<()> {
        validate_report_range(self.from, self.to, Utc::now().date_naive()).map_err(|msg| {
            AppError::Validation {
                field: "from/to".to_string(),
                message: msg.to_string(),
            }
        })
    }

    /// Window start as a UTC instant
    fn start(&self) -> Option<DateTime<Utc>> {
        self.from
            .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
    }

    /// Exclusive window end: start of the day after `to`, so entries through
    /// the end of `to` are included
    fn end_exclusive(&self) -> Option<DateTime<Utc>> {
        self.to.and_then(|d| d.checked_add_days(Days::new(1))).map(|d| {
            d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc()
        })
    }
}

/// Row for the current stock query
#[derive(Debug, FromRow)]
struct CurrentStockRow {
    raw_material_id: Uuid,
    name: String,
    code: String,
    unit: String,
    average_cost: Decimal,
    current_stock: Decimal,
}

/// Current stock report entry
#[derive(Debug, Clone, Serialize)]
pub struct CurrentStockReportEntry {
    pub raw_material_id: Uuid,
    pub name: String,
    pub code: String,
    pub unit: String,
    pub current_stock: Decimal,
    pub average_cost: Decimal,
    pub stock_value: Decimal,
}

/// Row for the consumption query
#[derive(Debug, FromRow)]
struct ConsumptionRow {
    raw_material_id: Uuid,
    name: String,
    unit: String,
    average_cost: Decimal,
    consumed_quantity: Decimal,
    entry_count: i64,
}

/// Consumption report entry
#[derive(Debug, Clone, Serialize)]
pub struct ConsumptionReportEntry {
    pub raw_material_id: Uuid,
    pub name: String,
    pub unit: String,
    pub consumed_quantity: Decimal,
    pub consumed_value: Decimal,
    pub entry_count: i64,
}

/// Row for the wastage query
#[derive(Debug, FromRow)]
struct WastageRow {
    raw_material_id: Uuid,
    name: String,
    unit: String,
    average_cost: Decimal,
    reason: String,
    wasted_quantity: Decimal,
    entry_count: i64,
}

/// Wastage report entry, grouped by material and reason
#[derive(Debug, Clone, Serialize)]
pub struct WastageReportEntry {
    pub raw_material_id: Uuid,
    pub name: String,
    pub unit: String,
    pub reason: String,
    pub wasted_quantity: Decimal,
    pub wasted_value: Decimal,
    pub entry_count: i64,
}

/// Row for the variance query
#[derive(Debug, FromRow)]
struct VarianceRow {
    raw_material_id: Uuid,
    name: String,
    unit: String,
    opening_stock: Decimal,
    closing_stock: Decimal,
    purchased: Decimal,
    consumed: Decimal,
    wasted: Decimal,
    adjustments: Decimal,
}

/// Variance report entry
///
/// Fields are kept flat (no nested struct) so rows serialize to CSV as-is.
#[derive(Debug, Clone, Serialize)]
pub struct VarianceReportEntry {
    pub raw_material_id: Uuid,
    pub name: String,
    pub unit: String,
    pub opening_stock: Decimal,
    pub purchased: Decimal,
    pub consumed: Decimal,
    pub wasted: Decimal,
    pub adjustments: Decimal,
    pub closing_stock: Decimal,
    /// Non-zero means quantity changed outside recorded transaction types
    pub variance: Decimal,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current stock and value per active material
    pub async fn current_stock_report(
        &self,
        scope: TenantScope,
    ) -> AppResult<Vec<CurrentStockReportEntry>> {
        let rows = sqlx::query_as::<_, CurrentStockRow>(
            r#"
            SELECT rm.id as raw_material_id, rm.name, rm.code, rm.base_unit as unit,
                   rm.average_cost,
                   COALESCE(SUM(le.quantity_change), 0) as current_stock
            FROM raw_materials rm
            LEFT JOIN inventory_ledger le
                ON le.raw_material_id = rm.id AND le.outlet_id = rm.outlet_id
            WHERE rm.outlet_id = $1 AND rm.is_active = true
            GROUP BY rm.id, rm.name, rm.code, rm.base_unit, rm.average_cost
            ORDER BY rm.name
            "#,
        )
        .bind(scope.outlet_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| CurrentStockReportEntry {
                raw_material_id: r.raw_material_id,
                name: r.name,
                code: r.code,
                unit: r.unit,
                current_stock: r.current_stock,
                average_cost: r.average_cost,
                stock_value: r.current_stock * r.average_cost,
            })
            .collect())
    }

    /// Sale consumption per material within an optional window
    pub async fn consumption_report(
        &self,
        scope: TenantScope,
        range: ReportRange,
    ) -> AppResult<Vec<ConsumptionReportEntry>> {
        range.validate()?;

        let rows = sqlx::query_as::<_, ConsumptionRow>(
            r#"
            SELECT rm.id as raw_material_id, rm.name, rm.base_unit as unit,
                   rm.average_cost,
                   COALESCE(SUM(-le.quantity_change), 0) as consumed_quantity,
                   COUNT(le.id) as entry_count
            FROM inventory_ledger le
            JOIN raw_materials rm ON rm.id = le.raw_material_id
            WHERE le.outlet_id = $1
              AND le.transaction_type = 'sale_consumption'
              AND ($2::timestamptz IS NULL OR le.created_at >= $2)
              AND ($3::timestamptz IS NULL OR le.created_at < $3)
            GROUP BY rm.id, rm.name, rm.base_unit, rm.average_cost
            ORDER BY consumed_quantity DESC
            "#,
        )
        .bind(scope.outlet_id)
        .bind(range.start())
        .bind(range.end_exclusive())
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ConsumptionReportEntry {
                raw_material_id: r.raw_material_id,
                name: r.name,
                unit: r.unit,
                consumed_value: r.consumed_quantity * r.average_cost,
                consumed_quantity: r.consumed_quantity,
                entry_count: r.entry_count,
            })
            .collect())
    }

    /// Wastage per material and reason within an optional window
    pub async fn wastage_report(
        &self,
        scope: TenantScope,
        range: ReportRange,
    ) -> AppResult<Vec<WastageReportEntry>> {
        range.validate()?;

        let rows = sqlx::query_as::<_, WastageRow>(
            r#"
            SELECT rm.id as raw_material_id, rm.name, rm.base_unit as unit,
                   rm.average_cost,
                   COALESCE(le.remarks, 'UNSPECIFIED') as reason,
                   COALESCE(SUM(-le.quantity_change), 0) as wasted_quantity,
                   COUNT(le.id) as entry_count
            FROM inventory_ledger le
            JOIN raw_materials rm ON rm.id = le.raw_material_id
            WHERE le.outlet_id = $1
              AND le.transaction_type = 'wastage'
              AND ($2::timestamptz IS NULL OR le.created_at >= $2)
              AND ($3::timestamptz IS NULL OR le.created_at < $3)
            GROUP BY rm.id, rm.name, rm.base_unit, rm.average_cost, le.remarks
            ORDER BY wasted_quantity DESC
            "#,
        )
        .bind(scope.outlet_id)
        .bind(range.start())
        .bind(range.end_exclusive())
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| WastageReportEntry {
                raw_material_id: r.raw_material_id,
                name: r.name,
                unit: r.unit,
                reason: r.reason,
                wasted_value: r.wasted_quantity * r.average_cost,
                wasted_quantity: r.wasted_quantity,
                entry_count: r.entry_count,
            })
            .collect())
    }

    /// Stock variance per material over a window.
    ///
    /// Opening stock counts entries strictly before the window start,
    /// closing stock counts entries through the window end; anything the
    /// four tracked transaction types cannot explain surfaces as variance.
    pub async fn variance_report(
        &self,
        scope: TenantScope,
        range: ReportRange,
    ) -> AppResult<Vec<VarianceReportEntry>> {
        range.validate()?;

        // Missing bounds fall back to all history through today
        let range = ReportRange {
            from: Some(
                range
                    .from
                    .unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()),
            ),
            to: Some(range.to.unwrap_or_else(|| Utc::now().date_naive())),
        };

        let rows = sqlx::query_as::<_, VarianceRow>(
            r#"
            SELECT rm.id as raw_material_id, rm.name, rm.base_unit as unit,
                   COALESCE(SUM(le.quantity_change)
                       FILTER (WHERE le.created_at < $2), 0) as opening_stock,
                   COALESCE(SUM(le.quantity_change)
                       FILTER (WHERE le.created_at < $3), 0) as closing_stock,
                   COALESCE(SUM(le.quantity_change)
                       FILTER (WHERE le.transaction_type = 'purchase'
                               AND le.created_at >= $2 AND le.created_at < $3), 0) as purchased,
                   COALESCE(SUM(-le.quantity_change)
                       FILTER (WHERE le.transaction_type = 'sale_consumption'
                               AND le.created_at >= $2 AND le.created_at < $3), 0) as consumed,
                   COALESCE(SUM(-le.quantity_change)
                       FILTER (WHERE le.transaction_type = 'wastage'
                               AND le.created_at >= $2 AND le.created_at < $3), 0) as wasted,
                   COALESCE(SUM(le.quantity_change)
                       FILTER (WHERE le.transaction_type = 'adjustment'
                               AND le.created_at >= $2 AND le.created_at < $3), 0) as adjustments
            FROM raw_materials rm
            LEFT JOIN inventory_ledger le
                ON le.raw_material_id = rm.id AND le.outlet_id = rm.outlet_id
            WHERE rm.outlet_id = $1
            GROUP BY rm.id, rm.name, rm.base_unit
            ORDER BY rm.name
            "#,
        )
        .bind(scope.outlet_id)
        .bind(range.start())
        .bind(range.end_exclusive())
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                let inputs = VarianceInputs {
                    opening_stock: r.opening_stock,
                    purchased: r.purchased,
                    consumed: r.consumed,
                    wasted: r.wasted,
                    adjustments: r.adjustments,
                    closing_stock: r.closing_stock,
                };
                VarianceReportEntry {
                    raw_material_id: r.raw_material_id,
                    name: r.name,
                    unit: r.unit,
                    opening_stock: r.opening_stock,
                    purchased: r.purchased,
                    consumed: r.consumed,
                    wasted: r.wasted,
                    adjustments: r.adjustments,
                    closing_stock: r.closing_stock,
                    variance: compute_variance(&inputs),
                }
            })
            .collect())
    }

    /// Serialize report rows to CSV for download
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer failed: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("CSV encoding failed: {}", e)))?;

        Ok(csv_data)
    }
}
