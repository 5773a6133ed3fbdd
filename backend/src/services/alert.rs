//! Low-stock alert reconciler
//!
//! Alert state is derived from the ledger: a downward threshold crossing
//! opens an alert, recovery above the threshold resolves it. At most one
//! open alert exists per (raw material, outlet); resolution keeps the row
//! as history rather than deleting it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{evaluate_after_delta, evaluate_level, AlertTransition, TenantScope};
use crate::services::ledger::current_stock_tx;
use crate::services::raw_material::RawMaterial;

/// Low-stock alert service (reads; reconciliation runs inside the writers'
/// transactions)
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

/// Low-stock alert record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LowStockAlert {
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub outlet_id: Uuid,
    pub raw_material_id: Uuid,
    /// Name snapshot taken when the alert was raised
    pub raw_material_name: String,
    pub threshold: Decimal,
    pub stock_at_trigger: Decimal,
    pub is_resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AlertService {
    /// Create a new AlertService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open alerts for an outlet
    pub async fn get_active_alerts(&self, scope: TenantScope) -> AppResult<Vec<LowStockAlert>> {
        let alerts = sqlx::query_as::<_, LowStockAlert>(
            r#"
            SELECT id, restaurant_id, outlet_id, raw_material_id, raw_material_name,
                   threshold, stock_at_trigger, is_resolved, resolved_at, created_at
            FROM low_stock_alerts
            WHERE outlet_id = $1 AND is_resolved = false
            ORDER BY created_at DESC
            "#,
        )
        .bind(scope.outlet_id)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }

    /// Full alert history for an outlet, optionally narrowed to one material
    pub async fn get_alert_history(
        &self,
        scope: TenantScope,
        raw_material_id: Option<Uuid>,
    ) -> AppResult<Vec<LowStockAlert>> {
        let alerts = sqlx::query_as::<_, LowStockAlert>(
            r#"
            SELECT id, restaurant_id, outlet_id, raw_material_id, raw_material_name,
                   threshold, stock_at_trigger, is_resolved, resolved_at, created_at
            FROM low_stock_alerts
            WHERE outlet_id = $1 AND ($2::uuid IS NULL OR raw_material_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(scope.outlet_id)
        .bind(raw_material_id)
        .fetch_all(&self.db)
        .await?;

        Ok(alerts)
    }
}

/// Reconcile alert state after a ledger delta has been written in `tx`.
///
/// The previous stock is reconstructed as `current - delta`, so a crossing
/// is detected without a second aggregation.
pub(crate) async fn check_after_delta(
    tx: &mut Transaction<'_, Postgres>,
    material: &RawMaterial,
    delta: Decimal,
) -> AppResult<()> {
    let current = current_stock_tx(tx, material.id, material.outlet_id).await?;
    let previous = current - delta;

    apply_transition(
        tx,
        material,
        current,
        evaluate_after_delta(previous, current, material.low_stock_threshold),
    )
    .await
}

/// Reconcile alert state from the current level alone (threshold changes)
pub(crate) async fn reconcile(
    tx: &mut Transaction<'_, Postgres>,
    material: &RawMaterial,
) -> AppResult<()> {
    let current = current_stock_tx(tx, material.id, material.outlet_id).await?;

    apply_transition(
        tx,
        material,
        current,
        evaluate_level(current, material.low_stock_threshold),
    )
    .await
}

async fn apply_transition(
    tx: &mut Transaction<'_, Postgres>,
    material: &RawMaterial,
    current_stock: Decimal,
    transition: AlertTransition,
) -> AppResult<()> {
    match transition {
        AlertTransition::Resolve => {
            sqlx::query(
                r#"
                UPDATE low_stock_alerts
                SET is_resolved = true, resolved_at = NOW(), stock_at_trigger = $1
                WHERE raw_material_id = $2 AND outlet_id = $3 AND is_resolved = false
                "#,
            )
            .bind(current_stock)
            .bind(material.id)
            .bind(material.outlet_id)
            .execute(&mut **tx)
            .await?;
        }
        AlertTransition::Raise => {
            let Some(threshold) = material.low_stock_threshold else {
                return Ok(());
            };

            let already_open = sqlx::query_scalar::<_, bool>(
                r#"
                SELECT EXISTS(
                    SELECT 1 FROM low_stock_alerts
                    WHERE raw_material_id = $1 AND outlet_id = $2 AND is_resolved = false
                )
                "#,
            )
            .bind(material.id)
            .bind(material.outlet_id)
            .fetch_one(&mut **tx)
            .await?;

            if !already_open {
                sqlx::query(
                    r#"
                    INSERT INTO low_stock_alerts (
                        restaurant_id, outlet_id, raw_material_id, raw_material_name,
                        threshold, stock_at_trigger, is_resolved
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, false)
                    "#,
                )
                .bind(material.restaurant_id)
                .bind(material.outlet_id)
                .bind(material.id)
                .bind(&material.name)
                .bind(threshold)
                .bind(current_stock)
                .execute(&mut **tx)
                .await?;

                tracing::info!(
                    raw_material_id = %material.id,
                    %current_stock,
                    %threshold,
                    "low-stock alert raised"
                );
            }
        }
        AlertTransition::Hold => {}
    }

    Ok(())
}
