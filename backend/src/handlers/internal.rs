//! HTTP handlers for service-to-service endpoints
//!
//! These routes are called by the order service with the shared-secret
//! internal token, not a user JWT.

use axum::{extract::State, Json};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::ledger::{ConsumeOrderInput, ConsumeOrderResult, LedgerService};
use crate::services::raw_material::{CostSnapshot, CostSnapshotInput, RawMaterialService};
use crate::AppState;

/// Apply an order's recipe consumption; idempotent per order id
pub async fn consume_order(
    State(state): State<AppState>,
    Json(input): Json<ConsumeOrderInput>,
) -> AppResult<Json<ConsumeOrderResult>> {
    let service = LedgerService::new(state.db);
    let result = service.consume(input).await?;
    Ok(Json(result))
}

/// Average-cost snapshot for pricing collaborators
pub async fn cost_snapshot(
    State(state): State<AppState>,
    Json(input): Json<CostSnapshotInput>,
) -> AppResult<Json<HashMap<Uuid, CostSnapshot>>> {
    let service = RawMaterialService::new(state.db);
    let snapshot = service.cost_snapshot(input).await?;
    Ok(Json(snapshot))
}
