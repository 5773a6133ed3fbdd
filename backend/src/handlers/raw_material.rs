//! HTTP handlers for raw material registry endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::TenantScope;
use crate::services::ledger::{CurrentStock, InventoryLedgerEntry, LedgerService};
use crate::services::raw_material::{
    CreateRawMaterialInput, RawMaterial, RawMaterialService, UpdateThresholdInput,
};
use crate::AppState;

/// Query parameters for listing raw materials
#[derive(Debug, Deserialize)]
pub struct ListRawMaterialsQuery {
    pub include_inactive: Option<bool>,
}

/// Register a raw material
pub async fn create_raw_material(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateRawMaterialInput>,
) -> AppResult<Json<RawMaterial>> {
    let service = RawMaterialService::new(state.db);
    let material = service
        .create(TenantScope::from(&current_user.0), input)
        .await?;
    Ok(Json(material))
}

/// List raw materials for the outlet
pub async fn list_raw_materials(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListRawMaterialsQuery>,
) -> AppResult<Json<Vec<RawMaterial>>> {
    let service = RawMaterialService::new(state.db);
    let materials = service
        .list(
            TenantScope::from(&current_user.0),
            query.include_inactive.unwrap_or(false),
        )
        .await?;
    Ok(Json(materials))
}

/// Get a raw material
pub async fn get_raw_material(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(raw_material_id): Path<Uuid>,
) -> AppResult<Json<RawMaterial>> {
    let service = RawMaterialService::new(state.db);
    let material = service
        .get(TenantScope::from(&current_user.0), raw_material_id)
        .await?;
    Ok(Json(material))
}

/// Set or clear the low-stock threshold
pub async fn update_threshold(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(raw_material_id): Path<Uuid>,
    Json(input): Json<UpdateThresholdInput>,
) -> AppResult<Json<RawMaterial>> {
    let service = RawMaterialService::new(state.db);
    let material = service
        .update_threshold(TenantScope::from(&current_user.0), raw_material_id, input)
        .await?;
    Ok(Json(material))
}

/// Soft-deactivate a raw material
pub async fn deactivate_raw_material(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(raw_material_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = RawMaterialService::new(state.db);
    service
        .deactivate(TenantScope::from(&current_user.0), raw_material_id)
        .await?;
    Ok(Json(()))
}

/// Reactivate a raw material
pub async fn reactivate_raw_material(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(raw_material_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = RawMaterialService::new(state.db);
    service
        .reactivate(TenantScope::from(&current_user.0), raw_material_id)
        .await?;
    Ok(Json(()))
}

/// Current derived stock for a raw material
pub async fn get_current_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(raw_material_id): Path<Uuid>,
) -> AppResult<Json<CurrentStock>> {
    let service = LedgerService::new(state.db);
    let stock = service
        .get_current_stock(TenantScope::from(&current_user.0), raw_material_id)
        .await?;
    Ok(Json(stock))
}

/// Chronological ledger for a raw material
pub async fn list_ledger_entries(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(raw_material_id): Path<Uuid>,
) -> AppResult<Json<Vec<InventoryLedgerEntry>>> {
    let service = LedgerService::new(state.db);
    let entries = service
        .list_entries(TenantScope::from(&current_user.0), raw_material_id)
        .await?;
    Ok(Json(entries))
}
