//! HTTP handlers for goods-receipt endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::TenantScope;
use crate::services::grn::{CreateGrnInput, GoodsReceiptNote, GrnService, GrnWithItems};
use crate::AppState;

/// Create a goods receipt note
pub async fn create_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateGrnInput>,
) -> AppResult<Json<GrnWithItems>> {
    let service = GrnService::new(state.db);
    let grn = service
        .create_grn(
            TenantScope::from(&current_user.0),
            current_user.0.user_id,
            input,
        )
        .await?;
    Ok(Json(grn))
}

/// List GRN headers for the outlet
pub async fn list_grns(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<GoodsReceiptNote>>> {
    let service = GrnService::new(state.db);
    let grns = service.list_grns(TenantScope::from(&current_user.0)).await?;
    Ok(Json(grns))
}

/// Get a GRN with its line items
pub async fn get_grn(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(grn_id): Path<Uuid>,
) -> AppResult<Json<GrnWithItems>> {
    let service = GrnService::new(state.db);
    let grn = service
        .get_grn(TenantScope::from(&current_user.0), grn_id)
        .await?;
    Ok(Json(grn))
}
