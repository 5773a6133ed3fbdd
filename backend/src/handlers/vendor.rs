//! HTTP handlers for vendor registry endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::TenantScope;
use crate::services::vendor::{CreateVendorInput, Vendor, VendorService};
use crate::AppState;

/// Register a vendor
pub async fn create_vendor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateVendorInput>,
) -> AppResult<Json<Vendor>> {
    let service = VendorService::new(state.db);
    let vendor = service
        .create(TenantScope::from(&current_user.0), input)
        .await?;
    Ok(Json(vendor))
}

/// List vendors for the outlet
pub async fn list_vendors(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Vendor>>> {
    let service = VendorService::new(state.db);
    let vendors = service.list(TenantScope::from(&current_user.0)).await?;
    Ok(Json(vendors))
}

/// Get a vendor
pub async fn get_vendor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(vendor_id): Path<Uuid>,
) -> AppResult<Json<Vendor>> {
    let service = VendorService::new(state.db);
    let vendor = service
        .get(TenantScope::from(&current_user.0), vendor_id)
        .await?;
    Ok(Json(vendor))
}

/// Soft-deactivate a vendor
pub async fn deactivate_vendor(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(vendor_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = VendorService::new(state.db);
    service
        .deactivate(TenantScope::from(&current_user.0), vendor_id)
        .await?;
    Ok(Json(()))
}
