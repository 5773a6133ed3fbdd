//! HTTP handlers for low-stock alert endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::TenantScope;
use crate::services::alert::{AlertService, LowStockAlert};
use crate::AppState;

/// Query parameters for alert history
#[derive(Debug, Deserialize)]
pub struct AlertHistoryQuery {
    pub raw_material_id: Option<Uuid>,
}

/// Open alerts for the outlet
pub async fn get_active_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<LowStockAlert>>> {
    let service = AlertService::new(state.db);
    let alerts = service
        .get_active_alerts(TenantScope::from(&current_user.0))
        .await?;
    Ok(Json(alerts))
}

/// Alert history, optionally narrowed to one raw material
pub async fn get_alert_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<AlertHistoryQuery>,
) -> AppResult<Json<Vec<LowStockAlert>>> {
    let service = AlertService::new(state.db);
    let alerts = service
        .get_alert_history(TenantScope::from(&current_user.0), query.raw_material_id)
        .await?;
    Ok(Json(alerts))
}
