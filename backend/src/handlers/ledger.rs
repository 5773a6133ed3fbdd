//! HTTP handlers for ledger write endpoints (adjustments, wastage,
//! opening balances)

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::TenantScope;
use crate::services::ledger::{
    InventoryLedgerEntry, LedgerService, RecordAdjustmentInput, RecordOpeningBalanceInput,
    RecordWastageInput,
};
use crate::AppState;

/// Record a manual stock adjustment
pub async fn record_adjustment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordAdjustmentInput>,
) -> AppResult<Json<InventoryLedgerEntry>> {
    let service = LedgerService::new(state.db);
    let entry = service
        .record_adjustment(
            TenantScope::from(&current_user.0),
            current_user.0.user_id,
            input,
        )
        .await?;
    Ok(Json(entry))
}

/// Record wastage
pub async fn record_wastage(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordWastageInput>,
) -> AppResult<Json<InventoryLedgerEntry>> {
    let service = LedgerService::new(state.db);
    let entry = service
        .record_wastage(
            TenantScope::from(&current_user.0),
            current_user.0.user_id,
            input,
        )
        .await?;
    Ok(Json(entry))
}

/// Record a one-time opening balance
pub async fn record_opening_balance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordOpeningBalanceInput>,
) -> AppResult<Json<InventoryLedgerEntry>> {
    let service = LedgerService::new(state.db);
    let entry = service
        .record_opening_balance(
            TenantScope::from(&current_user.0),
            current_user.0.user_id,
            input,
        )
        .await?;
    Ok(Json(entry))
}
