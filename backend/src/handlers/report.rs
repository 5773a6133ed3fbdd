//! HTTP handlers for inventory report endpoints
//!
//! Every report supports `?format=csv` for download; the default is JSON.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::TenantScope;
use crate::services::report::{ReportRange, ReportService};
use crate::AppState;

/// Query parameters shared by the windowed reports
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub format: Option<String>,
}

impl ReportQuery {
    fn range(&self) -> ReportRange {
        ReportRange {
            from: self.from,
            to: self.to,
        }
    }

    fn wants_csv(&self) -> bool {
        self.format.as_deref() == Some("csv")
    }
}

fn render<T: Serialize>(rows: Vec<T>, as_csv: bool) -> AppResult<Response> {
    if as_csv {
        let csv = ReportService::export_to_csv(&rows)?;
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(rows).into_response())
    }
}

/// Current stock and value per material
pub async fn current_stock_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportService::new(state.db);
    let rows = service
        .current_stock_report(TenantScope::from(&current_user.0))
        .await?;
    render(rows, query.wants_csv())
}

/// Sale consumption per material over a window
pub async fn consumption_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportService::new(state.db);
    let rows = service
        .consumption_report(TenantScope::from(&current_user.0), query.range())
        .await?;
    render(rows, query.wants_csv())
}

/// Wastage per material and reason over a window
pub async fn wastage_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportService::new(state.db);
    let rows = service
        .wastage_report(TenantScope::from(&current_user.0), query.range())
        .await?;
    render(rows, query.wants_csv())
}

/// Stock variance per material over a window
pub async fn variance_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportService::new(state.db);
    let rows = service
        .variance_report(TenantScope::from(&current_user.0), query.range())
        .await?;
    render(rows, query.wants_csv())
}
