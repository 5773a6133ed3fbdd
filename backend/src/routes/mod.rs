//! Route definitions for the Restaurant POS Inventory Platform

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, internal_auth_middleware},
    AppState,
};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - raw material registry
        .nest("/raw-materials", raw_material_routes())
        // Protected routes - vendor registry
        .nest("/vendors", vendor_routes())
        // Protected routes - inventory ledger, GRNs, alerts, reports
        .nest("/inventory", inventory_routes())
        // Internal routes - order service integration (shared-secret token)
        .nest("/internal", internal_routes())
}

/// Raw material registry routes (protected)
fn raw_material_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_raw_materials).post(handlers::create_raw_material),
        )
        .route("/:raw_material_id", get(handlers::get_raw_material))
        .route("/:raw_material_id/threshold", put(handlers::update_threshold))
        .route(
            "/:raw_material_id/deactivate",
            post(handlers::deactivate_raw_material),
        )
        .route(
            "/:raw_material_id/reactivate",
            post(handlers::reactivate_raw_material),
        )
        .route("/:raw_material_id/stock", get(handlers::get_current_stock))
        .route("/:raw_material_id/ledger", get(handlers::list_ledger_entries))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Vendor registry routes (protected)
fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_vendors).post(handlers::create_vendor))
        .route("/:vendor_id", get(handlers::get_vendor))
        .route("/:vendor_id/deactivate", post(handlers::deactivate_vendor))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory ledger routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        // Goods receipts
        .route("/grn", get(handlers::list_grns).post(handlers::create_grn))
        .route("/grn/:grn_id", get(handlers::get_grn))
        // Ledger writers
        .route("/adjustments", post(handlers::record_adjustment))
        .route("/wastage", post(handlers::record_wastage))
        .route("/opening-balance", post(handlers::record_opening_balance))
        // Alerts
        .route("/alerts", get(handlers::get_active_alerts))
        .route("/alerts/history", get(handlers::get_alert_history))
        // Reports
        .route("/reports/current-stock", get(handlers::current_stock_report))
        .route("/reports/consumption", get(handlers::consumption_report))
        .route("/reports/wastage", get(handlers::wastage_report))
        .route("/reports/variance", get(handlers::variance_report))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Service-to-service routes guarded by the internal token
fn internal_routes() -> Router<AppState> {
    Router::new()
        .route("/orders/consume", post(handlers::consume_order))
        .route("/cost-snapshot", post(handlers::cost_snapshot))
        .route_layer(middleware::from_fn(internal_auth_middleware))
}
