//! Route definitions for the Stockroom API

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/products", product_routes(max_upload_bytes))
        .nest("/locations", location_routes())
        .nest("/stock", stock_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/exports", export_routes())
}

/// Product catalogue routes
fn product_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/import",
            post(handlers::import_products).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/:id",
            get(handlers::get_product).patch(handlers::update_product),
        )
}

/// Storage location routes
fn location_routes() -> Router<AppState> {
    Router::new().route(
        "/",
        get(handlers::list_locations).post(handlers::create_location),
    )
}

/// Stock balance and movement routes
fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_stock))
        .route("/move", post(handlers::move_stock))
        .route("/movements", get(handlers::list_movements))
}

/// Inventory health routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(handlers::get_inventory_health))
        .route("/alerts", get(handlers::get_alerts))
}

/// Snapshot download routes
fn export_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/inventory-snapshot.xlsx",
            get(handlers::download_inventory_snapshot_xlsx),
        )
        .route(
            "/inventory-snapshot.csv",
            get(handlers::download_inventory_snapshot_csv),
        )
}
