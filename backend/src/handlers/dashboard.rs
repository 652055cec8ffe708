//! HTTP handlers for the inventory dashboard

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::handlers::DeadDaysQuery;
use crate::models::{InventoryAlerts, InventoryHealthRow};
use crate::services::DashboardService;
use crate::AppState;

fn dashboard_service(state: &AppState) -> DashboardService {
    DashboardService::new(state.db.clone(), state.config.inventory.dead_days_threshold)
}

/// Inventory health of every balance
pub async fn get_inventory_health(
    State(state): State<AppState>,
    Query(query): Query<DeadDaysQuery>,
) -> AppResult<Json<Vec<InventoryHealthRow>>> {
    let service = dashboard_service(&state);
    let dead_days = query.resolve(service.default_dead_days())?;
    let rows = service.inventory_health(dead_days).await?;
    Ok(Json(rows))
}

/// Low and dead stock alerts
pub async fn get_alerts(
    State(state): State<AppState>,
    Query(query): Query<DeadDaysQuery>,
) -> AppResult<Json<InventoryAlerts>> {
    let service = dashboard_service(&state);
    let dead_days = query.resolve(service.default_dead_days())?;
    let alerts = service.alerts(dead_days).await?;
    Ok(Json(alerts))
}
