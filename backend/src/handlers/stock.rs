//! HTTP handler for raw stock balances

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::models::StockRow;
use crate::services::StockService;
use crate::AppState;

/// List every stock balance
pub async fn list_stock(State(state): State<AppState>) -> AppResult<Json<Vec<StockRow>>> {
    let service = StockService::new(state.db);
    let rows = service.list_stock().await?;
    Ok(Json(rows))
}
