//! HTTP handlers for stock movements and the ledger

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{parse_cursor, parse_page_limit, CursorPage, PageRequest};

use crate::error::{AppError, AppResult};
use crate::models::{MovementRequest, MovementResult, StockMovement};
use crate::services::StockMovementService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MovementPageQuery {
    pub limit: Option<String>,
    pub cursor: Option<String>,
}

impl MovementPageQuery {
    fn page(&self) -> AppResult<PageRequest> {
        let limit = parse_page_limit(self.limit.as_deref())
            .map_err(|msg| AppError::validation("limit", msg))?;
        let cursor =
            parse_cursor(self.cursor.as_deref()).map_err(|msg| AppError::validation("cursor", msg))?;
        Ok(PageRequest::new(limit, cursor))
    }
}

fn movement_service(state: &AppState) -> StockMovementService {
    StockMovementService::new(
        state.db.clone(),
        state.config.database.transaction_timeout_ms,
        state.config.inventory.dead_days_threshold,
    )
}

/// Record a stock movement
pub async fn move_stock(
    State(state): State<AppState>,
    payload: Result<Json<MovementRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<MovementResult>)> {
    let Json(request) = payload?;
    let result = movement_service(&state).record_movement(request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Newest-first page of the movement ledger
pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementPageQuery>,
) -> AppResult<Json<CursorPage<StockMovement>>> {
    let page = query.page()?;
    let movements = movement_service(&state).list_movements(page).await?;
    Ok(Json(movements))
}
