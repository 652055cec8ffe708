//! HTTP handlers for inventory snapshot downloads

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;

use crate::error::AppResult;
use crate::handlers::DeadDaysQuery;
use crate::services::export::snapshot_filename;
use crate::services::ExportService;
use crate::AppState;

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn attachment(extension: &str) -> String {
    format!(
        "attachment; filename=\"{}\"",
        snapshot_filename(Utc::now(), extension)
    )
}

/// Download the inventory snapshot as a spreadsheet
pub async fn download_inventory_snapshot_xlsx(
    State(state): State<AppState>,
    Query(query): Query<DeadDaysQuery>,
) -> AppResult<impl IntoResponse> {
    let default = state.config.inventory.dead_days_threshold;
    let dead_days = query.resolve(default)?;
    let service = ExportService::new(state.db, default);
    let bytes = service.inventory_snapshot_xlsx(dead_days).await?;
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, attachment("xlsx")),
        ],
        bytes,
    ))
}

/// Download the inventory snapshot as CSV
pub async fn download_inventory_snapshot_csv(
    State(state): State<AppState>,
    Query(query): Query<DeadDaysQuery>,
) -> AppResult<impl IntoResponse> {
    let default = state.config.inventory.dead_days_threshold;
    let dead_days = query.resolve(default)?;
    let service = ExportService::new(state.db, default);
    let bytes = service.inventory_snapshot_csv(dead_days).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, attachment("csv")),
        ],
        bytes,
    ))
}
