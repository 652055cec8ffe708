//! Inventory snapshot exports
//!
//! Both formats carry one row per inventory health row, in the order the
//! dashboard lists them.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use sqlx::PgPool;
use xlsxwriter::Workbook;

use crate::error::{AppError, AppResult};
use crate::models::InventoryHealthRow;
use crate::services::dashboard::DashboardService;

/// Worksheet holding the snapshot
pub const SHEET_NAME: &str = "Inventory";

/// Column headers shared by both formats
pub const SNAPSHOT_HEADERS: [&str; 7] = [
    "SKU Code",
    "Product Name",
    "Location",
    "Quantity",
    "Unit",
    "Status",
    "Days Idle",
];

/// One exported line
#[derive(Debug, Serialize)]
struct SnapshotRecord<'a> {
    #[serde(rename = "SKU Code")]
    sku_code: &'a str,
    #[serde(rename = "Product Name")]
    product_name: &'a str,
    #[serde(rename = "Location")]
    location: &'a str,
    #[serde(rename = "Quantity")]
    quantity: String,
    #[serde(rename = "Unit")]
    unit: &'a str,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Days Idle")]
    days_idle: i64,
}

impl<'a> From<&'a InventoryHealthRow> for SnapshotRecord<'a> {
    fn from(row: &'a InventoryHealthRow) -> Self {
        SnapshotRecord {
            sku_code: &row.product.sku_code,
            product_name: &row.product.name,
            location: &row.location.name,
            quantity: row.quantity.normalize().to_string(),
            unit: &row.product.unit,
            status: row.status.as_str(),
            days_idle: row.days_idle,
        }
    }
}

/// Attachment name for a snapshot taken at `now`
pub fn snapshot_filename(now: DateTime<Utc>, extension: &str) -> String {
    format!("inventory-snapshot-{}.{}", now.format("%Y-%m-%d"), extension)
}

/// Render health rows as CSV with a header line
pub fn snapshot_to_csv(rows: &[InventoryHealthRow]) -> AppResult<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    if rows.is_empty() {
        wtr.write_record(SNAPSHOT_HEADERS)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    for row in rows {
        wtr.serialize(SnapshotRecord::from(row))
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
    }
    wtr.into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))
}

fn xlsx_error(e: xlsxwriter::XlsxError) -> AppError {
    AppError::Internal(format!("XLSX writer error: {}", e))
}

/// Render health rows as an xlsx workbook
///
/// The writer only works against a file, so the workbook is written to a
/// temporary path, read back and removed. Blocking; run it off the runtime.
pub fn snapshot_to_xlsx(rows: &[InventoryHealthRow]) -> AppResult<Vec<u8>> {
    let path = std::env::temp_dir().join(format!("stockroom-{}.xlsx", uuid::Uuid::new_v4()));
    let name = path
        .to_str()
        .ok_or_else(|| AppError::Internal("temporary path is not valid UTF-8".to_string()))?;

    let written = write_workbook(name, rows);
    let bytes = written.and_then(|_| {
        std::fs::read(&path).map_err(|e| AppError::Internal(format!("XLSX read error: {}", e)))
    });
    if let Err(e) = std::fs::remove_file(&path) {
        tracing::debug!(path = %path.display(), error = %e, "Failed to remove temporary workbook");
    }
    bytes
}

fn write_workbook(name: &str, rows: &[InventoryHealthRow]) -> AppResult<()> {
    let workbook = Workbook::new(name).map_err(xlsx_error)?;
    let mut worksheet = workbook.add_worksheet(Some(SHEET_NAME)).map_err(xlsx_error)?;

    for (col, header) in SNAPSHOT_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, header, None)
            .map_err(xlsx_error)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let line = (i + 1) as u32;
        worksheet
            .write_string(line, 0, &row.product.sku_code, None)
            .map_err(xlsx_error)?;
        worksheet
            .write_string(line, 1, &row.product.name, None)
            .map_err(xlsx_error)?;
        worksheet
            .write_string(line, 2, &row.location.name, None)
            .map_err(xlsx_error)?;
        worksheet
            .write_number(line, 3, row.quantity.to_f64().unwrap_or_default(), None)
            .map_err(xlsx_error)?;
        worksheet
            .write_string(line, 4, &row.product.unit, None)
            .map_err(xlsx_error)?;
        worksheet
            .write_string(line, 5, row.status.as_str(), None)
            .map_err(xlsx_error)?;
        worksheet
            .write_number(line, 6, row.days_idle as f64, None)
            .map_err(xlsx_error)?;
    }

    workbook.close().map_err(xlsx_error)
}

/// Service producing downloadable inventory snapshots
#[derive(Clone)]
pub struct ExportService {
    dashboard: DashboardService,
}

impl ExportService {
    /// Create a new ExportService instance
    pub fn new(db: PgPool, dead_days: i64) -> Self {
        Self {
            dashboard: DashboardService::new(db, dead_days),
        }
    }

    /// Spreadsheet snapshot of inventory health
    pub async fn inventory_snapshot_xlsx(&self, dead_days: i64) -> AppResult<Vec<u8>> {
        let rows = self.dashboard.inventory_health(dead_days).await?;
        let count = rows.len();
        let bytes = tokio::task::spawn_blocking(move || snapshot_to_xlsx(&rows))
            .await
            .map_err(|e| AppError::Internal(format!("export task failed: {}", e)))??;

        tracing::info!(rows = count, bytes = bytes.len(), "Inventory snapshot exported as xlsx");
        Ok(bytes)
    }

    /// CSV snapshot of inventory health
    pub async fn inventory_snapshot_csv(&self, dead_days: i64) -> AppResult<Vec<u8>> {
        let rows = self.dashboard.inventory_health(dead_days).await?;
        let bytes = snapshot_to_csv(&rows)?;

        tracing::info!(rows = rows.len(), "Inventory snapshot exported as csv");
        Ok(bytes)
    }
}
