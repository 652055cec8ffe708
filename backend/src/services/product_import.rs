//! Bulk product import from CSV
//!
//! Expected columns: `skuCode,name,unit,reorderLevel` with a header row.
//! Invalid rows are reported and skipped; the valid ones are inserted in
//! a single statement that ignores SKU codes already in the catalogue.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::{parse_reorder_level, unit_or_default, NewProduct, DEFAULT_UNIT};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// A rejected CSV row
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvalidRow {
    /// Line in the uploaded file; the header is line 1
    pub row: u64,
    pub field: String,
    pub message: String,
}

/// Defaults applied to blank cells
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportDefaults {
    pub unit: String,
    pub reorder_level: i32,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            unit: DEFAULT_UNIT.to_string(),
            reorder_level: 0,
        }
    }
}

/// Summary returned to the uploader
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub received_rows: usize,
    pub valid_rows: usize,
    pub inserted: usize,
    pub duplicates_existing: usize,
    pub duplicates_in_file: usize,
    pub invalid_rows: Vec<InvalidRow>,
    pub defaults: ImportDefaults,
}

/// Outcome of parsing an upload, before touching the database
#[derive(Debug, Default, PartialEq)]
pub struct ParsedImport {
    pub received_rows: usize,
    pub products: Vec<NewProduct>,
    pub duplicates_in_file: usize,
    pub invalid_rows: Vec<InvalidRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CsvProduct {
    #[serde(default)]
    sku_code: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    reorder_level: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse and validate an uploaded CSV file
pub fn parse_products_csv(data: &[u8]) -> AppResult<ParsedImport> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let unreadable =
        |e: csv::Error| AppError::validation("file", format!("CSV could not be parsed: {}", e));

    let headers = reader.headers().map_err(unreadable)?.clone();
    let mut parsed = ParsedImport::default();
    let mut seen = HashSet::new();

    for result in reader.records() {
        let record = result.map_err(unreadable)?;
        parsed.received_rows += 1;
        let line = record
            .position()
            .map_or(parsed.received_rows as u64 + 1, |p| p.line());
        let row: CsvProduct = record.deserialize(Some(&headers)).map_err(unreadable)?;

        let invalid = |field: &str, message: &str| InvalidRow {
            row: line,
            field: field.to_string(),
            message: message.to_string(),
        };

        let Some(sku_code) = non_empty(row.sku_code) else {
            parsed.invalid_rows.push(invalid("skuCode", "skuCode is required"));
            continue;
        };
        let Some(name) = non_empty(row.name) else {
            parsed.invalid_rows.push(invalid("name", "name is required"));
            continue;
        };
        let Some(reorder_level) = parse_reorder_level(row.reorder_level.as_deref().unwrap_or(""))
        else {
            parsed
                .invalid_rows
                .push(invalid("reorderLevel", "reorderLevel must be a number >= 0"));
            continue;
        };

        if !seen.insert(sku_code.clone()) {
            parsed.duplicates_in_file += 1;
            continue;
        }

        parsed.products.push(NewProduct {
            sku_code,
            name,
            unit: unit_or_default(row.unit.as_deref()),
            reorder_level,
        });
    }

    Ok(parsed)
}

/// Service for importing products in bulk
#[derive(Clone)]
pub struct ProductImportService {
    db: PgPool,
}

impl ProductImportService {
    /// Create a new ProductImportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Import the products of an uploaded CSV file
    pub async fn import_csv(&self, data: &[u8]) -> AppResult<ImportResult> {
        let parsed = parse_products_csv(data)?;
        let valid_rows = parsed.products.len();

        let inserted = if parsed.products.is_empty() {
            0
        } else {
            self.insert_new(&parsed.products).await?
        };

        tracing::info!(
            received = parsed.received_rows,
            valid = valid_rows,
            inserted,
            invalid = parsed.invalid_rows.len(),
            "Product CSV imported"
        );

        Ok(ImportResult {
            received_rows: parsed.received_rows,
            valid_rows,
            inserted,
            duplicates_existing: valid_rows - inserted,
            duplicates_in_file: parsed.duplicates_in_file,
            invalid_rows: parsed.invalid_rows,
            defaults: ImportDefaults::default(),
        })
    }

    /// Insert products whose SKU code is not taken; returns how many were inserted
    async fn insert_new(&self, products: &[NewProduct]) -> AppResult<usize> {
        let sku_codes: Vec<&str> = products.iter().map(|p| p.sku_code.as_str()).collect();
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        let units: Vec<&str> = products.iter().map(|p| p.unit.as_str()).collect();
        let reorder_levels: Vec<i32> = products.iter().map(|p| p.reorder_level).collect();

        let result = sqlx::query(
            r#"
            INSERT INTO products (sku_code, name, unit, reorder_level)
            SELECT * FROM UNNEST($1::TEXT[], $2::TEXT[], $3::TEXT[], $4::INT[])
            ON CONFLICT (sku_code) DO NOTHING
            "#,
        )
        .bind(&sku_codes)
        .bind(&names)
        .bind(&units)
        .bind(&reorder_levels)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() as usize)
    }
}
