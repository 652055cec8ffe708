//! Storage location service

use serde::Deserialize;
use shared::require_text;
use sqlx::PgPool;

use crate::error::AppResult;
use crate::models::{Location, LocationRow};

/// Service for managing storage locations
#[derive(Clone)]
pub struct LocationService {
    db: PgPool,
}

/// Input for creating a location
#[derive(Debug, Deserialize)]
pub struct CreateLocationInput {
    pub name: Option<String>,
}

impl LocationService {
    /// Create a new LocationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a location
    pub async fn create_location(&self, input: CreateLocationInput) -> AppResult<Location> {
        let name = require_text("name", input.name.as_deref())?;

        let row = sqlx::query_as::<_, LocationRow>(
            r#"
            INSERT INTO locations (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(&name)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(location_id = row.id, name = %row.name, "Location created");
        Ok(row.into())
    }

    /// List locations ordered by id
    pub async fn list_locations(&self) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT id, name, created_at FROM locations ORDER BY id ASC",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Location::from).collect())
    }
}
