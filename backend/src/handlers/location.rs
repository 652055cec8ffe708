//! HTTP handlers for location endpoints

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};

use crate::error::AppResult;
use crate::models::Location;
use crate::services::location::CreateLocationInput;
use crate::services::LocationService;
use crate::AppState;

/// Create a location
pub async fn create_location(
    State(state): State<AppState>,
    payload: Result<Json<CreateLocationInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Location>)> {
    let Json(input) = payload?;
    let service = LocationService::new(state.db);
    let location = service.create_location(input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// List locations
pub async fn list_locations(State(state): State<AppState>) -> AppResult<Json<Vec<Location>>> {
    let service = LocationService::new(state.db);
    let locations = service.list_locations().await?;
    Ok(Json(locations))
}
