//! Airport reference data endpoints.
//!
//! - GET /airports/
//! - GET /airports/:iata_code
//! - POST /airports/
//! - DELETE /airports/:iata_code

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::services::airports::{Airport, SharedAirportStore};

/// Confirmation returned by DELETE.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub detail: String,
}

/// List all airports in load order.
#[utoipa::path(
    get,
    path = "/airports/",
    tag = "Airports",
    responses(
        (status = 200, description = "List of airports", body = Vec<Airport>),
    )
)]
pub async fn list_airports(State(store): State<SharedAirportStore>) -> Json<Vec<Airport>> {
    Json(store.list().await)
}

/// Get an airport by IATA code (case-insensitive).
#[utoipa::path(
    get,
    path = "/airports/{iata_code}",
    tag = "Airports",
    params(
        ("iata_code" = String, Path, description = "IATA code of the airport"),
    ),
    responses(
        (status = 200, description = "The airport", body = Airport),
        (status = 404, description = "Airport not found", body = ErrorResponse),
    )
)]
pub async fn get_airport(
    State(store): State<SharedAirportStore>,
    Path(iata_code): Path<String>,
) -> Result<Json<Airport>, AppError> {
    Ok(Json(store.get(&iata_code).await?))
}

/// Add an airport. The code is stored upper-cased. Additions live in memory
/// only and are lost on restart.
#[utoipa::path(
    post,
    path = "/airports/",
    tag = "Airports",
    request_body = Airport,
    responses(
        (status = 200, description = "The stored airport", body = Airport),
        (status = 400, description = "Invalid or duplicate airport", body = ErrorResponse),
    )
)]
pub async fn add_airport(
    State(store): State<SharedAirportStore>,
    Json(airport): Json<Airport>,
) -> Result<Json<Airport>, AppError> {
    let stored = store.insert(airport).await?;
    tracing::info!("Added airport {} ({})", stored.iata, stored.name);
    Ok(Json(stored))
}

/// Delete an airport by IATA code.
#[utoipa::path(
    delete,
    path = "/airports/{iata_code}",
    tag = "Airports",
    params(
        ("iata_code" = String, Path, description = "IATA code of the airport"),
    ),
    responses(
        (status = 200, description = "Airport deleted", body = DeleteResponse),
        (status = 404, description = "Airport not found", body = ErrorResponse),
    )
)]
pub async fn delete_airport(
    State(store): State<SharedAirportStore>,
    Path(iata_code): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let removed = store.delete(&iata_code).await?;
    tracing::info!("Deleted airport {}", removed.iata);
    Ok(Json(DeleteResponse {
        detail: format!("Airport {} deleted", removed.iata),
    }))
}
