//! POST /search-flight: resolve the two airports of a flight.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::services::airports::{AirportError, SharedAirportStore};
use crate::services::flights::{search_flight as find_flight_path, FlightPath};

#[derive(Debug, Deserialize, ToSchema)]
pub struct FlightSearchRequest {
    /// Departure IATA code
    pub departure: String,
    /// Arrival IATA code
    pub arrival: String,
}

/// Look up a flight between two airports.
///
/// An unknown code is a client error here (400), unlike the airport
/// endpoints where it is a missing resource (404).
#[utoipa::path(
    post,
    path = "/search-flight",
    tag = "Flights",
    request_body = FlightSearchRequest,
    responses(
        (status = 200, description = "Both airports and the distance between them", body = FlightPath),
        (status = 400, description = "Unknown departure or arrival code", body = ErrorResponse),
    )
)]
pub async fn search_flight(
    State(store): State<SharedAirportStore>,
    Json(request): Json<FlightSearchRequest>,
) -> Result<Json<FlightPath>, AppError> {
    find_flight_path(&store, &request.departure, &request.arrival)
        .await
        .map(Json)
        .map_err(|err| match err {
            AirportError::NotFound(code) => {
                AppError::BadRequest(format!("Unknown airport code {}", code))
            }
            other => other.into(),
        })
}
