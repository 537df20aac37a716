use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::errors::{AppError, ErrorResponse};
use crate::services::fare::FlightFareRequest;
use crate::services::pipeline::Pipeline;

#[derive(Debug, Serialize, ToSchema)]
pub struct FarePredictionResponse {
    /// Predicted fare (2 decimals)
    pub predicted_fare: f64,
}

/// Predict a flight fare. Fare predictions are not logged.
#[utoipa::path(
    post,
    path = "/predict/",
    tag = "Fare",
    request_body = FlightFareRequest,
    responses(
        (status = 200, description = "Predicted fare", body = FarePredictionResponse),
        (status = 500, description = "Prediction failed", body = ErrorResponse),
    )
)]
pub async fn predict_fare(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<FlightFareRequest>,
) -> Result<Json<FarePredictionResponse>, AppError> {
    let predicted_fare = pipeline.predict(&request.to_row())?;
    tracing::debug!(
        "Fare prediction {} {} → {}: {}",
        request.airline,
        request.source_city,
        request.destination_city,
        predicted_fare
    );
    Ok(Json(FarePredictionResponse { predicted_fare }))
}
