//! Flight delay endpoints.
//!
//! - POST /delay/predict/    (logged to `delay_predictions`)
//! - POST /delay/classify/
//! - GET  /delay/predictions/

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::db::{models, queries};
use crate::errors::{AppError, ErrorResponse};
use crate::helpers::dec_to_f64;
use crate::services::delay::{DelayService, FlightDelayRequest};

/// Shared state for delay endpoints.
#[derive(Clone)]
pub(crate) struct DelayState {
    pub(crate) pool: PgPool,
    pub(crate) service: Arc<DelayService>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DelayPredictionResponse {
    /// Predicted arrival delay in minutes (2 decimals)
    pub predicted_delay: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DelayClassificationResponse {
    /// Predicted arrival delay in minutes (2 decimals)
    pub predicted_delay: f64,
    /// "Delayed" or "On Time"
    pub classification: String,
}

/// A logged prediction as returned by GET /delay/predictions/.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecordResponse {
    pub id: Uuid,
    pub month: i32,
    pub day: i32,
    #[serde(rename = "daysofweek")]
    pub days_of_week: i32,
    pub origin_airport: String,
    pub destination_airport: String,
    pub scheduled_departure: i32,
    pub scheduled_arrival: i32,
    pub departure_delay: i32,
    pub air_time: f64,
    pub distance: i32,
    #[serde(rename = "predicted_delay")]
    pub predicted_delay: f64,
    #[serde(rename = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl From<models::DelayPrediction> for PredictionRecordResponse {
    fn from(p: models::DelayPrediction) -> Self {
        Self {
            id: p.id,
            month: p.month,
            day: p.day,
            days_of_week: p.days_of_week,
            origin_airport: p.origin_airport,
            destination_airport: p.destination_airport,
            scheduled_departure: p.scheduled_departure,
            scheduled_arrival: p.scheduled_arrival,
            departure_delay: p.departure_delay,
            air_time: dec_to_f64(p.air_time),
            distance: p.distance,
            predicted_delay: dec_to_f64(p.predicted_delay),
            created_at: p.created_at,
        }
    }
}

/// Predict the arrival delay of a flight and log the prediction.
#[utoipa::path(
    post,
    path = "/delay/predict/",
    tag = "Delay",
    request_body = FlightDelayRequest,
    responses(
        (status = 200, description = "Predicted delay", body = DelayPredictionResponse),
        (status = 500, description = "Prediction or logging failed", body = ErrorResponse),
    )
)]
pub async fn predict_delay(
    State(state): State<DelayState>,
    Json(request): Json<FlightDelayRequest>,
) -> Result<Json<DelayPredictionResponse>, AppError> {
    let predicted_delay = state.service.predict(&request)?;
    let record = queries::insert_delay_prediction(&state.pool, &request, predicted_delay).await?;

    tracing::info!(
        "Delay prediction {} for {} → {}: {} min",
        record.id,
        record.origin_airport,
        record.destination_airport,
        predicted_delay
    );

    Ok(Json(DelayPredictionResponse { predicted_delay }))
}

/// Predict the delay, then classify the flight as "Delayed" or "On Time".
#[utoipa::path(
    post,
    path = "/delay/classify/",
    tag = "Delay",
    request_body = FlightDelayRequest,
    responses(
        (status = 200, description = "Predicted delay and classification", body = DelayClassificationResponse),
        (status = 404, description = "No classifier configured", body = ErrorResponse),
        (status = 500, description = "Prediction failed", body = ErrorResponse),
    )
)]
pub async fn classify_delay(
    State(state): State<DelayState>,
    Json(request): Json<FlightDelayRequest>,
) -> Result<Json<DelayClassificationResponse>, AppError> {
    let (predicted_delay, label) = state
        .service
        .classify(&request)
        .ok_or_else(|| AppError::NotFound("Delay classifier not configured".to_string()))??;

    tracing::debug!(
        "Delay classification {} → {}: {} ({} min)",
        request.origin_airport,
        request.destination_airport,
        label,
        predicted_delay
    );

    Ok(Json(DelayClassificationResponse {
        predicted_delay,
        classification: label.to_string(),
    }))
}

/// List all logged delay predictions, oldest first.
#[utoipa::path(
    get,
    path = "/delay/predictions/",
    tag = "Delay",
    responses(
        (status = 200, description = "Logged predictions", body = Vec<PredictionRecordResponse>),
        (status = 500, description = "Database error", body = ErrorResponse),
    )
)]
pub async fn list_predictions(
    State(state): State<DelayState>,
) -> Result<Json<Vec<PredictionRecordResponse>>, AppError> {
    let records = queries::list_delay_predictions(&state.pool).await?;
    Ok(Json(
        records
            .into_iter()
            .map(PredictionRecordResponse::from)
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_prediction_record_json() {
        let id = Uuid::new_v4();
        let created_at = DateTime::parse_from_rfc3339("2024-10-18T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = PredictionRecordResponse::from(models::DelayPrediction {
            id,
            month: 1,
            day: 15,
            days_of_week: 4,
            origin_airport: "ATL".to_string(),
            destination_airport: "JFK".to_string(),
            scheduled_departure: 1430,
            scheduled_arrival: 1705,
            departure_delay: 25,
            air_time: Decimal::from_str("120.46").unwrap(),
            distance: 760,
            predicted_delay: Decimal::from_str("20.25").unwrap(),
            created_at,
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["daysofweek"], 4);
        assert_eq!(json["originAirport"], "ATL");
        assert_eq!(json["destinationAirport"], "JFK");
        assert_eq!(json["scheduledDeparture"], 1430);
        assert_eq!(json["scheduledArrival"], 1705);
        assert_eq!(json["departureDelay"], 25);
        assert_eq!(json["airTime"], 120.46);
        assert_eq!(json["distance"], 760);
        assert_eq!(json["predicted_delay"], 20.25);
        assert_eq!(json["created_at"], "2024-10-18T12:00:00Z");
        assert!(json.get("daysOfWeek").is_none());
    }
}
