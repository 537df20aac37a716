use sqlx::PgPool;
use uuid::Uuid;

use super::models::DelayPrediction;
use crate::helpers::{ceil_2dp, f64_to_decimal_2dp};
use crate::services::airports::normalize_code;
use crate::services::delay::FlightDelayRequest;

const DELAY_PREDICTION_COLUMNS: &str = "id, month, day, days_of_week, origin_airport, destination_airport,
     scheduled_departure, scheduled_arrival, departure_delay, air_time, distance,
     predicted_delay, created_at";

/// List all logged delay predictions, oldest first.
pub async fn list_delay_predictions(pool: &PgPool) -> Result<Vec<DelayPrediction>, sqlx::Error> {
    sqlx::query_as::<_, DelayPrediction>(&format!(
        "SELECT {} FROM delay_predictions ORDER BY created_at, id",
        DELAY_PREDICTION_COLUMNS
    ))
    .fetch_all(pool)
    .await
}

/// Append a delay prediction (append-only) inside a transaction.
///
/// Values with no `NUMERIC` representation are rejected before anything is
/// written. The transaction is only committed once the row has been read
/// back; any error drops it, which rolls the insert back.
pub async fn insert_delay_prediction(
    pool: &PgPool,
    request: &FlightDelayRequest,
    predicted_delay: f64,
) -> Result<DelayPrediction, sqlx::Error> {
    let air_time = f64_to_decimal_2dp(ceil_2dp(request.air_time))
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    let predicted_delay = f64_to_decimal_2dp(predicted_delay)
        .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

    let mut tx = pool.begin().await?;

    let record = sqlx::query_as::<_, DelayPrediction>(&format!(
        "INSERT INTO delay_predictions (
            id, month, day, days_of_week, origin_airport, destination_airport,
            scheduled_departure, scheduled_arrival, departure_delay, air_time, distance,
            predicted_delay, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
        RETURNING {}",
        DELAY_PREDICTION_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(request.month)
    .bind(request.day)
    .bind(request.days_of_week)
    .bind(normalize_code(&request.origin_airport))
    .bind(normalize_code(&request.destination_airport))
    .bind(request.scheduled_departure)
    .bind(request.scheduled_arrival)
    .bind(request.departure_delay)
    .bind(air_time)
    .bind(request.distance)
    .bind(predicted_delay)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(record)
}
