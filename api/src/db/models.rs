use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// A logged delay prediction: the request fields plus the model output.
#[derive(Debug, Clone, FromRow)]
pub struct DelayPrediction {
    pub id: Uuid,
    pub month: i32,
    pub day: i32,
    pub days_of_week: i32,
    pub origin_airport: String,
    pub destination_airport: String,
    pub scheduled_departure: i32,
    pub scheduled_arrival: i32,
    pub departure_delay: i32,
    pub air_time: Decimal,
    pub distance: i32,
    pub predicted_delay: Decimal,
    pub created_at: DateTime<Utc>,
}
