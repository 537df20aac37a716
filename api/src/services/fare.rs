//! Flight fare request features.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::preprocess::{FeatureRow, FeatureValue};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlightFareRequest {
    /// Airline name (e.g. "Vistara")
    pub airline: String,
    pub source_city: String,
    pub destination_city: String,
    /// Departure time band (e.g. "Morning")
    pub departure_time: String,
    /// Arrival time band (e.g. "Night")
    pub arrival_time: String,
    /// Number of stops as text ("zero", "one", "two_or_more")
    pub stops: String,
    /// Travel class ("Economy" or "Business")
    pub flight_class: String,
    /// Flight duration in hours
    pub duration: f64,
    /// Days between booking and departure
    #[serde(rename = "days_left")]
    pub days_left: i32,
}

impl FlightFareRequest {
    pub fn to_row(&self) -> FeatureRow {
        FeatureRow::new()
            .with("airline", FeatureValue::Text(self.airline.clone()))
            .with("source_city", FeatureValue::Text(self.source_city.clone()))
            .with(
                "departure_time",
                FeatureValue::Text(self.departure_time.clone()),
            )
            .with("stops", FeatureValue::Text(self.stops.clone()))
            .with("arrival_time", FeatureValue::Text(self.arrival_time.clone()))
            .with(
                "destination_city",
                FeatureValue::Text(self.destination_city.clone()),
            )
            .with("class", FeatureValue::Text(self.flight_class.clone()))
            .with("duration", FeatureValue::Float(self.duration))
            .with("days_left", FeatureValue::Int(self.days_left.into()))
    }
}
