//! Flight delay regression and classification.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::airports::normalize_code;
use super::pipeline::{Pipeline, PipelineError};
use super::preprocess::{FeatureRow, FeatureValue};

/// Feature the classifier receives on top of the regressor's inputs.
pub const PREDICTED_DELAY_FEATURE: &str = "PREDICTED_DELAY";

pub const LABEL_DELAYED: &str = "Delayed";
pub const LABEL_ON_TIME: &str = "On Time";

/// One flight leg to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlightDelayRequest {
    /// Month of departure (1-12)
    pub month: i32,
    /// Day of month (1-31)
    pub day: i32,
    /// Day of week (1 = Sunday)
    #[serde(rename = "daysofweek")]
    pub days_of_week: i32,
    /// Origin IATA code
    pub origin_airport: String,
    /// Destination IATA code
    pub destination_airport: String,
    /// Scheduled departure as HHMM (e.g. 1435)
    pub scheduled_departure: i32,
    /// Departure delay in minutes
    pub departure_delay: i32,
    /// Air time in minutes
    pub air_time: f64,
    /// Distance in miles
    pub distance: i32,
    /// Scheduled arrival as HHMM
    pub scheduled_arrival: i32,
}

impl FlightDelayRequest {
    /// Raw feature values under their training-time column names.
    pub fn to_row(&self) -> FeatureRow {
        FeatureRow::new()
            .with("MONTH", FeatureValue::Int(self.month.into()))
            .with("DAY", FeatureValue::Int(self.day.into()))
            .with("DAY_OF_WEEK", FeatureValue::Int(self.days_of_week.into()))
            .with(
                "ORIGIN_AIRPORT",
                FeatureValue::Text(normalize_code(&self.origin_airport)),
            )
            .with(
                "DESTINATION_AIRPORT",
                FeatureValue::Text(normalize_code(&self.destination_airport)),
            )
            .with(
                "SCHEDULED_DEPARTURE",
                FeatureValue::Int(self.scheduled_departure.into()),
            )
            .with(
                "DEPARTURE_DELAY",
                FeatureValue::Int(self.departure_delay.into()),
            )
            .with("AIR_TIME", FeatureValue::Float(self.air_time))
            .with("DISTANCE", FeatureValue::Int(self.distance.into()))
            .with(
                "SCHEDULED_ARRIVAL",
                FeatureValue::Int(self.scheduled_arrival.into()),
            )
    }
}

/// Delay regressor plus the optional classifier stacked on its output.
#[derive(Debug, Clone)]
pub struct DelayService {
    regressor: Pipeline,
    classifier: Option<Pipeline>,
}

impl DelayService {
    pub fn new(regressor: Pipeline, classifier: Option<Pipeline>) -> Self {
        Self {
            regressor,
            classifier,
        }
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Predicted arrival delay in minutes, rounded to 2 decimals.
    pub fn predict(&self, request: &FlightDelayRequest) -> Result<f64, PipelineError> {
        self.regressor.predict(&request.to_row())
    }

    /// Predict the delay, then classify the flight using the request features
    /// plus the predicted delay. Returns `None` when no classifier is loaded.
    pub fn classify(
        &self,
        request: &FlightDelayRequest,
    ) -> Option<Result<(f64, &'static str), PipelineError>> {
        self.classifier
            .as_ref()
            .map(|classifier| self.classify_with(classifier, request))
    }

    fn classify_with(
        &self,
        classifier: &Pipeline,
        request: &FlightDelayRequest,
    ) -> Result<(f64, &'static str), PipelineError> {
        let row = request.to_row();
        let predicted_delay = self.regressor.predict(&row)?;
        let row = row.with(
            PREDICTED_DELAY_FEATURE,
            FeatureValue::Float(predicted_delay),
        );
        let label = match classifier.classify(&row)? {
            1 => LABEL_DELAYED,
            _ => LABEL_ON_TIME,
        };
        Ok((predicted_delay, label))
    }
}
