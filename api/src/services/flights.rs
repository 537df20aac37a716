//! Two-airport flight path lookup.

use serde::Serialize;
use utoipa::ToSchema;

use super::airports::{Airport, AirportError, AirportStore};

/// Mean Earth radius used for great-circle distances (km).
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Endpoints of a flight plus the great-circle distance between them.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FlightPath {
    pub departure: Airport,
    pub arrival: Airport,
    /// Great-circle distance in kilometres, rounded to 1 decimal place
    pub distance_km: f64,
}

/// Resolve both airports of a flight. Fails on the first unknown code,
/// departure first.
pub async fn search_flight(
    store: &AirportStore,
    departure: &str,
    arrival: &str,
) -> Result<FlightPath, AirportError> {
    let departure = store.get(departure).await?;
    let arrival = store.get(arrival).await?;
    let distance_km = (haversine_km(&departure, &arrival) * 10.0).round() / 10.0;
    Ok(FlightPath {
        departure,
        arrival,
        distance_km,
    })
}

/// Haversine great-circle distance between two airports in kilometres.
pub fn haversine_km(a: &Airport, b: &Airport) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
