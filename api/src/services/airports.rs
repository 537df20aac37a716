//! In-memory airport reference table.
//!
//! Loaded once at startup from a CSV file and mutated by the add/delete
//! endpoints. Writes are never persisted back to the file: the table resets
//! to the CSV contents on restart.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use utoipa::ToSchema;

/// Errors raised by airport store operations.
#[derive(Debug, Error)]
pub enum AirportError {
    #[error("Airport {0} not found")]
    NotFound(String),
    #[error("Airport {0} already exists")]
    Duplicate(String),
    #[error("Invalid airport: {0}")]
    Invalid(String),
}

/// Errors raised while reading the airport CSV at startup.
#[derive(Debug, Error)]
pub enum AirportLoadError {
    #[error("IO error reading airports: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error reading airports: {0}")]
    Csv(#[from] csv::Error),
}

/// An airport entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Airport {
    /// Airport name (e.g. "Hartsfield-Jackson Atlanta International Airport")
    pub name: String,
    /// Latitude (WGS84)
    pub latitude: f64,
    /// Longitude (WGS84)
    pub longitude: f64,
    /// IATA code, stored upper-cased (e.g. "ATL")
    pub iata: String,
}

impl Airport {
    /// Return the stored form: trimmed, upper-cased code and checked coordinates.
    fn normalized(self) -> Result<Self, AirportError> {
        let iata = normalize_code(&self.iata);
        if iata.is_empty() {
            return Err(AirportError::Invalid("IATA code must not be empty".into()));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AirportError::Invalid(format!(
                "latitude {} out of range [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AirportError::Invalid(format!(
                "longitude {} out of range [-180, 180]",
                self.longitude
            )));
        }
        Ok(Self { iata, ..self })
    }
}

/// Upper-case and trim an IATA code for lookup or storage.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Airport table with load-order preserving, whole-table scan lookups.
#[derive(Debug, Default)]
pub struct AirportStore {
    airports: RwLock<Vec<Airport>>,
}

/// Shared handle used as axum state.
pub type SharedAirportStore = Arc<AirportStore>;

impl AirportStore {
    pub fn new(airports: Vec<Airport>) -> Self {
        Self {
            airports: RwLock::new(airports),
        }
    }

    /// All airports in load order.
    pub async fn list(&self) -> Vec<Airport> {
        self.airports.read().await.clone()
    }

    pub async fn get(&self, code: &str) -> Result<Airport, AirportError> {
        let code = normalize_code(code);
        self.airports
            .read()
            .await
            .iter()
            .find(|a| a.iata == code)
            .cloned()
            .ok_or(AirportError::NotFound(code))
    }

    /// Append an airport, returning its stored (normalized) form.
    pub async fn insert(&self, airport: Airport) -> Result<Airport, AirportError> {
        let airport = airport.normalized()?;
        let mut airports = self.airports.write().await;
        if airports.iter().any(|a| a.iata == airport.iata) {
            return Err(AirportError::Duplicate(airport.iata));
        }
        airports.push(airport.clone());
        Ok(airport)
    }

    /// Remove the airport with the given code, returning it.
    pub async fn delete(&self, code: &str) -> Result<Airport, AirportError> {
        let code = normalize_code(code);
        let mut airports = self.airports.write().await;
        let idx = airports
            .iter()
            .position(|a| a.iata == code)
            .ok_or(AirportError::NotFound(code))?;
        Ok(airports.remove(idx))
    }
}

/// One CSV row, aligned by position: name, latitude, longitude, iata.
#[derive(Debug, Deserialize)]
struct AirportRow(String, f64, f64, String);

/// Load airports from a CSV file on disk.
pub fn load_airports_from_csv(path: &Path) -> Result<Vec<Airport>, AirportLoadError> {
    let content = std::fs::read_to_string(path)?;
    parse_airports_csv(&content)
}

/// Parse airport CSV content. The header row is skipped, not interpreted:
/// columns are taken by position.
pub fn parse_airports_csv(content: &str) -> Result<Vec<Airport>, AirportLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut airports = Vec::new();
    for record in reader.records() {
        let record = record?;
        // `None` headers: deserialize by column position.
        let AirportRow(name, latitude, longitude, iata) = record.deserialize(None)?;
        airports.push(Airport {
            name,
            latitude,
            longitude,
            iata: normalize_code(&iata),
        });
    }
    Ok(airports)
}
