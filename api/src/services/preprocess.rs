//! Fitted feature preprocessing: label encoders, a standard scaler and the
//! training-time column order, loaded once from a JSON bundle.
//!
//! The bundle is read-only after load and never refit on request data.
//! Categorical values outside an encoder's vocabulary map to
//! [`UNSEEN_LABEL_CODE`].

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Code assigned to a categorical value the encoder never saw.
pub const UNSEEN_LABEL_CODE: f64 = 0.0;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("IO error reading preprocessor bundle: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid preprocessor bundle JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid preprocessor bundle: {0}")]
    Invalid(String),
    #[error("Feature '{0}' missing from request")]
    MissingFeature(String),
    #[error("Feature '{0}' is categorical but has no label encoder")]
    NonNumeric(String),
}

/// A raw request value before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{}", v),
            FeatureValue::Float(v) => write!(f, "{}", v),
            FeatureValue::Text(v) => f.write_str(v),
        }
    }
}

/// Named raw values for one request, in any order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    values: Vec<(String, FeatureValue)>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. A repeated name replaces the earlier value.
    pub fn with(mut self, name: &str, value: FeatureValue) -> Self {
        self.values.retain(|(n, _)| n != name);
        self.values.push((name.to_string(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Maps a categorical value to its position in the training vocabulary.
///
/// Numeric classes match by value, so a request `3` finds class `3.0`.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    text: HashMap<String, usize>,
    numeric: HashMap<u64, usize>,
}

impl LabelEncoder {
    pub fn new(classes: &[serde_json::Value]) -> Self {
        let mut text = HashMap::new();
        let mut numeric = HashMap::new();
        for (i, class) in classes.iter().enumerate() {
            match class {
                serde_json::Value::String(s) => {
                    text.entry(s.clone()).or_insert(i);
                }
                serde_json::Value::Number(n) => match n.as_f64() {
                    Some(v) => {
                        numeric.entry(numeric_key(v)).or_insert(i);
                    }
                    None => {
                        text.entry(n.to_string()).or_insert(i);
                    }
                },
                other => {
                    text.entry(other.to_string()).or_insert(i);
                }
            }
        }
        Self { text, numeric }
    }

    pub fn encode(&self, value: &FeatureValue) -> Option<usize> {
        match value {
            FeatureValue::Text(s) => self.text.get(s).copied(),
            _ => value
                .as_f64()
                .and_then(|v| self.numeric.get(&numeric_key(v)))
                .or_else(|| self.text.get(&value.to_string()))
                .copied(),
        }
    }
}

/// Bit pattern of the value with `-0.0` folded into `0.0`.
fn numeric_key(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

/// Per-column `(x - mean) / scale` with fitted statistics.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    params: HashMap<String, (f64, f64)>,
}

impl StandardScaler {
    pub fn scale(&self, column: &str, x: f64) -> f64 {
        match self.params.get(column) {
            Some((mean, scale)) => (x - mean) / scale,
            None => x,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScalerSpec {
    columns: Vec<String>,
    mean: Vec<f64>,
    scale: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct BundleSpec {
    columns: Vec<String>,
    #[serde(default)]
    label_encoders: BTreeMap<String, Vec<serde_json::Value>>,
    #[serde(default)]
    scaler: Option<ScalerSpec>,
}

/// Fitted encoders and scaler plus the column order the model expects.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    columns: Vec<String>,
    encoders: HashMap<String, LabelEncoder>,
    scaler: Option<StandardScaler>,
}

impl Preprocessor {
    pub fn from_file(path: &Path) -> Result<Self, PreprocessError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, PreprocessError> {
        let spec: BundleSpec = serde_json::from_str(json)?;
        Self::from_spec(spec)
    }

    fn from_spec(spec: BundleSpec) -> Result<Self, PreprocessError> {
        if spec.columns.is_empty() {
            return Err(PreprocessError::Invalid("no columns".into()));
        }
        let known: HashSet<&str> = spec.columns.iter().map(String::as_str).collect();
        if known.len() != spec.columns.len() {
            return Err(PreprocessError::Invalid("duplicate column names".into()));
        }

        for column in spec.label_encoders.keys() {
            if !known.contains(column.as_str()) {
                return Err(PreprocessError::Invalid(format!(
                    "label encoder for unknown column '{}'",
                    column
                )));
            }
        }
        let encoders = spec
            .label_encoders
            .iter()
            .map(|(column, classes)| (column.clone(), LabelEncoder::new(classes)))
            .collect();

        let scaler = match spec.scaler {
            Some(s) => {
                if s.columns.len() != s.mean.len() || s.columns.len() != s.scale.len() {
                    return Err(PreprocessError::Invalid(
                        "scaler columns, mean and scale differ in length".into(),
                    ));
                }
                let mut params = HashMap::new();
                for ((column, mean), scale) in s.columns.into_iter().zip(s.mean).zip(s.scale) {
                    if !known.contains(column.as_str()) {
                        return Err(PreprocessError::Invalid(format!(
                            "scaler for unknown column '{}'",
                            column
                        )));
                    }
                    // Constant training columns carry scale 0; treat as 1.
                    let scale = if scale == 0.0 { 1.0 } else { scale };
                    params.insert(column, (mean, scale));
                }
                Some(StandardScaler { params })
            }
            None => None,
        };

        Ok(Self {
            columns: spec.columns,
            encoders,
            scaler,
        })
    }

    /// Number of features produced by `transform`.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Build the feature vector in training column order.
    pub fn transform(&self, row: &FeatureRow) -> Result<Vec<f64>, PreprocessError> {
        self.columns
            .iter()
            .map(|column| -> Result<f64, PreprocessError> {
                let value = row
                    .get(column)
                    .ok_or_else(|| PreprocessError::MissingFeature(column.clone()))?;

                let x = match self.encoders.get(column) {
                    Some(encoder) => match encoder.encode(value) {
                        Some(code) => code as f64,
                        None => {
                            tracing::warn!(
                                "Unseen label '{}' for column {}, using code {}",
                                value,
                                column,
                                UNSEEN_LABEL_CODE
                            );
                            UNSEEN_LABEL_CODE
                        }
                    },
                    None => value
                        .as_f64()
                        .ok_or_else(|| PreprocessError::NonNumeric(column.clone()))?,
                };

                Ok(match &self.scaler {
                    Some(scaler) => scaler.scale(column, x),
                    None => x,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUNDLE: &str = r#"{
        "columns": ["MONTH", "ORIGIN", "DISTANCE", "AIR_TIME"],
        "label_encoders": {
            "MONTH": [1, 2, 3],
            "ORIGIN": ["ATL", "JFK", "LAX"]
        },
        "scaler": { "columns": ["DISTANCE", "AIR_TIME"], "mean": [1000.0, 100.0], "scale": [500.0, 0.0] }
    }"#;

    fn row(month: i64, origin: &str) -> FeatureRow {
        FeatureRow::new()
            .with("AIR_TIME", FeatureValue::Float(120.0))
            .with("DISTANCE", FeatureValue::Int(1500))
            .with("ORIGIN", FeatureValue::Text(origin.to_string()))
            .with("MONTH", FeatureValue::Int(month))
    }

    #[test]
    fn test_transform_column_order_encoding_and_scaling() {
        let pre = Preprocessor::from_json(BUNDLE).unwrap();
        assert_eq!(pre.width(), 4);
        let features = pre.transform(&row(2, "LAX")).unwrap();
        // MONTH 2 → code 1, LAX → code 2, (1500-1000)/500 = 1, zero scale → (120-100)/1
        assert_eq!(features, vec![1.0, 2.0, 1.0, 20.0]);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let pre = Preprocessor::from_json(BUNDLE).unwrap();
        let first = pre.transform(&row(3, "JFK")).unwrap();
        let second = pre.transform(&row(3, "JFK")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unseen_label_uses_fallback_code() {
        let pre = Preprocessor::from_json(BUNDLE).unwrap();
        let features = pre.transform(&row(12, "ORD")).unwrap();
        assert_eq!(features[0], UNSEEN_LABEL_CODE);
        assert_eq!(features[1], UNSEEN_LABEL_CODE);
    }

    #[test]
    fn test_float_classes_match_by_value() {
        let pre = Preprocessor::from_json(
            r#"{ "columns": ["MONTH", "X"], "label_encoders": {
                "MONTH": [1.0, 2.0, 3.0], "X": [0.5, 1.0] } }"#,
        )
        .unwrap();
        let r = FeatureRow::new()
            .with("MONTH", FeatureValue::Int(3))
            .with("X", FeatureValue::Float(1.0));
        assert_eq!(pre.transform(&r).unwrap(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_numeric_request_matches_string_class() {
        let encoder = LabelEncoder::new(&[serde_json::json!("1"), serde_json::json!("2")]);
        assert_eq!(encoder.encode(&FeatureValue::Int(2)), Some(1));
        assert_eq!(encoder.encode(&FeatureValue::Text("2".into())), Some(1));
        assert_eq!(encoder.encode(&FeatureValue::Text("2.0".into())), None);
    }

    #[test]
    fn test_missing_feature() {
        let pre = Preprocessor::from_json(BUNDLE).unwrap();
        let partial = FeatureRow::new().with("MONTH", FeatureValue::Int(1));
        assert!(matches!(
            pre.transform(&partial),
            Err(PreprocessError::MissingFeature(c)) if c == "ORIGIN"
        ));
    }

    #[test]
    fn test_text_without_encoder_rejected() {
        let pre = Preprocessor::from_json(BUNDLE).unwrap();
        let bad = row(1, "ATL").with("DISTANCE", FeatureValue::Text("far".into()));
        assert!(matches!(
            pre.transform(&bad),
            Err(PreprocessError::NonNumeric(c)) if c == "DISTANCE"
        ));
    }

    #[test]
    fn test_bundle_without_scaler_passes_numbers_through() {
        let pre = Preprocessor::from_json(
            r#"{ "columns": ["duration", "days_left"] }"#,
        )
        .unwrap();
        let r = FeatureRow::new()
            .with("duration", FeatureValue::Float(2.5))
            .with("days_left", FeatureValue::Int(10));
        assert_eq!(pre.transform(&r).unwrap(), vec![2.5, 10.0]);
    }

    #[test]
    fn test_invalid_bundles() {
        let unknown_encoder = r#"{ "columns": ["A"], "label_encoders": { "B": ["x"] } }"#;
        assert!(matches!(
            Preprocessor::from_json(unknown_encoder),
            Err(PreprocessError::Invalid(_))
        ));

        let ragged_scaler =
            r#"{ "columns": ["A"], "scaler": { "columns": ["A"], "mean": [], "scale": [1.0] } }"#;
        assert!(matches!(
            Preprocessor::from_json(ragged_scaler),
            Err(PreprocessError::Invalid(_))
        ));

        let duplicate = r#"{ "columns": ["A", "A"] }"#;
        assert!(matches!(
            Preprocessor::from_json(duplicate),
            Err(PreprocessError::Invalid(_))
        ));

        assert!(matches!(
            Preprocessor::from_json("not json"),
            Err(PreprocessError::Json(_))
        ));
    }

    #[test]
    fn test_row_with_replaces_value() {
        let r = FeatureRow::new()
            .with("A", FeatureValue::Int(1))
            .with("A", FeatureValue::Int(2));
        assert_eq!(r.get("A"), Some(&FeatureValue::Int(2)));
    }
}
