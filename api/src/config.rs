/// Paths to a model artifact and the preprocessor bundle it was trained with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: String,
    pub preprocessor: String,
}

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// CSV file with the airport reference data.
    pub airports_csv: String,
    /// Delay regressor. Enables `/delay/predict/` and `/delay/predictions/`.
    pub delay: Option<ArtifactPaths>,
    /// Delay classifier. Only used together with `delay`.
    pub delay_classifier: Option<ArtifactPaths>,
    /// Fare regressor. Enables `/predict/`.
    pub fare: Option<ArtifactPaths>,
    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            airports_csv: std::env::var("AIRPORTS_CSV")
                .unwrap_or_else(|_| "./data/airports.csv".to_string()),
            delay: artifact_paths_from_env("DELAY_MODEL_PATH", "DELAY_PREPROCESSOR_PATH"),
            delay_classifier: artifact_paths_from_env(
                "DELAY_CLASSIFIER_PATH",
                "DELAY_CLASSIFIER_PREPROCESSOR_PATH",
            ),
            fare: artifact_paths_from_env("FARE_MODEL_PATH", "FARE_PREPROCESSOR_PATH"),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }
}

/// Read a model/preprocessor pair. Both variables unset disables the
/// pipeline; setting only one of them is a configuration error.
fn artifact_paths_from_env(model_var: &str, preprocessor_var: &str) -> Option<ArtifactPaths> {
    let model = std::env::var(model_var).ok().filter(|v| !v.is_empty());
    let preprocessor = std::env::var(preprocessor_var)
        .ok()
        .filter(|v| !v.is_empty());

    match (model, preprocessor) {
        (Some(model), Some(preprocessor)) => Some(ArtifactPaths {
            model,
            preprocessor,
        }),
        (None, None) => None,
        _ => panic!("{} and {} must be set together", model_var, preprocessor_var),
    }
}
