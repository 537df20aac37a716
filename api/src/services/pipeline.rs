//! Feature-transform-and-predict pipeline: a preprocessor bundle paired with
//! the model trained on its output. Delay regression, delay classification
//! and fare regression are all instances of this one type, selected by
//! configuration.

use std::path::Path;
use thiserror::Error;

use super::model::{Model, ModelError};
use super::preprocess::{FeatureRow, PreprocessError, Preprocessor};
use crate::config::ArtifactPaths;
use crate::helpers::round_2dp;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{pipeline}: feature transform failed: {source}")]
    Transform {
        pipeline: &'static str,
        #[source]
        source: PreprocessError,
    },
    #[error("{pipeline}: inference failed: {source}")]
    Inference {
        pipeline: &'static str,
        #[source]
        source: ModelError,
    },
    #[error("{pipeline}: failed to load preprocessor bundle {path}: {source}")]
    LoadPreprocessor {
        pipeline: &'static str,
        path: String,
        #[source]
        source: PreprocessError,
    },
    #[error("{pipeline}: failed to load model {path}: {source}")]
    LoadModel {
        pipeline: &'static str,
        path: String,
        #[source]
        source: ModelError,
    },
    #[error("{pipeline}: preprocessor produces {columns} columns but model expects {features}")]
    WidthMismatch {
        pipeline: &'static str,
        columns: usize,
        features: usize,
    },
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    name: &'static str,
    preprocessor: Preprocessor,
    model: Model,
}

impl Pipeline {
    /// Pair a bundle with its model, checking that their widths agree.
    pub fn new(
        name: &'static str,
        preprocessor: Preprocessor,
        model: Model,
    ) -> Result<Self, PipelineError> {
        if preprocessor.width() != model.n_features() {
            return Err(PipelineError::WidthMismatch {
                pipeline: name,
                columns: preprocessor.width(),
                features: model.n_features(),
            });
        }
        Ok(Self {
            name,
            preprocessor,
            model,
        })
    }

    /// Load both artifacts from disk. Any failure here is a startup failure.
    pub fn load(name: &'static str, paths: &ArtifactPaths) -> Result<Self, PipelineError> {
        let preprocessor = Preprocessor::from_file(Path::new(&paths.preprocessor)).map_err(
            |source| PipelineError::LoadPreprocessor {
                pipeline: name,
                path: paths.preprocessor.clone(),
                source,
            },
        )?;
        let model =
            Model::from_file(Path::new(&paths.model)).map_err(|source| PipelineError::LoadModel {
                pipeline: name,
                path: paths.model.clone(),
                source,
            })?;
        Self::new(name, preprocessor, model)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn features(&self, row: &FeatureRow) -> Result<Vec<f64>, PipelineError> {
        self.preprocessor
            .transform(row)
            .map_err(|source| PipelineError::Transform {
                pipeline: self.name,
                source,
            })
    }

    /// Regression output rounded to 2 decimal places.
    pub fn predict(&self, row: &FeatureRow) -> Result<f64, PipelineError> {
        let features = self.features(row)?;
        let score = self
            .model
            .predict(&features)
            .map_err(|source| self.inference_error(source))?;
        Ok(round_2dp(score))
    }

    /// Class label (0 or 1) for the row.
    pub fn classify(&self, row: &FeatureRow) -> Result<u8, PipelineError> {
        let features = self.features(row)?;
        self.model
            .predict_class(&features)
            .map_err(|source| self.inference_error(source))
    }

    fn inference_error(&self, source: ModelError) -> PipelineError {
        PipelineError::Inference {
            pipeline: self.name,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::preprocess::FeatureValue;

    fn pipeline() -> Pipeline {
        let pre = Preprocessor::from_json(
            r#"{ "columns": ["CITY", "HOURS"], "label_encoders": { "CITY": ["Delhi", "Mumbai"] } }"#,
        )
        .unwrap();
        let model = Model::from_json(
            r#"{ "estimator": { "kind": "linear", "coefficients": [100.0, 33.333], "intercept": 1000.0 } }"#,
        )
        .unwrap();
        Pipeline::new("test", pre, model).unwrap()
    }

    fn row(city: &str, hours: f64) -> FeatureRow {
        FeatureRow::new()
            .with("CITY", FeatureValue::Text(city.to_string()))
            .with("HOURS", FeatureValue::Float(hours))
    }

    #[test]
    fn test_predict_rounds_to_2dp() {
        // 1000 + 100*1 + 33.333*2.5 = 1183.3325
        assert_eq!(pipeline().predict(&row("Mumbai", 2.5)).unwrap(), 1183.33);
    }

    #[test]
    fn test_predict_deterministic() {
        let p = pipeline();
        assert_eq!(
            p.predict(&row("Delhi", 4.0)).unwrap(),
            p.predict(&row("Delhi", 4.0)).unwrap()
        );
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let pre = Preprocessor::from_json(r#"{ "columns": ["A"] }"#).unwrap();
        let model = Model::from_json(
            r#"{ "estimator": { "kind": "linear", "coefficients": [1.0, 2.0], "intercept": 0.0 } }"#,
        )
        .unwrap();
        assert!(matches!(
            Pipeline::new("test", pre, model),
            Err(PipelineError::WidthMismatch {
                columns: 1,
                features: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_transform_failure_is_reported() {
        let partial = FeatureRow::new().with("CITY", FeatureValue::Text("Delhi".into()));
        assert!(matches!(
            pipeline().predict(&partial),
            Err(PipelineError::Transform { .. })
        ));
    }

    #[test]
    fn test_demo_artifacts_load() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/artifacts/demo");
        for (name, model, preprocessor) in [
            ("delay", "delay_regressor", "delay_preprocessor"),
            ("delay-classifier", "delay_classifier", "delay_classifier_preprocessor"),
            ("fare", "fare_regressor", "fare_preprocessor"),
        ] {
            let paths = ArtifactPaths {
                model: format!("{}/{}.json", dir, model),
                preprocessor: format!("{}/{}.json", dir, preprocessor),
            };
            let pipeline = Pipeline::load(name, &paths).unwrap();
            assert_eq!(pipeline.name(), name);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let paths = ArtifactPaths {
            model: "/nonexistent/model.json".to_string(),
            preprocessor: "/nonexistent/pre.json".to_string(),
        };
        let err = Pipeline::load("fare", &paths).unwrap_err();
        assert!(matches!(
            &err,
            PipelineError::LoadPreprocessor {
                pipeline: "fare",
                path,
                source: PreprocessError::Io(_),
            } if path == "/nonexistent/pre.json"
        ));
        assert!(err.to_string().contains("/nonexistent/pre.json"));
    }

    #[test]
    fn test_load_bad_model_file() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/artifacts/demo");
        let paths = ArtifactPaths {
            // A preprocessor bundle is not a model artifact.
            model: format!("{}/fare_preprocessor.json", dir),
            preprocessor: format!("{}/fare_preprocessor.json", dir),
        };
        assert!(matches!(
            Pipeline::load("fare", &paths),
            Err(PipelineError::LoadModel { pipeline: "fare", .. })
        ));
    }
}
