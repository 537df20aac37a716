//! Pre-trained model artifacts: linear models and decision-tree ensembles
//! exported to JSON.
//!
//! An artifact is loaded and validated once at startup. Inference checks the
//! feature width on every call and rejects non-finite output.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error reading model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid model artifact JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid model artifact: {0}")]
    Invalid(String),
    #[error("Model expects {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },
    #[error("Model produced a non-finite score")]
    NonFinite,
}

/// Output transform applied to the raw estimator score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Link {
    #[default]
    Identity,
    Logistic,
}

/// How per-tree outputs are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Gradient boosting: trees are additive.
    #[default]
    Sum,
    /// Random forest: trees vote by averaging.
    Mean,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Walk from the root; `x <= threshold` goes left. Validation guarantees
    /// children point forward, so the walk terminates.
    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} of {}",
                        i, feature, n_features
                    ));
                }
                for child in [*left, *right] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(format!("node {} has invalid child {}", i, child));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    TreeEnsemble {
        n_features: usize,
        #[serde(default)]
        base_score: f64,
        #[serde(default)]
        aggregation: Aggregation,
        trees: Vec<Tree>,
    },
}

impl Estimator {
    fn n_features(&self) -> usize {
        match self {
            Estimator::Linear { coefficients, .. } => coefficients.len(),
            Estimator::TreeEnsemble { n_features, .. } => *n_features,
        }
    }

    fn raw_score(&self, features: &[f64]) -> f64 {
        match self {
            Estimator::Linear {
                coefficients,
                intercept,
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(features)
                        .map(|(w, x)| w * x)
                        .sum::<f64>()
            }
            Estimator::TreeEnsemble {
                base_score,
                aggregation,
                trees,
                ..
            } => {
                let total: f64 = trees.iter().map(|t| t.evaluate(features)).sum();
                let combined = match aggregation {
                    Aggregation::Sum => total,
                    Aggregation::Mean => total / trees.len() as f64,
                };
                base_score + combined
            }
        }
    }
}

fn default_threshold() -> f64 {
    0.5
}

/// A loaded model artifact.
#[derive(Debug, Clone, Deserialize)]
pub struct Model {
    #[serde(default)]
    pub link: Link,
    /// Class-1 cut-off on the linked score.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    pub estimator: Estimator,
}

impl Model {
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let model: Model = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<(), ModelError> {
        match &self.estimator {
            Estimator::Linear { coefficients, .. } if coefficients.is_empty() => {
                Err(ModelError::Invalid("linear model has no coefficients".into()))
            }
            Estimator::Linear { .. } => Ok(()),
            Estimator::TreeEnsemble {
                n_features, trees, ..
            } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid("ensemble has no trees".into()));
                }
                for (t, tree) in trees.iter().enumerate() {
                    tree.validate(*n_features)
                        .map_err(|e| ModelError::Invalid(format!("tree {}: {}", t, e)))?;
                }
                Ok(())
            }
        }
    }

    /// Number of input features the model was trained on.
    pub fn n_features(&self) -> usize {
        self.estimator.n_features()
    }

    /// Score one feature vector, applying the link function.
    pub fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(ModelError::FeatureCount {
                expected,
                actual: features.len(),
            });
        }

        let raw = self.estimator.raw_score(features);
        let score = match self.link {
            Link::Identity => raw,
            Link::Logistic => 1.0 / (1.0 + (-raw).exp()),
        };
        if !score.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(score)
    }

    /// Class label: 1 when the score reaches the threshold, else 0.
    pub fn predict_class(&self, features: &[f64]) -> Result<u8, ModelError> {
        let score = self.predict(features)?;
        Ok(if score >= self.threshold { 1 } else { 0 })
    }
}
