//! Compatibility Classifier Adapter
//!
//! The engine only needs `predict_probability(vector) -> [0, 1]`. The trait
//! keeps the trained model behind that seam; `LogisticModel` is the model
//! shipped in the JSON artifact loaded at startup.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::features::{FeatureValue, FeatureVector};

/// Probability that a pair is compatible
///
/// Implementations are called concurrently and must be `Send + Sync`.
pub trait CompatibilityClassifier: Send + Sync {
    fn predict_probability(&self, vector: &FeatureVector) -> Result<f64, ClassifierError>;
}

/// Logistic regression over the named features
///
/// Numeric features contribute `coefficient × value`; categorical features
/// contribute the weight of their category (unseen categories and features
/// without a coefficient contribute nothing).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LogisticModel {
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: BTreeMap<String, f64>,
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LogisticModel {
    fn logit(&self, vector: &FeatureVector) -> Result<f64, ClassifierError> {
        let mut z = self.intercept;

        for (name, value) in vector.iter() {
            match value {
                FeatureValue::Numeric(v) => {
                    if self.categorical.contains_key(name) {
                        return Err(ClassifierError::UnexpectedNumeric(name.to_string()));
                    }
                    if let Some(coef) = self.coefficients.get(name) {
                        z += coef * v;
                    }
                }
                FeatureValue::Categorical(category) => {
                    let Some(weights) = self.categorical.get(name) else {
                        return Err(ClassifierError::UnexpectedCategorical(name.to_string()));
                    };
                    z += weights.get(category).copied().unwrap_or(0.0);
                }
            }
        }

        Ok(z)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Trained model package: classifier, decision threshold, feature order
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelArtifact {
    pub threshold: f64,
    pub feature_names: Vec<String>,
    pub model: LogisticModel,
}

impl ModelArtifact {
    /// Load from JSON; absence or a malformed package is a startup failure
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Model artifact not found: {:?}", path))?;

        let artifact: ModelArtifact = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse model artifact {:?}", path))?;

        artifact.validate()?;

        tracing::info!(
            "Loaded model artifact {:?} ({} features, threshold {:.3})",
            path,
            artifact.feature_names.len(),
            artifact.threshold
        );

        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            anyhow::bail!("Decision threshold {} outside [0, 1]", self.threshold);
        }
        if self.feature_names.is_empty() {
            anyhow::bail!("Model artifact declares no features");
        }

        let mut seen = HashSet::new();
        for name in &self.feature_names {
            if !seen.insert(name.as_str()) {
                anyhow::bail!("Duplicate feature name '{}' in model artifact", name);
            }
        }

        Ok(())
    }

    /// Split into the adapter plus the threshold and schema the engine needs
    pub fn into_parts(self) -> (SchemaCheckedClassifier<LogisticModel>, f64, Vec<String>) {
        let classifier = SchemaCheckedClassifier::new(self.model, self.feature_names.clone());
        (classifier, self.threshold, self.feature_names)
    }
}

impl CompatibilityClassifier for LogisticModel {
    fn predict_probability(&self, vector: &FeatureVector) -> Result<f64, ClassifierError> {
        let p = sigmoid(self.logit(vector)?);
        if !p.is_finite() {
            return Err(ClassifierError::NonFinite(p));
        }
        Ok(p)
    }
}

/// Rejects vectors that do not match the declared feature order
pub struct SchemaCheckedClassifier<C> {
    inner: C,
    feature_names: Vec<String>,
}

impl<C: CompatibilityClassifier> SchemaCheckedClassifier<C> {
    pub fn new(inner: C, feature_names: Vec<String>) -> Self {
        Self { inner, feature_names }
    }
}

impl<C: CompatibilityClassifier> CompatibilityClassifier for SchemaCheckedClassifier<C> {
    fn predict_probability(&self, vector: &FeatureVector) -> Result<f64, ClassifierError> {
        if vector.len() != self.feature_names.len() {
            return Err(ClassifierError::LengthMismatch {
                expected: self.feature_names.len(),
                found: vector.len(),
            });
        }

        for (position, (found, expected)) in vector.names().zip(&self.feature_names).enumerate() {
            if found != expected.as_str() {
                return Err(ClassifierError::SchemaMismatch {
                    position,
                    expected: expected.clone(),
                    found: found.to_string(),
                });
            }
        }

        self.inner.predict_probability(vector)
    }
}
