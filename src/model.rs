//! Trained model artifacts and the process-wide registry
//!
//! Each model is stored as a JSON artifact holding its input schema and a
//! linear scoring function. The three models are loaded once at startup into
//! an immutable [`ModelRegistry`]; a missing or corrupt artifact is fatal.

use crate::config::ModelsConfig;
use crate::schema::{ModelSchema, ReconciledVector};
use crate::{Result, VizcastError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Scoring function of a trained model
pub trait Scorer: Send + Sync {
    /// Score one input vector aligned to the model's schema
    fn score(&self, input: &ReconciledVector) -> Result<f64>;
}

/// Persisted model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default)]
    pub name: Option<String>,
    /// Declared input schema; may be absent for models exported without names
    #[serde(default)]
    pub feature_names: ModelSchema,
    pub intercept: f64,
    #[serde(default)]
    pub coefficients: Vec<f64>,
}

/// `intercept + Σ coefficient_i * x_i`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    coefficients: Vec<f64>,
}

impl LinearModel {
    #[must_use]
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }
}

impl Scorer for LinearModel {
    fn score(&self, input: &ReconciledVector) -> Result<f64> {
        if self.coefficients.is_empty() {
            return Err(VizcastError::prediction("model declares no input features"));
        }
        if input.len() != self.coefficients.len() {
            return Err(VizcastError::prediction(format!(
                "expected {} input features, got {}",
                self.coefficients.len(),
                input.len()
            )));
        }

        Ok(self
            .coefficients
            .iter()
            .zip(input.values())
            .fold(self.intercept, |acc, (weight, value)| acc + weight * value))
    }
}

/// A model together with the schema it was trained on
pub struct LoadedModel {
    name: String,
    schema: ModelSchema,
    scorer: Box<dyn Scorer>,
}

impl LoadedModel {
    pub fn new<S: Into<String>>(name: S, schema: ModelSchema, scorer: Box<dyn Scorer>) -> Self {
        Self {
            name: name.into(),
            schema,
            scorer,
        }
    }

    /// Build a model from a parsed artifact
    pub fn from_artifact<S: Into<String>>(name: S, artifact: ModelArtifact) -> Result<Self> {
        let name = name.into();
        if artifact.coefficients.len() != artifact.feature_names.len() {
            return Err(VizcastError::model_load(
                name,
                format!(
                    "{} coefficients for {} features",
                    artifact.coefficients.len(),
                    artifact.feature_names.len()
                ),
            ));
        }

        let scorer = LinearModel::new(artifact.intercept, artifact.coefficients);
        Ok(Self::new(name, artifact.feature_names, Box::new(scorer)))
    }

    /// Load a model artifact from disk
    pub fn load<S: Into<String>>(name: S, path: &Path) -> Result<Self> {
        let name = name.into();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            VizcastError::model_load(name.clone(), format!("{}: {e}", path.display()))
        })?;
        let artifact: ModelArtifact = serde_json::from_str(&raw).map_err(|e| {
            VizcastError::model_load(name.clone(), format!("{}: {e}", path.display()))
        })?;

        let model = Self::from_artifact(name, artifact)?;
        info!(
            "Loaded model '{}' with {} features from {}",
            model.name,
            model.schema.len(),
            path.display()
        );
        Ok(model)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    /// Score an already reconciled input vector
    pub fn score(&self, input: &ReconciledVector) -> Result<f64> {
        self.scorer.score(input)
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// The three models the ensemble predicts with. Read-only after startup.
#[derive(Debug)]
pub struct ModelRegistry {
    pub vvn: LoadedModel,
    pub vvx: LoadedModel,
    pub cloud_base: LoadedModel,
}

impl ModelRegistry {
    #[must_use]
    pub fn new(vvn: LoadedModel, vvx: LoadedModel, cloud_base: LoadedModel) -> Self {
        Self {
            vvn,
            vvx,
            cloud_base,
        }
    }

    /// Load all three models from the configured directory
    pub fn load(config: &ModelsConfig) -> Result<Self> {
        let directory = Path::new(&config.directory);
        Ok(Self::new(
            LoadedModel::load("vvn", &directory.join(&config.vvn_file))?,
            LoadedModel::load("vvx", &directory.join(&config.vvx_file))?,
            LoadedModel::load("cloud_base", &directory.join(&config.cloud_base_file))?,
        ))
    }
}
