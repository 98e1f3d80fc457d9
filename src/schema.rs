//! Aligning observations to a model's declared inputs
//!
//! Models are positional: the i-th input must be the i-th schema name.
//! Reconciliation reads every schema name out of the observation in schema
//! order and fills absent names with [`DEFAULT_FEATURE_VALUE`].

use crate::models::Observation;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Value used for schema names the observation does not carry.
///
/// Preserved from the trained pipeline. A zero can hide a missing sensor
/// reading, so every defaulted name is reported in [`ReconciledVector::defaulted`].
pub const DEFAULT_FEATURE_VALUE: f64 = 0.0;

/// Ordered feature names a model requires, fixed at load time
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelSchema {
    names: Vec<String>,
}

impl ModelSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Build the input vector for this schema. Never fails.
    #[must_use]
    pub fn reconcile(&self, observation: &Observation) -> ReconciledVector {
        let mut values = Vec::with_capacity(self.names.len());
        let mut defaulted = Vec::new();

        for (position, name) in self.names.iter().enumerate() {
            match observation.get(name) {
                Some(value) => values.push(value),
                None => {
                    debug!(feature = %name, position, "feature absent, using default");
                    values.push(DEFAULT_FEATURE_VALUE);
                    defaulted.push(name.clone());
                }
            }
        }

        ReconciledVector { values, defaulted }
    }
}

/// Model input aligned position-by-position with a [`ModelSchema`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledVector {
    values: Vec<f64>,
    defaulted: Vec<String>,
}

impl ReconciledVector {
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Schema names that were absent from the observation, in schema order
    #[must_use]
    pub fn defaulted(&self) -> &[String] {
        &self.defaulted
    }
}
