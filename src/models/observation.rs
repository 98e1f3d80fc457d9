//! Canonical feature snapshot for one location

use std::collections::BTreeMap;

/// Named numeric features built from a single provider reading.
///
/// Built once per prediction and never mutated afterwards; every model reads
/// its inputs out of the same snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observation {
    features: BTreeMap<String, f64>,
}

impl Observation {
    /// Build an observation from `(name, value)` pairs. Later duplicates win.
    pub fn new<I, K>(features: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            features: features
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Value of a feature, `None` if the observation does not carry it
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for Observation {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self::new(iter)
    }
}
