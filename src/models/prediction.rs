//! Prediction triple produced by the model ensemble

use serde::{Deserialize, Serialize};

/// Output of the three models for one location, all scored from the same observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Minimum horizontal visibility (VVN), model native units
    #[serde(rename = "VVN")]
    pub min_visibility: f64,
    /// Maximum horizontal visibility (VVX), model native units
    #[serde(rename = "VVX")]
    pub max_visibility: f64,
    /// Cloud-base height in hectometres as predicted by the model
    #[serde(rename = "cloud_base")]
    pub cloud_base_height: f64,
}
