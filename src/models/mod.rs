//! Data models for the vizcast pipeline
//!
//! This module contains the core domain models organized by concern:
//! - Observation: canonical feature snapshot for one location
//! - Season: calendar season and its positional indicator encoding
//! - Prediction: the VVN / VVX / cloud-base triple
//! - Waypoint: named points making up a route

pub mod observation;
pub mod prediction;
pub mod season;
pub mod waypoint;

// Re-export all public types for convenient access
pub use observation::Observation;
pub use prediction::PredictionResult;
pub use season::{SEASON_INDICATORS, Season};
pub use waypoint::Waypoint;
