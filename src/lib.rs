//! `vizcast` - visibility and cloud-base prediction for VFR route planning
//!
//! This library turns live weather observations into minimum/maximum
//! visibility and cloud-base predictions from three trained models, and
//! classifies each leg of a route by cloud-base risk.

pub mod api;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod model;
pub mod models;
pub mod predictor;
pub mod route;
pub mod schema;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::VizcastConfig;
pub use error::VizcastError;
pub use model::{LoadedModel, ModelRegistry, Scorer};
pub use models::{Observation, PredictionResult, Season, Waypoint};
pub use predictor::EnsemblePredictor;
pub use route::{RiskTier, RouteSegment, SegmentOutcome, evaluate_route};
pub use schema::{ModelSchema, ReconciledVector};
pub use weather::{ObservationDocument, WeatherProvider, WeerliveClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, VizcastError>;
