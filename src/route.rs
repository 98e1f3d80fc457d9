//! Route risk evaluation
//!
//! Walks consecutive waypoint pairs, predicts at each segment's start point
//! and classifies the segment by cloud-base height. A failed prediction only
//! marks its own segment; the rest of the route is still evaluated.

use crate::models::{PredictionResult, Waypoint};
use crate::predictor::EnsemblePredictor;
use crate::{Result, VizcastError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Model cloud base is in hectometres; tiers are in metres
pub const CLOUD_BASE_SCALE: f64 = 100.0;

/// Lowest cloud base (m) of the moderate tier
pub const MODERATE_THRESHOLD_M: f64 = 300.0;

/// Lowest cloud base (m) of the low tier
pub const LOW_THRESHOLD_M: f64 = 600.0;

/// Risk classification of a route segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    /// Cloud base at or above 600 m
    Low,
    /// Cloud base from 300 m up to 600 m
    Moderate,
    /// Cloud base below 300 m
    High,
}

impl RiskTier {
    /// Classify a cloud-base height in metres. Each band includes its lower bound.
    #[must_use]
    pub fn classify(cloud_base_m: f64) -> Self {
        if cloud_base_m >= LOW_THRESHOLD_M {
            RiskTier::Low
        } else if cloud_base_m >= MODERATE_THRESHOLD_M {
            RiskTier::Moderate
        } else {
            RiskTier::High
        }
    }

    /// Map colour used by the front-end
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            RiskTier::Low => "green",
            RiskTier::Moderate => "orange",
            RiskTier::High => "red",
        }
    }
}

/// Result of evaluating one segment
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentOutcome {
    Assessed {
        prediction: PredictionResult,
        /// Cloud base scaled to metres
        cloud_base_m: f64,
        risk: RiskTier,
    },
    Failed {
        error: String,
    },
}

/// Two adjacent waypoints and the outcome predicted at the start point
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSegment {
    pub start: Waypoint,
    pub end: Waypoint,
    pub distance_km: f64,
    pub outcome: SegmentOutcome,
}

impl RouteSegment {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, SegmentOutcome::Failed { .. })
    }

    #[must_use]
    pub fn risk(&self) -> Option<RiskTier> {
        match self.outcome {
            SegmentOutcome::Assessed { risk, .. } => Some(risk),
            SegmentOutcome::Failed { .. } => None,
        }
    }
}

/// Build the assessed outcome for a prediction
#[must_use]
pub fn assess(prediction: PredictionResult) -> SegmentOutcome {
    let cloud_base_m = prediction.cloud_base_height * CLOUD_BASE_SCALE;
    SegmentOutcome::Assessed {
        prediction,
        cloud_base_m,
        risk: RiskTier::classify(cloud_base_m),
    }
}

/// Evaluate every adjacent pair of `waypoints`.
///
/// Returns `waypoints.len() - 1` segments in route order, or none for fewer
/// than two waypoints. Never fails as a whole.
#[instrument(skip_all, fields(waypoints = waypoints.len()))]
pub fn evaluate_route(
    predictor: &EnsemblePredictor<'_>,
    waypoints: &[Waypoint],
) -> Vec<RouteSegment> {
    let segments: Vec<RouteSegment> = waypoints
        .windows(2)
        .map(|pair| {
            let (start, end) = (&pair[0], &pair[1]);
            let outcome = match predictor.predict(start.query()) {
                Ok(prediction) => assess(prediction),
                Err(e) => {
                    warn!(
                        "Segment {} -> {} failed ({}): {}",
                        start.name,
                        end.name,
                        e.kind(),
                        e
                    );
                    SegmentOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            RouteSegment {
                start: start.clone(),
                end: end.clone(),
                distance_km: start.distance_km(end),
                outcome,
            }
        })
        .collect();

    let failed = segments.iter().filter(|s| s.is_failed()).count();
    info!(
        "Evaluated {} segments ({} failed)",
        segments.len(),
        failed
    );
    segments
}

/// Load a route from a JSON list of `{ "name", "location": "lat,lon" }`
pub fn load_waypoints(path: &Path) -> Result<Vec<Waypoint>> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| {
        VizcastError::config(format!("Invalid waypoint file {}: {e}", path.display()))
    })
}

/// Nordhorn to Duxford, the route the map front-end draws by default
#[must_use]
pub fn reference_route() -> Vec<Waypoint> {
    [
        ("Nordhorn", 52.4300, 7.0700),
        ("Oldenzaal", 52.3000, 6.9300),
        ("Knooppunt Azelo", 52.2700, 6.6300),
        ("Lochem", 52.1600, 6.4200),
        ("Valeplas", 51.9000, 5.9000),
        ("Waalbrug A50 bij Ewijk", 51.8600, 5.7500),
        ("Knooppunt Paalgraven A50 - A59", 51.7400, 5.6000),
        ("Den Bosch", 51.6900, 5.3100),
        ("Efteling", 51.6550, 5.0460),
        ("Keizersveerbrug A27", 51.7360, 4.9010),
        ("Moerdijkbrug A16", 51.7010, 4.6320),
        ("Haringvlietbrug A29", 51.7330, 4.4160),
        ("Grevelingen Dam", 51.7510, 3.8840),
        ("Zeeland Brug", 51.6620, 3.8530),
        ("Neeltje Jans", 51.6260, 3.7000),
        ("Oostkapelle", 51.5600, 3.5500),
        ("Oostkapelle-1", 51.4450, 3.5125),
        ("Oostkapelle-2", 51.3300, 3.4750),
        ("Oostkapelle-3", 51.2150, 3.4375),
        ("GILTI", 51.0900, 1.4000),
        ("Canterbury", 51.2800, 1.0800),
        ("Southend-on-Sea", 51.5370, 0.7130),
        ("Witham", 51.7980, 0.6390),
        ("Braintree", 51.8790, 0.5510),
        ("Duxford", 52.0900, 0.1300),
    ]
    .into_iter()
    .map(|(name, lat, lon)| Waypoint::new(name, lat, lon))
    .collect()
}
