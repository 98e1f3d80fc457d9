//! Integration tests for the prediction pipeline and route evaluation

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Month;
use serde_json::{Value, json};
use vizcast::model::LinearModel;
use vizcast::schema::ReconciledVector;
use vizcast::{
    EnsemblePredictor, LoadedModel, ModelRegistry, ModelSchema, ObservationDocument, RiskTier,
    Scorer, SegmentOutcome, VizcastError, Waypoint, WeatherProvider, evaluate_route,
};

/// In-memory provider: fixed record for every location, except the ones told to fail
struct FakeProvider {
    record: Value,
    failing: HashSet<String>,
    requested: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn new(record: Value) -> Self {
        Self {
            record,
            failing: HashSet::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    fn failing_at(mut self, location: &str) -> Self {
        self.failing.insert(location.to_string());
        self
    }
}

impl WeatherProvider for FakeProvider {
    fn fetch(&self, location: &str) -> vizcast::Result<ObservationDocument> {
        self.requested.lock().unwrap().push(location.to_string());
        if self.failing.contains(location) {
            return Err(VizcastError::weather_fetch(format!("no station near {location}")));
        }
        Ok(ObservationDocument::new(json!({ "liveweer": [self.record.clone()] })))
    }
}

/// Scorer that remembers every vector it saw
struct Probe {
    seen: Arc<Mutex<Vec<Vec<f64>>>>,
    output: f64,
}

impl Scorer for Probe {
    fn score(&self, input: &ReconciledVector) -> vizcast::Result<f64> {
        self.seen.lock().unwrap().push(input.values().to_vec());
        Ok(self.output)
    }
}

fn full_record() -> Value {
    json!({
        "plaats": "Lochem",
        "neerslag": "0.2",
        "luchtd": "1016.4",
        "windsnelheid": "4",
        "windstoten": "7.5",
        "windrgr": "250",
        "zon": "35",
        "lv": "81",
        "temp": "7.9",
        "temp24": "6.4",
        "dauwp": "4.9"
    })
}

fn linear(name: &str, features: &[&str], intercept: f64) -> LoadedModel {
    LoadedModel::new(
        name,
        ModelSchema::new(features.iter().copied()),
        Box::new(LinearModel::new(intercept, vec![0.0; features.len()])),
    )
}

/// Registry whose cloud-base model always predicts `cloud_base` hectometres
fn constant_registry(cloud_base: f64) -> ModelRegistry {
    ModelRegistry::new(
        linear("vvn", &["TN", "UX"], 30.0),
        linear("vvx", &["FHN"], 75.0),
        linear("cloud_base", &["PG"], cloud_base),
    )
}

fn route_of(len: usize) -> Vec<Waypoint> {
    (0..len)
        .map(|i| Waypoint::new(format!("WP{i}"), 51.0 + i as f64 * 0.1, 4.0))
        .collect()
}

#[test]
fn test_january_observation_reaches_each_model_in_its_own_order() {
    let vvn_seen = Arc::new(Mutex::new(Vec::new()));
    let vvx_seen = Arc::new(Mutex::new(Vec::new()));
    let cb_seen = Arc::new(Mutex::new(Vec::new()));

    let vvn_schema = ["UX", "TN", "season_spring", "season_summer", "season_autumn"];
    let vvx_schema = ["temperature_2m", "month", "dew_point", "FXX", "turbulence", "PG", "Q"];
    let cb_schema = ["relative_humidity_2m", "wind_direction_10m", "humidity_diff"];

    let registry = ModelRegistry::new(
        LoadedModel::new(
            "vvn",
            ModelSchema::new(vvn_schema),
            Box::new(Probe {
                seen: vvn_seen.clone(),
                output: 12.0,
            }),
        ),
        LoadedModel::new(
            "vvx",
            ModelSchema::new(vvx_schema),
            Box::new(Probe {
                seen: vvx_seen.clone(),
                output: 48.0,
            }),
        ),
        LoadedModel::new(
            "cloud_base",
            ModelSchema::new(cb_schema),
            Box::new(Probe {
                seen: cb_seen.clone(),
                output: 7.0,
            }),
        ),
    );
    let provider = FakeProvider::new(full_record());
    let predictor = EnsemblePredictor::new(&registry, &provider);

    let prediction = predictor.predict_for_month("Lochem", Month::January).unwrap();
    assert_eq!(prediction.min_visibility, 12.0);
    assert_eq!(prediction.max_visibility, 48.0);
    assert_eq!(prediction.cloud_base_height, 7.0);

    // one fetch shared by all three models
    assert_eq!(provider.requested.lock().unwrap().len(), 1);

    let vvn = vvn_seen.lock().unwrap();
    assert_eq!(vvn.len(), 1);
    assert_eq!(vvn[0], vec![81.0, 7.9, 0.0, 0.0, 0.0]);

    let vvx = vvx_seen.lock().unwrap();
    assert_eq!(vvx[0].len(), vvx_schema.len());
    assert_eq!(vvx[0], vec![7.9, 1.0, 4.9, 7.5, 0.0, 1016.4, 35.0]);

    let cb = cb_seen.lock().unwrap();
    assert_eq!(cb[0], vec![81.0, 250.0, 0.0]);
}

#[test]
fn test_route_produces_adjacent_segments_in_order() {
    let registry = constant_registry(8.0);
    let provider = FakeProvider::new(full_record());
    let predictor = EnsemblePredictor::new(&registry, &provider);
    let waypoints = route_of(6);

    let segments = evaluate_route(&predictor, &waypoints);
    assert_eq!(segments.len(), 5);
    for (i, segment) in segments.iter().enumerate() {
        assert_eq!(segment.start, waypoints[i]);
        assert_eq!(segment.end, waypoints[i + 1]);
        assert_eq!(segment.risk(), Some(RiskTier::Low));
        assert!(segment.distance_km > 0.0);
    }

    // predictions are made at each segment's start point only
    let requested = provider.requested.lock().unwrap();
    let expected: Vec<String> = waypoints[..5].iter().map(|w| w.query().to_string()).collect();
    assert_eq!(*requested, expected);
}

#[test]
fn test_short_routes_have_no_segments() {
    let registry = constant_registry(8.0);
    let provider = FakeProvider::new(full_record());
    let predictor = EnsemblePredictor::new(&registry, &provider);

    assert!(evaluate_route(&predictor, &[]).is_empty());
    assert!(evaluate_route(&predictor, &route_of(1)).is_empty());
    assert_eq!(evaluate_route(&predictor, &route_of(2)).len(), 1);
    assert!(provider.requested.lock().unwrap().len() == 1);
}

#[test]
fn test_one_failing_waypoint_only_marks_its_segment() {
    let waypoints = route_of(6);
    let registry = constant_registry(4.0);
    let provider = FakeProvider::new(full_record()).failing_at(waypoints[2].query());
    let predictor = EnsemblePredictor::new(&registry, &provider);

    let segments = evaluate_route(&predictor, &waypoints);
    assert_eq!(segments.len(), 5);

    for (i, segment) in segments.iter().enumerate() {
        if i == 2 {
            match &segment.outcome {
                SegmentOutcome::Failed { error } => assert!(error.contains("no station near")),
                other => panic!("segment 2 should have failed, got {other:?}"),
            }
            assert_eq!(segment.risk(), None);
        } else {
            match &segment.outcome {
                SegmentOutcome::Assessed {
                    prediction,
                    cloud_base_m,
                    risk,
                } => {
                    assert_eq!(prediction.min_visibility, 30.0);
                    assert_eq!(prediction.max_visibility, 75.0);
                    assert_eq!(*cloud_base_m, 400.0);
                    assert_eq!(*risk, RiskTier::Moderate);
                }
                SegmentOutcome::Failed { error } => panic!("segment {i} failed: {error}"),
            }
        }
    }
}

#[test]
fn test_model_failure_is_isolated_per_segment_too() {
    let registry = ModelRegistry::new(
        linear("vvn", &["TN"], 30.0),
        linear("vvx", &[], 75.0),
        linear("cloud_base", &["PG"], 2.0),
    );
    let provider = FakeProvider::new(full_record());
    let predictor = EnsemblePredictor::new(&registry, &provider);

    let segments = evaluate_route(&predictor, &route_of(4));
    assert_eq!(segments.len(), 3);
    assert!(segments.iter().all(|s| s.is_failed()));
    assert!(matches!(
        predictor.predict_for_month("x", Month::June),
        Err(VizcastError::PredictionFailed { .. })
    ));
}

#[test]
fn test_missing_record_fields_still_predict() {
    let registry = ModelRegistry::new(
        LoadedModel::new(
            "vvn",
            ModelSchema::new(["TN", "not_provided"]),
            Box::new(LinearModel::new(1.0, vec![1.0, 1.0])),
        ),
        linear("vvx", &["UX"], 5.0),
        linear("cloud_base", &["PG"], 3.0),
    );
    let provider = FakeProvider::new(json!({ "temp": "2.5" }));
    let predictor = EnsemblePredictor::new(&registry, &provider);

    let prediction = predictor.predict_for_month("x", Month::April).unwrap();
    assert_eq!(prediction.min_visibility, 3.5);
    assert_eq!(prediction.max_visibility, 5.0);
    assert_eq!(prediction.cloud_base_height, 3.0);
}
