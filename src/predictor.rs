//! Ensemble prediction for a single location
//!
//! One provider fetch, one synthesized observation, three model scores.
//! All three models read the same snapshot.

use crate::features;
use crate::model::{LoadedModel, ModelRegistry};
use crate::models::{Observation, PredictionResult};
use crate::weather::WeatherProvider;
use crate::{Result, VizcastError};
use chrono::{Datelike, Local, Month};
use tracing::{debug, info, instrument};

/// Runs the VVN, VVX and cloud-base models against live observations
pub struct EnsemblePredictor<'a> {
    registry: &'a ModelRegistry,
    provider: &'a dyn WeatherProvider,
}

impl<'a> EnsemblePredictor<'a> {
    #[must_use]
    pub fn new(registry: &'a ModelRegistry, provider: &'a dyn WeatherProvider) -> Self {
        Self { registry, provider }
    }

    /// Predict for a location using the current local month for the season
    pub fn predict(&self, location: &str) -> Result<PredictionResult> {
        self.predict_for_month(location, current_month())
    }

    /// Predict for a location with an explicit month.
    ///
    /// Fails with `WeatherFetchFailed` when the provider fails or returns no
    /// observation record, and with `PredictionFailed` for anything that goes
    /// wrong after that, including an unusable record.
    #[instrument(skip(self, month), fields(month = month.number_from_month()))]
    pub fn predict_for_month(&self, location: &str, month: Month) -> Result<PredictionResult> {
        let document = self.provider.fetch(location).map_err(|e| match e {
            e @ VizcastError::WeatherFetchFailed { .. } => e,
            other => VizcastError::weather_fetch(other.to_string()),
        })?;

        if document.is_empty() {
            return Err(VizcastError::weather_fetch(format!(
                "No observation returned for '{location}'"
            )));
        }

        let observation = features::synthesize(&document, month)
            .map_err(|e| VizcastError::prediction(e.to_string()))?;

        let prediction = self.predict_observation(&observation)?;
        info!(
            vvn = prediction.min_visibility,
            vvx = prediction.max_visibility,
            cloud_base = prediction.cloud_base_height,
            "Prediction complete"
        );
        Ok(prediction)
    }

    /// Score all three models against one observation
    pub fn predict_observation(&self, observation: &Observation) -> Result<PredictionResult> {
        Ok(PredictionResult {
            min_visibility: score_model(&self.registry.vvn, observation)?,
            max_visibility: score_model(&self.registry.vvx, observation)?,
            cloud_base_height: score_model(&self.registry.cloud_base, observation)?,
        })
    }
}

fn score_model(model: &LoadedModel, observation: &Observation) -> Result<f64> {
    let input = model.schema().reconcile(observation);
    if !input.defaulted().is_empty() {
        debug!(
            model = model.name(),
            defaulted = input.defaulted().len(),
            of = input.len(),
            "Scoring with defaulted features"
        );
    }

    model.score(&input).map_err(|e| match e {
        VizcastError::PredictionFailed { message } => {
            VizcastError::prediction(format!("{}: {message}", model.name()))
        }
        other => VizcastError::prediction(format!("{}: {other}", model.name())),
    })
}

fn current_month() -> Month {
    // chrono months are always 1..=12
    Month::try_from(Local::now().month() as u8).unwrap_or(Month::January)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearModel;
    use crate::schema::{ModelSchema, ReconciledVector};
    use crate::weather::ObservationDocument;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    struct StaticProvider {
        body: Value,
        calls: Mutex<usize>,
    }

    impl StaticProvider {
        fn new(body: Value) -> Self {
            Self {
                body,
                calls: Mutex::new(0),
            }
        }
    }

    impl WeatherProvider for StaticProvider {
        fn fetch(&self, _location: &str) -> Result<ObservationDocument> {
            *self.calls.lock().unwrap() += 1;
            Ok(ObservationDocument::new(self.body.clone()))
        }
    }

    struct FailingProvider;

    impl WeatherProvider for FailingProvider {
        fn fetch(&self, _location: &str) -> Result<ObservationDocument> {
            Err(VizcastError::weather_fetch("Provider returned status 500"))
        }
    }

    /// Records every input vector it is asked to score and returns its length
    struct RecordingScorer {
        seen: std::sync::Arc<Mutex<Vec<Vec<f64>>>>,
    }

    impl crate::model::Scorer for RecordingScorer {
        fn score(&self, input: &ReconciledVector) -> Result<f64> {
            self.seen.lock().unwrap().push(input.values().to_vec());
            Ok(input.len() as f64)
        }
    }

    fn linear(name: &str, features: &[&str], intercept: f64) -> LoadedModel {
        LoadedModel::new(
            name,
            ModelSchema::new(features.iter().copied()),
            Box::new(LinearModel::new(intercept, vec![1.0; features.len()])),
        )
    }

    fn document() -> Value {
        json!({ "liveweer": [{ "temp": "3.0", "lv": "90", "luchtd": "1020" }] })
    }

    #[test]
    fn test_predicts_all_three() {
        let registry = ModelRegistry::new(
            linear("vvn", &["TN"], 10.0),
            linear("vvx", &["UX", "TN"], 0.0),
            linear("cloud_base", &["PG", "season_summer"], -1000.0),
        );
        let provider = StaticProvider::new(document());
        let predictor = EnsemblePredictor::new(&registry, &provider);

        let prediction = predictor.predict_for_month("Lochem", Month::July).unwrap();
        assert_eq!(prediction.min_visibility, 13.0);
        assert_eq!(prediction.max_visibility, 93.0);
        assert_eq!(prediction.cloud_base_height, 21.0);
        assert_eq!(*provider.calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_each_model_gets_its_own_schema() {
        let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
        let recording = |name: &str, features: &[&str]| {
            LoadedModel::new(
                name,
                ModelSchema::new(features.iter().copied()),
                Box::new(RecordingScorer { seen: seen.clone() }),
            )
        };
        let registry = ModelRegistry::new(
            recording("vvn", &["UX", "TN"]),
            recording("vvx", &["month", "turbulence", "PG", "season_spring"]),
            recording("cloud_base", &["not_a_feature"]),
        );
        let provider = StaticProvider::new(document());
        let predictor = EnsemblePredictor::new(&registry, &provider);

        let prediction = predictor.predict_for_month("Lochem", Month::January).unwrap();
        assert_eq!(prediction.min_visibility, 2.0);
        assert_eq!(prediction.max_visibility, 4.0);
        assert_eq!(prediction.cloud_base_height, 1.0);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0], vec![90.0, 3.0]);
        assert_eq!(seen[1], vec![1.0, 0.0, 1020.0, 0.0]);
        assert_eq!(seen[2], vec![0.0]);
    }

    #[test]
    fn test_provider_failure_is_weather_fetch_failed() {
        let registry = ModelRegistry::new(
            linear("vvn", &["TN"], 0.0),
            linear("vvx", &["TN"], 0.0),
            linear("cloud_base", &["TN"], 0.0),
        );
        let predictor = EnsemblePredictor::new(&registry, &FailingProvider);
        assert!(matches!(
            predictor.predict_for_month("x", Month::May),
            Err(VizcastError::WeatherFetchFailed { .. })
        ));
    }

    #[test]
    fn test_empty_document_is_weather_fetch_failed() {
        let registry = ModelRegistry::new(
            linear("vvn", &["TN"], 0.0),
            linear("vvx", &["TN"], 0.0),
            linear("cloud_base", &["TN"], 0.0),
        );
        let provider = StaticProvider::new(json!({ "liveweer": [] }));
        let predictor = EnsemblePredictor::new(&registry, &provider);
        assert!(matches!(
            predictor.predict_for_month("x", Month::May),
            Err(VizcastError::WeatherFetchFailed { .. })
        ));
    }

    #[test]
    fn test_malformed_record_is_prediction_failed() {
        let registry = ModelRegistry::new(
            linear("vvn", &["TN"], 0.0),
            linear("vvx", &["TN"], 0.0),
            linear("cloud_base", &["TN"], 0.0),
        );
        let provider = StaticProvider::new(json!({ "liveweer": ["not a record"] }));
        let predictor = EnsemblePredictor::new(&registry, &provider);
        assert!(matches!(
            predictor.predict_for_month("x", Month::May),
            Err(VizcastError::PredictionFailed { .. })
        ));
    }

    #[test]
    fn test_empty_schema_is_prediction_failed() {
        let registry = ModelRegistry::new(
            linear("vvn", &["TN"], 0.0),
            linear("vvx", &[], 0.0),
            linear("cloud_base", &["TN"], 0.0),
        );
        let provider = StaticProvider::new(document());
        let predictor = EnsemblePredictor::new(&registry, &provider);

        let err = predictor.predict_for_month("x", Month::May).unwrap_err();
        assert!(matches!(err, VizcastError::PredictionFailed { .. }));
        assert!(err.to_string().contains("vvx"));
    }
}
