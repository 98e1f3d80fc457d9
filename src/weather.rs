//! Weather provider integration
//!
//! The pipeline only needs one thing from a provider: the current observation
//! document for a location string. [`WeerliveClient`] implements that against
//! the weerlive.nl v2 API with a blocking HTTP client; tests plug in their
//! own [`WeatherProvider`].

use crate::config::WeatherConfig;
use crate::{Result, VizcastError};
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Key under which weerlive returns its observation records
pub const OBSERVATION_KEY: &str = "liveweer";

/// Raw provider response for one location
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationDocument {
    body: Value,
}

impl ObservationDocument {
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// True when the document carries no observation entry at all
    /// (missing, null or empty record list).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.body.get(OBSERVATION_KEY) {
            None | Some(Value::Null) => true,
            Some(Value::Array(records)) => records.is_empty(),
            Some(_) => false,
        }
    }

    /// First observation record.
    ///
    /// Fails with `MalformedObservation` when the record list or the record
    /// itself is not of the expected shape.
    pub fn first_record(&self) -> Result<&Map<String, Value>> {
        let records = self
            .body
            .get(OBSERVATION_KEY)
            .ok_or_else(|| VizcastError::malformed(format!("'{OBSERVATION_KEY}' is missing")))?
            .as_array()
            .ok_or_else(|| {
                VizcastError::malformed(format!("'{OBSERVATION_KEY}' is not an array"))
            })?;

        records
            .first()
            .ok_or_else(|| VizcastError::malformed(format!("'{OBSERVATION_KEY}' is empty")))?
            .as_object()
            .ok_or_else(|| VizcastError::malformed("observation record is not an object"))
    }
}

/// Source of current observations
pub trait WeatherProvider: Send + Sync {
    /// Fetch the observation document for a location (place name or `lat,lon`).
    ///
    /// Transport or HTTP failures are `WeatherFetchFailed`. A document that
    /// arrives but holds no records is returned as-is so callers can tell the
    /// two apart.
    fn fetch(&self, location: &str) -> Result<ObservationDocument>;
}

/// weerlive.nl API client
pub struct WeerliveClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl WeerliveClient {
    /// Create a new client from the weather configuration
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| VizcastError::config("Weather API key is required"))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("vizcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| VizcastError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
        })
    }

    fn request_url(&self, location: &str) -> String {
        format!(
            "{}?key={}&locatie={}",
            self.base_url,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(location)
        )
    }
}

impl WeatherProvider for WeerliveClient {
    #[instrument(skip(self))]
    fn fetch(&self, location: &str) -> Result<ObservationDocument> {
        info!("Fetching current weather for '{}'", location);
        let start_time = Instant::now();

        // reqwest errors carry the request URL, which holds the API key
        let response = self.client.get(self.request_url(location)).send().map_err(|e| {
            let e = e.without_url();
            warn!("Network error fetching weather: {}", e);
            VizcastError::weather_fetch(format!("Network error: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!("Weather provider returned HTTP {}", status.as_u16());
            return Err(VizcastError::weather_fetch(format!(
                "Provider returned status {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let body: Value = response.json().map_err(|e| {
            let e = e.without_url();
            error!("Failed to decode weather response: {}", e);
            VizcastError::weather_fetch(format!("Invalid response body: {e}"))
        })?;

        let total_duration = start_time.elapsed();
        debug!("Weather response received in {:.3}s", total_duration.as_secs_f64());
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow weather provider response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(ObservationDocument::new(body))
    }
}
