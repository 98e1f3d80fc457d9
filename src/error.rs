//! Error types and handling for the `vizcast` prediction pipeline

use thiserror::Error;

/// Main error type for the `vizcast` library
#[derive(Error, Debug)]
pub enum VizcastError {
    /// The raw observation document could not be turned into features
    #[error("Malformed observation: {message}")]
    MalformedObservation { message: String },

    /// The weather provider was unreachable or returned no usable record
    #[error("Weather fetch failed: {message}")]
    WeatherFetchFailed { message: String },

    /// A model raised during scoring
    #[error("Prediction failed: {message}")]
    PredictionFailed { message: String },

    /// A model artifact could not be loaded at startup
    #[error("Failed to load model '{model}': {message}")]
    ModelLoad { model: String, message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl VizcastError {
    /// Create a new malformed-observation error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedObservation {
            message: message.into(),
        }
    }

    /// Create a new weather-fetch error
    pub fn weather_fetch<S: Into<String>>(message: S) -> Self {
        Self::WeatherFetchFailed {
            message: message.into(),
        }
    }

    /// Create a new prediction error
    pub fn prediction<S: Into<String>>(message: S) -> Self {
        Self::PredictionFailed {
            message: message.into(),
        }
    }

    /// Create a new model-load error
    pub fn model_load<M: Into<String>, S: Into<String>>(model: M, message: S) -> Self {
        Self::ModelLoad {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Stable label for logs and API payloads
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            VizcastError::MalformedObservation { .. } => "malformed_observation",
            VizcastError::WeatherFetchFailed { .. } => "weather_fetch_failed",
            VizcastError::PredictionFailed { .. } => "prediction_failed",
            VizcastError::ModelLoad { .. } => "model_load",
            VizcastError::Config { .. } => "config",
            VizcastError::Io { .. } => "io",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            VizcastError::MalformedObservation { .. } => {
                "The weather provider returned data that could not be interpreted.".to_string()
            }
            VizcastError::WeatherFetchFailed { .. } => {
                "Unable to retrieve current weather for this location.".to_string()
            }
            VizcastError::PredictionFailed { message } => {
                format!("Prediction failed: {message}")
            }
            VizcastError::ModelLoad { model, .. } => {
                format!("Model '{model}' is not available.")
            }
            VizcastError::Config { message } => format!("Configuration error: {message}"),
            VizcastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = VizcastError::malformed("liveweer is not an array");
        assert!(matches!(err, VizcastError::MalformedObservation { .. }));

        let err = VizcastError::weather_fetch("HTTP 503");
        assert!(matches!(err, VizcastError::WeatherFetchFailed { .. }));

        let err = VizcastError::prediction("empty schema");
        assert!(matches!(err, VizcastError::PredictionFailed { .. }));

        let err = VizcastError::model_load("vvn", "file not found");
        assert!(err.to_string().contains("'vvn'"));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(VizcastError::weather_fetch("x").kind(), "weather_fetch_failed");
        assert_eq!(VizcastError::prediction("x").kind(), "prediction_failed");
        assert_eq!(VizcastError::malformed("x").kind(), "malformed_observation");
    }

    #[test]
    fn test_user_messages() {
        let err = VizcastError::weather_fetch("timeout");
        assert!(err.user_message().contains("Unable to retrieve"));

        let err = VizcastError::prediction("model declares no input features");
        assert!(err.user_message().contains("no input features"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: VizcastError = io_err.into();
        assert!(matches!(err, VizcastError::Io { .. }));
    }
}
