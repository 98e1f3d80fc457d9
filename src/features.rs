//! Feature synthesis
//!
//! Turns one provider record into the canonical [`Observation`]: every base
//! field any model may ask for, the placeholder deltas, the month and the
//! season indicators.

use crate::models::{Observation, Season};
use crate::weather::ObservationDocument;
use crate::{Result, VizcastError};
use chrono::Month;
use serde_json::{Map, Value};

/// Canonical feature name and the weerlive field it is read from.
///
/// Several canonical names share a provider field because the models were
/// trained on two datasets with different column naming.
pub const PROVIDER_FIELDS: [(&str, &str); 14] = [
    ("RH", "neerslag"),
    ("PG", "luchtd"),
    ("FHN", "windsnelheid"),
    ("FXX", "windstoten"),
    ("DDVEC", "windrgr"),
    ("Q", "zon"),
    ("UX", "lv"),
    ("TN", "temp"),
    ("TG", "temp24"),
    ("temperature_2m", "temp"),
    ("relative_humidity_2m", "lv"),
    ("wind_speed_10m", "windsnelheid"),
    ("wind_direction_10m", "windrgr"),
    ("dew_point", "dauwp"),
];

/// Features a single snapshot cannot measure; always `0.0`.
pub const PLACEHOLDER_FEATURES: [&str; 3] = ["temperature_diff", "humidity_diff", "turbulence"];

pub const MONTH_FEATURE: &str = "month";

/// Build the canonical observation from a provider document.
pub fn synthesize(document: &ObservationDocument, month: Month) -> Result<Observation> {
    let record = document.first_record()?;
    synthesize_record(record, month)
}

/// Build the canonical observation from one provider record.
pub fn synthesize_record(record: &Map<String, Value>, month: Month) -> Result<Observation> {
    let mut features = Vec::with_capacity(PROVIDER_FIELDS.len() + PLACEHOLDER_FEATURES.len() + 4);

    for (canonical, field) in PROVIDER_FIELDS {
        features.push((canonical, coerce_field(record, field)?));
    }

    features.extend(PLACEHOLDER_FEATURES.map(|name| (name, 0.0)));
    features.push((MONTH_FEATURE, f64::from(month.number_from_month())));
    features.extend(Season::from(month).indicators());

    Ok(Observation::new(features))
}

/// Read a provider field as `f64`.
///
/// weerlive sends most values as strings; missing, null and blank values
/// count as `0.0`.
fn coerce_field(record: &Map<String, Value>, field: &str) -> Result<f64> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(number)) => number
            .as_f64()
            .ok_or_else(|| VizcastError::malformed(format!("'{field}' is out of range"))),
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(0.0);
            }
            text.parse::<f64>().map_err(|_| {
                VizcastError::malformed(format!("'{field}' is not numeric: {text:?}"))
            })
        }
        Some(other) => Err(VizcastError::malformed(format!(
            "'{field}' has unexpected type: {other}"
        ))),
    }
}
