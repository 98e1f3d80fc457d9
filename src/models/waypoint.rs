//! Waypoint model for named route points

use crate::VizcastError;
use serde::{Deserialize, Serialize};

/// Named geographic point on a route.
///
/// Serialized as `{ "name": .., "location": "lat,lon" }`, the shape the
/// route map front-end and waypoint files use. A location read from a file
/// is kept as written and sent to the provider unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WaypointRecord", into = "WaypointRecord")]
pub struct Waypoint {
    /// Human-readable label
    pub name: String,
    location: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize)]
struct WaypointRecord {
    name: String,
    location: String,
}

impl Waypoint {
    /// Create a new waypoint; its location string uses four decimals
    #[must_use]
    pub fn new<S: Into<String>>(name: S, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            location: format!("{latitude:.4},{longitude:.4}"),
            latitude,
            longitude,
        }
    }

    /// Location string sent to the weather provider, e.g. `52.4300,7.0700`
    #[must_use]
    pub fn query(&self) -> &str {
        &self.location
    }

    /// Great-circle distance to another waypoint in kilometres
    #[must_use]
    pub fn distance_km(&self, other: &Waypoint) -> f64 {
        let from = haversine::Location {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        let to = haversine::Location {
            latitude: other.latitude,
            longitude: other.longitude,
        };
        haversine::distance(from, to, haversine::Units::Kilometers)
    }

    /// Parse coordinates from a string like `"52.4300,7.0700"`
    pub fn parse_coordinates(input: &str) -> crate::Result<(f64, f64)> {
        let (lat, lon) = input.split_once(',').ok_or_else(|| {
            VizcastError::config(format!("Coordinates must be 'lat,lon', got: {input}"))
        })?;

        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| VizcastError::config(format!("Invalid latitude: {lat}")))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| VizcastError::config(format!("Invalid longitude: {lon}")))?;

        if !(-90.0..=90.0).contains(&lat) {
            return Err(VizcastError::config(format!(
                "Latitude must be between -90 and 90, got: {lat}"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(VizcastError::config(format!(
                "Longitude must be between -180 and 180, got: {lon}"
            )));
        }

        Ok((lat, lon))
    }
}

impl TryFrom<WaypointRecord> for Waypoint {
    type Error = VizcastError;

    fn try_from(record: WaypointRecord) -> Result<Self, Self::Error> {
        let (latitude, longitude) = Self::parse_coordinates(&record.location)?;
        Ok(Self {
            name: record.name,
            location: record.location,
            latitude,
            longitude,
        })
    }
}

impl From<Waypoint> for WaypointRecord {
    fn from(waypoint: Waypoint) -> Self {
        Self {
            name: waypoint.name,
            location: waypoint.location,
        }
    }
}
