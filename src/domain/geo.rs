//! Geographic primitives and the proximity gate
//!
//! Everything here is pure arithmetic: no I/O, no clocks, no database.
//! Callers decide what to do with a [`ProximityResult`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius used by the haversine formula, in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Distance within which a user counts as "at" a place
pub const DEFAULT_THRESHOLD_M: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub enum GeoError {
    /// Coordinate missing, out of range or not a finite number
    InvalidInput(String),
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for GeoError {}

/// A validated latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidInput(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidInput(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a point from a record whose coordinates may be absent
    /// (e.g. a place row with NULL latitude)
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Result<Self, GeoError> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Self::new(lat, lon),
            _ => Err(GeoError::InvalidInput(
                "point has no coordinates".to_string(),
            )),
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in meters (haversine)
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        // Rounding can push `a` a hair above 1 for antipodal points
        let a = a.clamp(0.0, 1.0);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }
}

// Deserialization goes through `new` so an out-of-range point can never exist.
impl<'de> Deserialize<'de> for GeoPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        GeoPoint::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Outcome of a proximity check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityResult {
    pub distance_meters: f64,
    pub within_threshold: bool,
    pub threshold_meters: f64,
}

impl ProximityResult {
    /// Human readable distance, e.g. `Distance: 132.45m`
    pub fn distance_label(&self) -> String {
        format!("Distance: {:.2}m", self.distance_meters)
    }
}

/// Decide whether `current` is within `threshold_meters` of `target`
pub fn check_proximity(
    current: GeoPoint,
    target: GeoPoint,
    threshold_meters: f64,
) -> Result<ProximityResult, GeoError> {
    if !threshold_meters.is_finite() || threshold_meters < 0.0 {
        return Err(GeoError::InvalidInput(format!(
            "threshold {} must be a non-negative number of meters",
            threshold_meters
        )));
    }

    let distance_meters = current.distance_to(&target);

    Ok(ProximityResult {
        distance_meters,
        within_threshold: distance_meters <= threshold_meters,
        threshold_meters,
    })
}
