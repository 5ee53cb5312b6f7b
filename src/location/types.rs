//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A validated latitude/longitude pair in degrees.
///
/// Fields are private so a `Coordinate` can only exist inside geographic
/// bounds. Deserialization goes through the same check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::Latitude(lat));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::Longitude(lon));
        }
        Ok(Self { lat, lon })
    }

    /// For compile-time datasets whose values are known to be in range.
    pub(crate) const fn from_static(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance in metres (haversine, mean Earth radius).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_008.8;
        let (phi1, phi2) = (self.lat.to_radians(), other.lat.to_radians());
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();
        let a = (d_phi / 2.0).sin().powi(2)
            + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_coords(self.lat, self.lon))
    }
}

/// Format as "16.4040°S, 71.5596°W".
pub fn format_coords(lat: f64, lon: f64) -> String {
    let ns = if lat < 0.0 { 'S' } else { 'N' };
    let ew = if lon < 0.0 { 'W' } else { 'E' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lon.abs(), ew)
}

/// OS-level authorization status for fine location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
            Self::Undetermined => write!(f, "undetermined"),
        }
    }
}

impl std::str::FromStr for PermissionState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "granted" | "grant" | "yes" => Ok(Self::Granted),
            "denied" | "deny" | "no" => Ok(Self::Denied),
            "undetermined" | "unknown" | "ask" => Ok(Self::Undetermined),
            _ => Err(ParseError::PermissionState(s.to_string())),
        }
    }
}

/// Result of one run of the acquisition flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "coordinate", rename_all = "lowercase")]
pub enum LocationRequestOutcome {
    Resolved(Coordinate),
    Unavailable,
}

impl From<Result<Coordinate, AcquireError>> for LocationRequestOutcome {
    fn from(result: Result<Coordinate, AcquireError>) -> Self {
        match result {
            Ok(c) => Self::Resolved(c),
            Err(_) => Self::Unavailable,
        }
    }
}

/// Whether acquisition failures reach the caller or are swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Denial and missing fixes end the flow without a callback.
    #[default]
    Silent,
    /// Denial and missing fixes are reported as [`AcquireError`].
    Strict,
}

impl std::str::FromStr for FailurePolicy {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "strict" => Ok(Self::Strict),
            _ => Err(ParseError::FailurePolicy(s.to_string())),
        }
    }
}

/// Why the flow produced no coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum AcquireError {
    #[error("Location permission was denied. Enable location access for this app.")]
    PermissionDenied,
    #[error("No location available. Enable location services and try again.")]
    LocationUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("Invalid latitude {0}: expected -90..90")]
    Latitude(f64),
    #[error("Invalid longitude {0}: expected -180..180")]
    Longitude(f64),
}

/// Unrecognized value for one of the string-typed settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown permission state '{0}'. Use 'granted', 'denied' or 'undetermined'.")]
    PermissionState(String),
    #[error("Unknown failure policy '{0}'. Use 'silent' or 'strict'.")]
    FailurePolicy(String),
    #[error("Unknown map type '{0}'. Use 'normal', 'hybrid', 'terrain' or 'satellite'.")]
    MapType(String),
}
