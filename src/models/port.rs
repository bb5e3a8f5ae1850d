//! Port and waypoint models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::AdvisorError;

/// A maritime waypoint identified by its code and coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port code, e.g. `SGSIN`
    pub code: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    #[serde(alias = "lng")]
    pub lon: f64,
}

impl Port {
    #[must_use]
    pub fn new<S: Into<String>>(code: S, lat: f64, lon: f64) -> Self {
        Self {
            code: code.into(),
            lat,
            lon,
        }
    }

    /// Format port coordinates
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lon)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.format_coordinates())
    }
}

/// Parses `CODE@LAT,LON`, e.g. `SGSIN@1.264,103.84`
impl FromStr for Port {
    type Err = AdvisorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (code, coords) = input.trim().split_once('@').ok_or_else(|| {
            AdvisorError::validation(format!("Port must be in format 'CODE@LAT,LON', got: {input}"))
        })?;

        let code = code.trim();
        if code.is_empty() {
            return Err(AdvisorError::validation("Port code cannot be empty"));
        }

        let (lat, lon) = coords.split_once(',').ok_or_else(|| {
            AdvisorError::validation(format!("Coordinates must be in format 'LAT,LON', got: {coords}"))
        })?;

        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| AdvisorError::validation(format!("Invalid latitude: {lat}")))?;
        let lon = lon
            .trim()
            .parse::<f64>()
            .map_err(|_| AdvisorError::validation(format!("Invalid longitude: {lon}")))?;

        Ok(Port::new(code, lat, lon))
    }
}

/// Loosely typed route waypoint as handed over by the persistence layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(default, alias = "code")]
    pub port_code: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default, alias = "lng")]
    pub lon: Option<f64>,
}

impl Waypoint {
    /// Convert to a port if the record has a code and finite coordinates
    #[must_use]
    pub fn to_port(&self) -> Option<Port> {
        let code = self.port_code.as_deref().map(str::trim).filter(|c| !c.is_empty())?;
        let lat = self.lat.filter(|v| v.is_finite())?;
        let lon = self.lon.filter(|v| v.is_finite())?;
        Some(Port::new(code, lat, lon))
    }
}

/// Keep only usable waypoints, in their original order
#[must_use]
pub fn ports_from_waypoints(waypoints: &[Waypoint]) -> Vec<Port> {
    waypoints.iter().filter_map(Waypoint::to_port).collect()
}
