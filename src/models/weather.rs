//! Weather observation model and per-port summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions at a coordinate. The provider may omit any field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Temperature in Celsius
    pub temperature: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed: Option<f64>,
    /// Visibility in meters
    pub visibility_meters: Option<f64>,
    /// Cloud cover percentage (0-100)
    pub cloud_coverage_pct: Option<f64>,
    /// Rain volume over the last hour in mm
    pub rain_mm: Option<f64>,
    /// Snow volume over the last hour in mm
    pub snow_mm: Option<f64>,
    /// Human-readable description of weather conditions
    pub condition_text: Option<String>,
    /// Observation time reported by the provider
    pub observed_at: Option<DateTime<Utc>>,
}

impl WeatherObservation {
    /// Fixed-format text block describing this observation for one port.
    ///
    /// Missing values render as `N/A`, `unknown` or `0`, never blank.
    #[must_use]
    pub fn summary(&self, port_code: &str) -> String {
        format!(
            "Weather at {port_code}:\n\
             - Temperature: {}°C\n\
             - Wind: {} m/s\n\
             - Visibility: {} meters\n\
             - Clouds: {}%\n\
             - Rain: {} mm\n\
             - Snow: {} mm\n\
             - Condition: {}",
            or_text(self.temperature, "N/A"),
            or_text(self.wind_speed, "N/A"),
            or_text(self.visibility_meters, "unknown"),
            or_text(self.cloud_coverage_pct, "N/A"),
            self.rain_mm.unwrap_or(0.0),
            self.snow_mm.unwrap_or(0.0),
            self.condition_text
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or("unknown"),
        )
    }

    /// Thunderstorm reported in the condition text
    #[must_use]
    pub fn has_thunderstorm(&self) -> bool {
        self.condition_text
            .as_deref()
            .is_some_and(|c| c.to_lowercase().contains("thunderstorm"))
    }
}

fn or_text(value: Option<f64>, fallback: &str) -> String {
    value.map_or_else(|| fallback.to_string(), |v| v.to_string())
}
