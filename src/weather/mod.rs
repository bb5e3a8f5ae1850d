//! Weather retrieval
//!
//! [`WeatherProvider`] is the seam the analysis pipeline depends on;
//! [`OpenWeatherClient`] is the production implementation.

use async_trait::async_trait;

use crate::Result;
use crate::models::WeatherObservation;

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Source of current weather observations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the current observation at a coordinate.
    ///
    /// Coordinates are passed through unvalidated. One request per call,
    /// no caching.
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherObservation>;
}
