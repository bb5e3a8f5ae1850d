//! OpenWeather current-weather client

use async_trait::async_trait;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::http::{build_client, transport_error, without_query};
use crate::models::WeatherObservation;
use crate::{AdvisorError, Result};

/// Client for `GET <base_url>?lat=..&lon=..&units=metric&appid=..`
pub struct OpenWeatherClient {
    client: ClientWithMiddleware,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl OpenWeatherClient {
    /// Create a new client. Missing credentials are reported per request.
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = build_client(config.timeout_seconds, config.max_retries)?;
        Ok(Self::with_client(
            client,
            config.base_url.clone(),
            config.api_key.clone(),
        ))
    }

    #[must_use]
    pub fn with_client(
        client: ClientWithMiddleware,
        base_url: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Endpoint and credential, or a configuration error if either is blank
    fn credentials(&self) -> Result<(&str, &str)> {
        let base_url = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| AdvisorError::config("Weather API URL is missing"))?;
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AdvisorError::config("Weather API key is missing"))?;
        Ok((base_url, api_key))
    }
}

fn request_url(base_url: &str, api_key: &str, lat: f64, lon: f64) -> Result<Url> {
    Url::parse_with_params(
        base_url,
        &[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "metric".to_string()),
            ("appid", api_key.to_string()),
        ],
    )
    .map_err(|e| AdvisorError::config(format!("Invalid weather API URL '{base_url}': {e}")))
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherObservation> {
        let (base_url, api_key) = self.credentials()?;
        let url = request_url(base_url, api_key, lat, lon)?;

        debug!("Requesting current weather from {}", base_url);
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown error").to_string();
            warn!("Weather API returned {} {}", status.as_u16(), reason);
            return Err(AdvisorError::Network {
                status: status.as_u16(),
                reason,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AdvisorError::transport(without_query(&e.to_string())))?;

        let parsed: api::CurrentWeatherResponse = serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse weather response: {}", e);
            AdvisorError::invalid_response(format!("Invalid weather data received: {e}"))
        })?;

        info!(
            "Retrieved current weather in {:.3}s",
            start_time.elapsed().as_secs_f64()
        );

        Ok(parsed.into())
    }
}

/// OpenWeather response structures and conversion
mod api {
    use chrono::DateTime;
    use serde::Deserialize;

    use crate::models::WeatherObservation;

    #[derive(Debug, Deserialize)]
    pub struct CurrentWeatherResponse {
        pub main: Option<Main>,
        pub wind: Option<Wind>,
        pub visibility: Option<f64>,
        pub clouds: Option<Clouds>,
        pub rain: Option<Precipitation>,
        pub snow: Option<Precipitation>,
        pub weather: Option<Vec<Condition>>,
        pub dt: Option<i64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Main {
        pub temp: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Wind {
        pub speed: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Clouds {
        pub all: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Precipitation {
        #[serde(rename = "1h")]
        pub one_hour: Option<f64>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Condition {
        pub description: Option<String>,
    }

    impl From<CurrentWeatherResponse> for WeatherObservation {
        fn from(response: CurrentWeatherResponse) -> Self {
            Self {
                temperature: response.main.and_then(|m| m.temp),
                wind_speed: response.wind.and_then(|w| w.speed),
                visibility_meters: response.visibility,
                cloud_coverage_pct: response.clouds.and_then(|c| c.all),
                rain_mm: response.rain.and_then(|r| r.one_hour),
                snow_mm: response.snow.and_then(|s| s.one_hour),
                condition_text: response
                    .weather
                    .and_then(|w| w.into_iter().next())
                    .and_then(|c| c.description),
                observed_at: response.dt.and_then(|dt| DateTime::from_timestamp(dt, 0)),
            }
        }
    }
}
