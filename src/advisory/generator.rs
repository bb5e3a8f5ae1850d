//! Route analysis pipeline: weather for every port, one model call, decode

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::decode::decode;
use super::prompt::{ROUTE_ANALYSIS_INSTRUCTION, build_prompt};
use crate::error::AnalysisFailure;
use crate::llm::{CompletionRequest, ModelBackend};
use crate::models::{Port, RouteAnalysis};
use crate::weather::WeatherProvider;
use crate::{AdvisorError, Result};

/// Produces a [`RouteAnalysis`] for an ordered list of ports
#[derive(Clone)]
pub struct RouteAdvisoryGenerator {
    weather: Arc<dyn WeatherProvider>,
    model: Arc<dyn ModelBackend>,
}

impl RouteAdvisoryGenerator {
    pub fn new(weather: Arc<dyn WeatherProvider>, model: Arc<dyn ModelBackend>) -> Self {
        Self { weather, model }
    }

    /// Analyze the route through `ports`.
    ///
    /// Weather is fetched sequentially in port order and the first failing
    /// port aborts the analysis before the model is called. An empty list
    /// fails with [`AdvisorError::NoValidPorts`] without any external call.
    #[instrument(skip_all, fields(ports = ports.len(), model = self.model.model_name()))]
    pub async fn generate_route_analysis(&self, ports: &[Port]) -> Result<RouteAnalysis> {
        if ports.is_empty() {
            warn!("Route analysis requested without ports");
            return Err(AdvisorError::NoValidPorts);
        }

        let start_time = Instant::now();
        let mut observations = Vec::with_capacity(ports.len());

        for port in ports {
            debug!("Fetching weather for {} ({})", port.code, port.format_coordinates());
            let observation = self
                .weather
                .fetch_weather(port.lat, port.lon)
                .await
                .map_err(|e| {
                    error!("Weather lookup failed for {}: {}", port.code, e);
                    AdvisorError::for_port(&port.code, e)
                })?;

            if observation.has_thunderstorm() {
                warn!("Thunderstorm reported at {}", port.code);
            }
            observations.push((port.clone(), observation));
        }

        let request = CompletionRequest::new(ROUTE_ANALYSIS_INSTRUCTION, build_prompt(&observations));
        let raw = self.model.complete(request).await.map_err(model_failure)?;

        let analysis = decode(&raw)?;
        info!(
            "Route analysis for {} ports completed in {:.3}s ({} alternates)",
            ports.len(),
            start_time.elapsed().as_secs_f64(),
            analysis.alternate_routes.len()
        );

        Ok(analysis)
    }

    /// Same as [`generate_route_analysis`](Self::generate_route_analysis) but
    /// with the failure in its serializable `{error, code, raw?}` form
    pub async fn analyze(
        &self,
        ports: &[Port],
    ) -> std::result::Result<RouteAnalysis, AnalysisFailure> {
        self.generate_route_analysis(ports)
            .await
            .map_err(AnalysisFailure::from)
    }
}

/// Keeps the quota/model/config split; anything else counts as a model error
fn model_failure(err: AdvisorError) -> AdvisorError {
    match err {
        AdvisorError::ModelQuota { .. } | AdvisorError::Model { .. } | AdvisorError::Config { .. } => {
            err
        }
        other => AdvisorError::model(other.to_string()),
    }
}
