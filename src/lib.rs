//! `route_advisor` - Maritime route weather and risk advisory
//!
//! Fetches current weather for every port of a shipping route, asks a
//! generative model for a structured route analysis with alternates, and
//! answers free-text questions about a finished analysis.

pub mod advisory;
pub mod api;
pub mod assistant;
pub mod config;
pub mod error;
pub mod http;
pub mod llm;
pub mod logging;
pub mod models;
pub mod render;
pub mod weather;
pub mod web;

#[cfg(test)]
mod testing;

// Re-export core types for public API
pub use advisory::RouteAdvisoryGenerator;
pub use assistant::ConversationalAssistant;
pub use config::AdvisorConfig;
pub use error::{AdvisorError, AnalysisFailure, ErrorCode};
pub use llm::{CompletionRequest, ModelBackend, OpenAiClient};
pub use models::{
    FinalAdvice, Port, PortAdvisory, RiskLevel, RouteAdvisory, RouteAnalysis, Waypoint,
    WeatherObservation,
};
pub use weather::{OpenWeatherClient, WeatherProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AdvisorError>;
