//! Data models for the route advisor
//!
//! This module contains the core domain models organized by concern:
//! - Port: waypoints supplied by the caller
//! - Weather: provider observations and their per-port summary
//! - Advisory: the structured analysis returned by the generative model

pub mod advisory;
pub mod port;
pub mod weather;

// Re-export all public types for convenient access
pub use advisory::{FinalAdvice, PortAdvisory, RiskLevel, RouteAdvisory, RouteAnalysis};
pub use port::{Port, Waypoint, ports_from_waypoints};
pub use weather::WeatherObservation;
