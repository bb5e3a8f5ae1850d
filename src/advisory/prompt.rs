//! Prompt construction for route analysis

use crate::models::{Port, WeatherObservation};

/// Fixed system instruction for the route analysis model
pub const ROUTE_ANALYSIS_INSTRUCTION: &str = r#"You are a maritime weather and risk assistant. You receive the current weather for every port of a shipping route, listed in sailing order.

Respond with a single JSON object and nothing else. Do not use markdown, code fences, headings, prose or explanations. The whole response must be parseable as JSON with no text before or after it.

The JSON object must match this schema exactly:
{
  "primary_route": ROUTE,
  "alternate_routes": [ROUTE, ROUTE],
  "recommendation": "Primary" | "Alternative 1" | "Alternative 2", followed by a short reason
}

ROUTE is:
{
  "route_name": string,
  "ports": [PORT, ...],
  "total_distance_km": number,
  "final_advice": "safe" | "delay" | "reroute"
}

PORT is:
{
  "port_code": string,
  "temperature": number (degrees Celsius),
  "wind_speed": number (m/s),
  "visibility_m": number (meters),
  "cloud_coverage_pct": number (0-100),
  "rain_mm": number,
  "snow_mm": number,
  "condition": string,
  "geopolitical_risk": "low" | "medium" | "high",
  "pirate_risk": "low" | "medium" | "high",
  "war_risk": "low" | "medium" | "high",
  "sailing_advice": string,
  "stopover": boolean
}

Rules:
- Return exactly one primary route and exactly two alternate routes.
- The primary route contains exactly the given ports, in the given order, one PORT entry per port, using the weather provided.
- Alternate routes start and end at the same ports as the primary route and may use other intermediate ports; estimate their weather and risks.
- Mark every port between the origin and the destination as a stopover.
- total_distance_km is your estimate of the sailing distance along the route."#;

/// Weather summary blocks for each port, in port order, separated by a
/// blank line
#[must_use]
pub fn build_prompt(observations: &[(Port, WeatherObservation)]) -> String {
    observations
        .iter()
        .map(|(port, observation)| observation.summary(&port.code))
        .collect::<Vec<_>>()
        .join("\n\n")
}
