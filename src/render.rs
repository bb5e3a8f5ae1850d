//! Plain-text dashboard for route analyses

use crate::error::AnalysisFailure;
use crate::models::{FinalAdvice, PortAdvisory, RiskLevel, RouteAdvisory, RouteAnalysis};

const RULE: &str = "==============================================================";
const THIN_RULE: &str = "--------------------------------------------------------------";

fn risk_label(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::Low => "LOW",
        RiskLevel::Medium => "MEDIUM",
        RiskLevel::High => "HIGH",
        RiskLevel::Unknown => "UNKNOWN",
    }
}

fn advice_label(advice: FinalAdvice) -> &'static str {
    match advice {
        FinalAdvice::Safe => "SAFE",
        FinalAdvice::Delay => "DELAY",
        FinalAdvice::Reroute => "REROUTE",
        FinalAdvice::Unknown => "UNKNOWN",
    }
}

fn number(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v}{unit}"),
        None => "N/A".to_string(),
    }
}

fn text(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("N/A")
}

/// The primary route is recommended when the text mentions "Primary"
pub fn primary_recommended(recommendation: &str) -> bool {
    recommendation.contains("Primary")
}

/// Alternate `index` (0-based) is recommended when the text mentions
/// "Alternative N" with N = index + 1
pub fn alternate_recommended(recommendation: &str, index: usize) -> bool {
    recommendation.contains(&format!("Alternative {}", index + 1))
}

fn render_port(lines: &mut Vec<String>, port: &PortAdvisory) {
    let code = if port.port_code.trim().is_empty() {
        "N/A"
    } else {
        port.port_code.as_str()
    };
    let stopover = if port.is_stopover { " (stopover)" } else { "" };

    lines.push(format!("  * {code}{stopover}"));
    lines.push(format!(
        "      Weather:   {}, {}, wind {}, visibility {}",
        text(port.condition.as_deref()),
        number(port.temperature, "°C"),
        number(port.wind_speed, " m/s"),
        number(port.visibility_meters, " m"),
    ));
    lines.push(format!(
        "                 clouds {}, rain {}, snow {}",
        number(port.cloud_coverage_pct, "%"),
        number(port.rain_mm, " mm"),
        number(port.snow_mm, " mm"),
    ));
    lines.push(format!(
        "      Risk:      geopolitical {} | pirate {} | war {}",
        risk_label(port.geopolitical_risk),
        risk_label(port.pirate_risk),
        risk_label(port.war_risk),
    ));
    lines.push(format!("      Advice:    {}", text(port.sailing_advice.as_deref())));
}

fn render_route(lines: &mut Vec<String>, title: &str, route: &RouteAdvisory, recommended: bool) {
    let name = if route.route_name.trim().is_empty() {
        title
    } else {
        route.route_name.as_str()
    };
    let marker = if recommended { " [RECOMMENDED]" } else { "" };

    lines.push(format!("{title}: {name}{marker}"));
    lines.push(THIN_RULE.to_string());
    lines.push(format!(
        "Distance: {}    Final advice: {}",
        number(route.total_distance_km, " km"),
        advice_label(route.final_advice)
    ));

    if route.ports.is_empty() {
        lines.push("  (no ports)".to_string());
    }
    for port in &route.ports {
        render_port(lines, port);
    }
    lines.push(String::new());
}

/// Render a successful analysis: recommendation banner, primary route,
/// alternates numbered from 1, then the risk legend.
#[must_use]
pub fn render_analysis(analysis: &RouteAnalysis) -> String {
    let mut lines = vec![
        RULE.to_string(),
        "Route Analysis".to_string(),
        "Weather conditions and route recommendations".to_string(),
        RULE.to_string(),
    ];

    let recommendation = analysis.recommendation.trim();
    if !recommendation.is_empty() {
        lines.push(format!("Recommendation: {recommendation}"));
    }
    lines.push(String::new());

    render_route(
        &mut lines,
        "Primary Route",
        &analysis.primary_route,
        primary_recommended(recommendation),
    );

    if !analysis.alternate_routes.is_empty() {
        lines.push("Alternative Routes".to_string());
        lines.push(String::new());
        for (index, route) in analysis.alternate_routes.iter().enumerate() {
            render_route(
                &mut lines,
                &format!("Alternative {}", index + 1),
                route,
                alternate_recommended(recommendation, index),
            );
        }
    }

    lines.push("Risk Level Legend".to_string());
    lines.push("  LOW     minimal risk".to_string());
    lines.push("  MEDIUM  moderate caution".to_string());
    lines.push("  HIGH    significant risk".to_string());

    lines.join("\n")
}

/// Render the failure state. Never shows route data.
#[must_use]
pub fn render_failure(failure: &AnalysisFailure) -> String {
    let mut lines = vec![
        "Route analysis could not be completed".to_string(),
        format!("Reason: {}", failure.error),
    ];
    if let Some(raw) = failure.raw.as_deref() {
        lines.push("Model response:".to_string());
        lines.push(raw.to_string());
    }
    lines.join("\n")
}
