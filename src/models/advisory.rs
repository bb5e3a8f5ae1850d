//! Route advisory models produced by the generative model
//!
//! The model is only trusted to roughly follow the requested JSON shape, so
//! every field is coerced at deserialization time: enums fall back to an
//! `Unknown` variant, numbers may arrive as strings, and missing lists become
//! empty. Lists of the wrong shape are emptied and stray elements dropped.
//! Only `primary_route` is mandatory.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Risk level for geopolitical, piracy and war exposure
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl RiskLevel {
    /// Case-insensitive parse; anything unrecognised is `Unknown`
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => RiskLevel::Low,
            "medium" => RiskLevel::Medium,
            "high" => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Overall advice for a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FinalAdvice {
    Safe,
    Delay,
    Reroute,
    #[default]
    Unknown,
}

impl FinalAdvice {
    /// Case-insensitive parse; anything unrecognised is `Unknown`
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "safe" => FinalAdvice::Safe,
            "delay" => FinalAdvice::Delay,
            "reroute" => FinalAdvice::Reroute,
            _ => FinalAdvice::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FinalAdvice::Safe => "safe",
            FinalAdvice::Delay => "delay",
            FinalAdvice::Reroute => "reroute",
            FinalAdvice::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FinalAdvice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! lenient_enum_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let value = Value::deserialize(deserializer)?;
                Ok(value.as_str().map(<$ty>::parse).unwrap_or_default())
            }
        }
    };
}

lenient_enum_serde!(RiskLevel);
lenient_enum_serde!(FinalAdvice);

/// Weather and risk assessment for one port of a route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortAdvisory {
    #[serde(default, alias = "portCode", deserialize_with = "lenient_string")]
    pub port_code: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub temperature: Option<f64>,
    #[serde(default, alias = "windSpeed", deserialize_with = "lenient_f64")]
    pub wind_speed: Option<f64>,
    #[serde(
        default,
        rename = "visibility_m",
        alias = "visibility_meters",
        alias = "visibilityMeters",
        deserialize_with = "lenient_f64"
    )]
    pub visibility_meters: Option<f64>,
    #[serde(default, alias = "cloudCoveragePct", deserialize_with = "lenient_f64")]
    pub cloud_coverage_pct: Option<f64>,
    #[serde(default, alias = "rainMm", deserialize_with = "lenient_f64")]
    pub rain_mm: Option<f64>,
    #[serde(default, alias = "snowMm", deserialize_with = "lenient_f64")]
    pub snow_mm: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub condition: Option<String>,
    #[serde(default, alias = "geopoliticalRisk")]
    pub geopolitical_risk: RiskLevel,
    #[serde(default, alias = "pirateRisk")]
    pub pirate_risk: RiskLevel,
    #[serde(default, alias = "warRisk")]
    pub war_risk: RiskLevel,
    #[serde(default, alias = "sailingAdvice", deserialize_with = "lenient_opt_string")]
    pub sailing_advice: Option<String>,
    #[serde(
        default,
        rename = "stopover",
        alias = "is_stopover",
        alias = "isStopover",
        deserialize_with = "lenient_bool"
    )]
    pub is_stopover: bool,
}

/// One candidate route with its per-port advisories
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteAdvisory {
    #[serde(default, alias = "routeName", deserialize_with = "lenient_string")]
    pub route_name: String,
    #[serde(default, deserialize_with = "lenient_list")]
    pub ports: Vec<PortAdvisory>,
    #[serde(default, alias = "totalDistanceKm", deserialize_with = "lenient_f64")]
    pub total_distance_km: Option<f64>,
    #[serde(default, alias = "finalAdvice")]
    pub final_advice: FinalAdvice,
}

/// Complete result of one route analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteAnalysis {
    #[serde(alias = "primaryRoute")]
    pub primary_route: RouteAdvisory,
    #[serde(default, alias = "alternateRoutes", deserialize_with = "lenient_list")]
    pub alternate_routes: Vec<RouteAdvisory>,
    /// Free text naming the preferred route; not a lookup key
    #[serde(default, deserialize_with = "lenient_string")]
    pub recommendation: String,
}

impl RouteAnalysis {
    /// All routes, primary first
    pub fn routes(&self) -> impl Iterator<Item = &RouteAdvisory> {
        std::iter::once(&self.primary_route).chain(self.alternate_routes.iter())
    }
}

/// Anything but an array is empty; elements that are not objects are skipped
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(&s),
        _ => None,
    })
}

/// Accepts `"1,234.5 km"`, `" 12 "`, `"7.5m/s"`
fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+'))
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "y"),
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    })
}
