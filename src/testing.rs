//! Test doubles shared by the unit tests

use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::Result;
use crate::llm::{CompletionRequest, ModelBackend};
use crate::models::{
    FinalAdvice, PortAdvisory, RiskLevel, RouteAdvisory, RouteAnalysis, WeatherObservation,
};
use crate::weather::WeatherProvider;

type WeatherFn = dyn Fn(usize, f64, f64) -> Result<WeatherObservation> + Send + Sync;
type ModelFn = dyn Fn(&CompletionRequest) -> Result<String> + Send + Sync;

/// Weather provider answering from a closure and recording every lookup
pub struct StubWeather {
    respond: Box<WeatherFn>,
    calls: Mutex<Vec<(f64, f64)>>,
}

impl StubWeather {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(usize, f64, f64) -> Result<WeatherObservation> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mild weather at every port
    pub fn fair() -> Self {
        Self::new(|_, _, _| Ok(fair_weather()))
    }

    pub fn calls(&self) -> Vec<(f64, f64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherProvider for StubWeather {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherObservation> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((lat, lon));
            calls.len() - 1
        };
        (self.respond)(index, lat, lon)
    }
}

/// Model backend answering from a closure and capturing every request
pub struct StubModel {
    respond: Box<ModelFn>,
    requests: Mutex<Vec<CompletionRequest>>,
    count: AtomicUsize,
}

impl StubModel {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&CompletionRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            requests: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        }
    }

    /// Always answers with the same text
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Answers with a well-formed analysis whose primary route lists the
    /// ports named in the prompt, in prompt order
    pub fn echoing_ports() -> Self {
        Self::new(|request| {
            let codes = prompt_port_codes(&request.user_message);
            let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
            Ok(serde_json::to_string(&sample_analysis(&codes)).unwrap())
        })
    }

    pub fn call_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelBackend for StubModel {
    fn model_name(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.count.fetch_add(1, Ordering::SeqCst);
        let reply = (self.respond)(&request);
        self.requests.lock().unwrap().push(request);
        reply
    }
}

pub fn fair_weather() -> WeatherObservation {
    WeatherObservation {
        temperature: Some(24.0),
        wind_speed: Some(5.0),
        visibility_meters: Some(10000.0),
        cloud_coverage_pct: Some(20.0),
        rain_mm: None,
        snow_mm: None,
        condition_text: Some("few clouds".to_string()),
        observed_at: None,
    }
}

/// Port codes in order of their `Weather at CODE:` headers
pub fn prompt_port_codes(prompt: &str) -> Vec<String> {
    prompt
        .lines()
        .filter_map(|line| line.strip_prefix("Weather at "))
        .filter_map(|rest| rest.strip_suffix(':'))
        .map(str::to_string)
        .collect()
}

/// A complete analysis with a primary route through `codes` and two
/// alternates sharing its endpoints
pub fn sample_analysis(codes: &[&str]) -> RouteAnalysis {
    let last = codes.len().saturating_sub(1);
    let port = |i: usize, code: &str| PortAdvisory {
        port_code: code.to_string(),
        temperature: Some(28.0),
        wind_speed: Some(6.5),
        visibility_meters: Some(9000.0),
        cloud_coverage_pct: Some(40.0),
        rain_mm: Some(0.0),
        snow_mm: Some(0.0),
        condition: Some("scattered clouds".to_string()),
        geopolitical_risk: RiskLevel::Low,
        pirate_risk: if i % 2 == 0 { RiskLevel::Low } else { RiskLevel::Medium },
        war_risk: RiskLevel::Low,
        sailing_advice: Some("Proceed as planned".to_string()),
        is_stopover: i != 0 && i != last,
    };

    let primary_ports: Vec<PortAdvisory> = codes
        .iter()
        .enumerate()
        .map(|(i, code)| port(i, code))
        .collect();

    let alternate = |n: usize, via: &str, advice: FinalAdvice| {
        let mut ports = Vec::new();
        if let Some(first) = codes.first() {
            ports.push(port(0, first));
        }
        ports.push(PortAdvisory {
            pirate_risk: RiskLevel::High,
            is_stopover: true,
            ..port(1, via)
        });
        if codes.len() > 1 {
            ports.push(port(last, codes[last]));
        }
        RouteAdvisory {
            route_name: format!("Alternative {n}"),
            ports,
            total_distance_km: Some(7100.0 + n as f64 * 350.0),
            final_advice: advice,
        }
    };

    RouteAnalysis {
        primary_route: RouteAdvisory {
            route_name: "Primary".to_string(),
            ports: primary_ports,
            total_distance_km: Some(6240.0),
            final_advice: FinalAdvice::Safe,
        },
        alternate_routes: vec![
            alternate(1, "OMSLL", FinalAdvice::Delay),
            alternate(2, "MVMLE", FinalAdvice::Reroute),
        ],
        recommendation: "Primary route is recommended: lowest risk and shortest distance"
            .to_string(),
    }
}
