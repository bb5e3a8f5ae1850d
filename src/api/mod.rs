//! JSON API for the dashboard: route analysis, assistant and health

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::advisory::RouteAdvisoryGenerator;
use crate::assistant::ConversationalAssistant;
use crate::config::AdvisorConfig;
use crate::error::{AnalysisFailure, ErrorCode};
use crate::llm::OpenAiClient;
use crate::models::{Port, Waypoint, ports_from_waypoints};
use crate::weather::OpenWeatherClient;
use crate::{AdvisorError, VERSION};

/// Services shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: RouteAdvisoryGenerator,
    pub assistant: ConversationalAssistant,
}

impl AppState {
    pub fn new(generator: RouteAdvisoryGenerator, assistant: ConversationalAssistant) -> Self {
        Self {
            generator,
            assistant,
        }
    }

    /// Wire the production clients from configuration
    pub fn from_config(config: &AdvisorConfig) -> crate::Result<Self> {
        let weather = Arc::new(OpenWeatherClient::new(&config.weather)?);
        let analysis_model = Arc::new(OpenAiClient::for_analysis(&config.model)?);
        let chat_model = Arc::new(OpenAiClient::for_chat(&config.model)?);

        Ok(Self::new(
            RouteAdvisoryGenerator::new(weather, analysis_model),
            ConversationalAssistant::new(chat_model),
        ))
    }
}

/// Body of `POST /analyze`. Explicit ports win over waypoints.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub ports: Option<Vec<Port>>,
    #[serde(default)]
    pub waypoints: Option<Vec<Waypoint>>,
}

impl AnalyzeRequest {
    fn into_ports(self) -> Vec<Port> {
        match (self.ports, self.waypoints) {
            (Some(ports), _) => ports,
            (None, Some(waypoints)) => ports_from_waypoints(&waypoints),
            (None, None) => Vec::new(),
        }
    }
}

/// Body of `POST /ask-ai`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default, rename = "userMessage", alias = "user_message")]
    pub user_message: Option<String>,
    #[serde(default, rename = "routeData", alias = "route_data")]
    pub route_data: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub reply: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(analyze_route))
        .route("/ask-ai", post(ask_ai))
        .route("/health", get(health))
        .with_state(state)
}

/// HTTP status for an analysis failure
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NoValidPorts | ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
        ErrorCode::ModelQuotaError => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::NetworkError | ErrorCode::ModelError | ErrorCode::DecodeError => {
            StatusCode::BAD_GATEWAY
        }
        ErrorCode::ConfigurationError | ErrorCode::AiError | ErrorCode::IoError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AnalysisFailure {
    fn into_response(self) -> Response {
        (status_for(self.code), Json(self)).into_response()
    }
}

async fn analyze_route(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    let ports = request.into_ports();
    info!("Route analysis requested for {} ports", ports.len());

    match state.generator.analyze(&ports).await {
        Ok(analysis) => Json(analysis).into_response(),
        Err(failure) => {
            warn!("Route analysis failed: {}", failure.error);
            failure.into_response()
        }
    }
}

async fn ask_ai(State(state): State<AppState>, Json(request): Json<AskRequest>) -> Response {
    let question = request
        .user_message
        .filter(|m| !m.trim().is_empty());
    let route_data = request.route_data.filter(|d| !d.is_null());

    let (Some(question), Some(route_data)) = (question, route_data) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing required fields" })),
        )
            .into_response();
    };

    match state.assistant.ask(&question, &route_data).await {
        Ok(reply) => Json(AskResponse { reply }).into_response(),
        Err(err) => ai_failure(&err),
    }
}

fn ai_failure(err: &AdvisorError) -> Response {
    warn!("Assistant request failed: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "AI processing failed", "detail": err.to_string() })),
    )
        .into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubModel, StubWeather, sample_analysis};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use rstest::rstest;
    use tower::ServiceExt;

    fn app(weather: StubWeather, analysis_model: StubModel, chat_model: StubModel) -> Router {
        router(AppState::new(
            RouteAdvisoryGenerator::new(Arc::new(weather), Arc::new(analysis_model)),
            ConversationalAssistant::new(Arc::new(chat_model)),
        ))
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[rstest]
    #[case(ErrorCode::NoValidPorts, StatusCode::BAD_REQUEST)]
    #[case(ErrorCode::ModelQuotaError, StatusCode::TOO_MANY_REQUESTS)]
    #[case(ErrorCode::DecodeError, StatusCode::BAD_GATEWAY)]
    #[case(ErrorCode::NetworkError, StatusCode::BAD_GATEWAY)]
    #[case(ErrorCode::ConfigurationError, StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(#[case] code: ErrorCode, #[case] status: StatusCode) {
        assert_eq!(status_for(code), status);
    }

    #[tokio::test]
    async fn test_analyze_with_ports() {
        let app = app(
            StubWeather::fair(),
            StubModel::echoing_ports(),
            StubModel::replying("unused"),
        );
        let (status, body) = post_json(
            app,
            "/analyze",
            json!({ "ports": [
                {"code": "AEDXB", "lat": 25.2775, "lon": 55.2938},
                {"code": "SGSIN", "lat": 1.264, "lng": 103.84}
            ]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["primary_route"]["ports"][0]["port_code"], "AEDXB");
        assert_eq!(body["primary_route"]["ports"][1]["port_code"], "SGSIN");
        assert_eq!(body["alternate_routes"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_analyze_filters_waypoints() {
        let app = app(
            StubWeather::fair(),
            StubModel::echoing_ports(),
            StubModel::replying("unused"),
        );
        let (status, body) = post_json(
            app,
            "/analyze",
            json!({ "waypoints": [
                {"port_code": "AEDXB", "lat": 25.2775, "lng": 55.2938},
                {"port_code": null, "lat": 10.0, "lng": 60.0},
                {"port_code": "LKCMB", "lat": null, "lng": 79.84},
                {"port_code": "SGSIN", "lat": 1.264, "lng": 103.84}
            ]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let codes: Vec<&str> = body["primary_route"]["ports"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["port_code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["AEDXB", "SGSIN"]);
    }

    #[tokio::test]
    async fn test_analyze_without_valid_ports() {
        let app = app(
            StubWeather::fair(),
            StubModel::echoing_ports(),
            StubModel::replying("unused"),
        );
        let (status, body) = post_json(
            app,
            "/analyze",
            json!({ "waypoints": [{"port_code": "", "lat": 1.0, "lng": 2.0}] }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "no valid ports");
        assert_eq!(body["code"], "no_valid_ports");
    }

    #[tokio::test]
    async fn test_analyze_decode_failure_returns_raw() {
        let app = app(
            StubWeather::fair(),
            StubModel::replying("not json{{"),
            StubModel::replying("unused"),
        );
        let (status, body) = post_json(
            app,
            "/analyze",
            json!({ "ports": [{"code": "AEDXB", "lat": 25.2775, "lon": 55.2938}] }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "failed to parse model response as JSON");
        assert_eq!(body["raw"], "not json{{");
    }

    #[tokio::test]
    async fn test_ask_ai_replies() {
        let app = app(
            StubWeather::fair(),
            StubModel::replying("unused"),
            StubModel::replying("Alternative 1 avoids the high pirate risk."),
        );
        let analysis = serde_json::to_value(sample_analysis(&["AEDXB", "SGSIN"])).unwrap();
        let (status, body) = post_json(
            app,
            "/ask-ai",
            json!({ "userMessage": "Which route is safest?", "routeData": analysis }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Alternative 1 avoids the high pirate risk.");
    }

    #[rstest]
    #[case(json!({ "routeData": {"primary_route": {}} }))]
    #[case(json!({ "userMessage": "Hello?" }))]
    #[case(json!({ "userMessage": "  ", "routeData": {} }))]
    #[case(json!({ "userMessage": "Hello?", "routeData": null }))]
    #[tokio::test]
    async fn test_ask_ai_missing_fields(#[case] body: Value) {
        let app = app(
            StubWeather::fair(),
            StubModel::replying("unused"),
            StubModel::replying("unused"),
        );
        let (status, body) = post_json(app, "/ask-ai", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing required fields" }));
    }

    #[tokio::test]
    async fn test_ask_ai_model_failure() {
        let app = app(
            StubWeather::fair(),
            StubModel::replying("unused"),
            StubModel::new(|_| Err(AdvisorError::model("HTTP 500: upstream"))),
        );
        let (status, body) = post_json(
            app,
            "/ask-ai",
            json!({ "userMessage": "Any storms?", "routeData": {} }),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "AI processing failed");
        assert!(body["detail"].as_str().unwrap().contains("upstream"));
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(
            StubWeather::fair(),
            StubModel::replying("unused"),
            StubModel::replying("unused"),
        );
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], VERSION);
    }
}
