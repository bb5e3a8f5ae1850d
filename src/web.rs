use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::http::StatusCode;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

use crate::api::{self, AppState};
use crate::config::{AdvisorConfig, ServerConfig};

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Full application: API under `/api` with CORS, body limit and timeout
pub fn app(state: AppState, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // CORS outermost so rejections from the inner layers still carry its headers
    let mut router = Router::new()
        .nest("/api", api::router(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    if server.request_timeout_seconds > 0 {
        router = router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(server.request_timeout_seconds.into()),
        ));
    }

    router.layer(cors)
}

pub async fn run(config: &AdvisorConfig) -> Result<()> {
    let state = AppState::from_config(config).context("Failed to initialize services")?;
    let app = app(state, &config.server);

    let addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);

    axum::serve(listener, app).await.context("Web server failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::RouteAdvisoryGenerator;
    use crate::assistant::ConversationalAssistant;
    use crate::testing::{StubModel, StubWeather};
    use axum::body::Body;
    use axum::http::{Request, header};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(model: &Arc<StubModel>) -> Router {
        let state = AppState::new(
            RouteAdvisoryGenerator::new(Arc::new(StubWeather::fair()), model.clone()),
            ConversationalAssistant::new(model.clone()),
        );
        app(state, &ServerConfig::default())
    }

    #[tokio::test]
    async fn test_cors_headers_on_success() {
        let model = Arc::new(StubModel::replying("unused"));
        let request = Request::get("/api/health")
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();

        let response = test_app(&model).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected_with_cors_headers() {
        let model = Arc::new(StubModel::replying("unused"));
        let request = Request::post("/api/analyze")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, MAX_BODY_BYTES + 1)
            .body(Body::from("{}"))
            .unwrap();

        let response = test_app(&model).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_body_under_limit_reaches_handler() {
        let model = Arc::new(StubModel::replying("unused"));
        let body = format!("{{\"ports\": []{}}}", " ".repeat(1024));
        let request = Request::post("/api/analyze")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = test_app(&model).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
