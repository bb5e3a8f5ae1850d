//! OpenAI chat completions client (`POST <base_url>/chat/completions`)

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::{CompletionRequest, ModelBackend};
use crate::config::ModelConfig;
use crate::http::build_client;
use crate::{AdvisorError, Result};

const QUOTA_MARKERS: [&str; 3] = ["insufficient_quota", "rate_limit_exceeded", "quota"];

/// Chat completions client bound to one model
#[derive(Clone)]
pub struct OpenAiClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiClient {
    /// Client for the structured route analysis model
    pub fn for_analysis(config: &ModelConfig) -> Result<Self> {
        Self::new(config, &config.analysis_model)
    }

    /// Client for the conversational assistant model
    pub fn for_chat(config: &ModelConfig) -> Result<Self> {
        Self::new(config, &config.chat_model)
    }

    pub fn new(config: &ModelConfig, model: &str) -> Result<Self> {
        let client = build_client(config.timeout_seconds, 0)?;
        Ok(Self::with_client(
            client,
            &config.base_url,
            config.api_key.clone(),
            model,
            config.temperature,
        ))
    }

    #[must_use]
    pub fn with_client(
        client: ClientWithMiddleware,
        base_url: &str,
        api_key: Option<String>,
        model: &str,
        temperature: Option<f32>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
            temperature,
        }
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AdvisorError::config("Model API key is missing"))
    }

    fn payload<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_message,
                },
            ],
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl ModelBackend for OpenAiClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let api_key = self.api_key()?;
        let body = serde_json::to_vec(&self.payload(&request))
            .map_err(|e| AdvisorError::model(format!("Failed to encode request: {e}")))?;

        debug!(
            "Sending chat completion ({} bytes of user content)",
            request.user_message.len()
        );
        let start_time = Instant::now();

        let response = self
            .client
            .post(self.url())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .body(body)
            .send()
            .await
            .map_err(|e| AdvisorError::model(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AdvisorError::model(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let api_error = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .map(|envelope| envelope.error);
            return Err(classify_failure(status, api_error, &text));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            error!("Unreadable chat completion response: {}", e);
            AdvisorError::model(format!("Failed to parse response JSON: {e}"))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| AdvisorError::model("Model returned no content"))?;

        info!(
            "Chat completion received in {:.3}s ({} chars)",
            start_time.elapsed().as_secs_f64(),
            content.len()
        );

        Ok(content)
    }
}

/// Quota and rate-limit failures are told apart from everything else
fn classify_failure(status: StatusCode, api_error: Option<ApiError>, body: &str) -> AdvisorError {
    let message = api_error
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), body.trim()));

    let marked_as_quota = api_error.as_ref().is_some_and(|e| {
        [e.code.as_deref(), e.kind.as_deref()]
            .into_iter()
            .flatten()
            .any(|v| QUOTA_MARKERS.iter().any(|marker| v.contains(marker)))
    });

    if status == StatusCode::TOO_MANY_REQUESTS || marked_as_quota {
        warn!("Model provider quota or rate limit hit: {}", message);
        AdvisorError::model_quota(message)
    } else {
        error!("Model provider error {}: {}", status.as_u16(), message);
        AdvisorError::model(message)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiError {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    code: Option<String>,
}
