//! Conversational assistant answering questions about a route analysis

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::llm::{CompletionRequest, ModelBackend};
use crate::{AdvisorError, Result};

const PREAMBLE: &str =
    "You are a maritime assistant AI. You will answer questions about the following route data:\n";

/// System instruction embedding the compact JSON of the route context
pub fn system_instruction<C: Serialize + ?Sized>(route_context: &C) -> Result<String> {
    let context = serde_json::to_string(route_context)
        .map_err(|e| AdvisorError::assistant(format!("Route data is not serializable: {e}")))?;
    Ok(format!("{PREAMBLE}{context}"))
}

/// Stateless question answering; every call is an independent model request
#[derive(Clone)]
pub struct ConversationalAssistant {
    model: Arc<dyn ModelBackend>,
}

impl ConversationalAssistant {
    pub fn new(model: Arc<dyn ModelBackend>) -> Self {
        Self { model }
    }

    /// Answer `question` with the route context as grounding.
    ///
    /// A blank question is a [`AdvisorError::Validation`]; any model failure
    /// is reported as [`AdvisorError::Assistant`].
    #[instrument(skip_all, fields(model = self.model.model_name()))]
    pub async fn ask<C: Serialize + ?Sized>(&self, question: &str, route_context: &C) -> Result<String> {
        if question.trim().is_empty() {
            return Err(AdvisorError::validation("question must not be empty"));
        }

        let request = CompletionRequest::new(system_instruction(route_context)?, question);
        let reply = self.model.complete(request).await.map_err(|e| {
            error!("Assistant request failed: {}", e);
            AdvisorError::assistant(e.to_string())
        })?;

        info!("Assistant replied ({} chars)", reply.len());
        Ok(reply)
    }
}
