//! Generative model access
//!
//! Both the route analysis and the conversational assistant talk to the
//! model through [`ModelBackend`]: one system instruction, one user message,
//! one text completion back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub mod openai;

pub use openai::OpenAiClient;

/// Single-turn completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub user_message: String,
}

impl CompletionRequest {
    pub fn new<S: Into<String>, U: Into<String>>(system_instruction: S, user_message: U) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            user_message: user_message.into(),
        }
    }
}

/// A text-completion backend.
///
/// Implementations report quota and rate-limit conditions as
/// [`AdvisorError::ModelQuota`](crate::AdvisorError::ModelQuota), missing
/// credentials as [`AdvisorError::Config`](crate::AdvisorError::Config) and
/// every other failure as [`AdvisorError::Model`](crate::AdvisorError::Model).
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Name of the model used for logging
    fn model_name(&self) -> &str;

    /// Run the completion and return the first choice's text
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
