//! Error types and handling for the route advisor
//!
//! Every failure of the analysis pipeline and the assistant is returned as a
//! typed [`AdvisorError`]. Callers that need the `{error, raw?}` wire shape
//! convert it into an [`AnalysisFailure`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the route advisor
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Missing or invalid configuration (credential, endpoint)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather provider answered with a non-success status
    #[error("weather provider returned {status} {reason}")]
    Network { status: u16, reason: String },

    /// Request never produced a response (connect, TLS, timeout)
    #[error("request failed: {message}")]
    Transport { message: String },

    /// Provider answered with a body we could not read
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Weather lookup for a single port failed, aborting the analysis
    #[error("{port}: {source}")]
    PortWeather {
        port: String,
        #[source]
        source: Box<AdvisorError>,
    },

    /// No usable ports were supplied
    #[error("no valid ports")]
    NoValidPorts,

    /// Model provider reported a quota or rate-limit condition
    #[error("quota exceeded")]
    ModelQuota { message: String },

    /// Any other model invocation failure
    #[error("unexpected model error: {message}")]
    Model { message: String },

    /// Model output could not be decoded into a route analysis
    #[error("{message}")]
    Decode { message: String, raw: String },

    /// Conversational assistant failure
    #[error("AI error: {message}")]
    Assistant { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Stable machine readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ConfigurationError,
    NetworkError,
    NoValidPorts,
    ModelQuotaError,
    ModelError,
    DecodeError,
    AiError,
    ValidationError,
    IoError,
}

pub const DECODE_FAILURE_MESSAGE: &str = "failed to parse model response as JSON";

impl AdvisorError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Attach the code of the port whose weather lookup failed
    pub fn for_port<S: Into<String>>(port: S, source: AdvisorError) -> Self {
        Self::PortWeather {
            port: port.into(),
            source: Box::new(source),
        }
    }

    pub fn model_quota<S: Into<String>>(message: S) -> Self {
        Self::ModelQuota {
            message: message.into(),
        }
    }

    pub fn model<S: Into<String>>(message: S) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// Create a decode error, keeping the raw model output
    pub fn decode<S: Into<String>, R: Into<String>>(message: S, raw: R) -> Self {
        Self::Decode {
            message: message.into(),
            raw: raw.into(),
        }
    }

    pub fn assistant<S: Into<String>>(message: S) -> Self {
        Self::Assistant {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Error code of this error. Port failures report the code of their cause.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            AdvisorError::Config { .. } => ErrorCode::ConfigurationError,
            AdvisorError::Network { .. }
            | AdvisorError::Transport { .. }
            | AdvisorError::InvalidResponse { .. } => ErrorCode::NetworkError,
            AdvisorError::PortWeather { source, .. } => source.code(),
            AdvisorError::NoValidPorts => ErrorCode::NoValidPorts,
            AdvisorError::ModelQuota { .. } => ErrorCode::ModelQuotaError,
            AdvisorError::Model { .. } => ErrorCode::ModelError,
            AdvisorError::Decode { .. } => ErrorCode::DecodeError,
            AdvisorError::Assistant { .. } => ErrorCode::AiError,
            AdvisorError::Validation { .. } => ErrorCode::ValidationError,
            AdvisorError::Io { .. } => ErrorCode::IoError,
        }
    }

    /// Raw model output preserved by a decode failure
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match self {
            AdvisorError::Decode { raw, .. } => Some(raw),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AdvisorError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            AdvisorError::Network { .. }
            | AdvisorError::Transport { .. }
            | AdvisorError::InvalidResponse { .. } => {
                "Unable to reach the weather service. Please check your internet connection."
                    .to_string()
            }
            AdvisorError::PortWeather { port, .. } => {
                format!("Weather for port {port} could not be retrieved. Route analysis aborted.")
            }
            AdvisorError::NoValidPorts => {
                "No valid ports to analyze. Add at least one port with coordinates.".to_string()
            }
            AdvisorError::ModelQuota { .. } => {
                "The AI service quota is exhausted. Please try again later.".to_string()
            }
            AdvisorError::Model { .. } => "The AI service failed unexpectedly.".to_string(),
            AdvisorError::Decode { .. } => {
                "Route analysis could not be completed: the AI answer was not readable."
                    .to_string()
            }
            AdvisorError::Assistant { message } => format!("Error: {message}"),
            AdvisorError::Validation { message } => format!("Invalid input: {message}"),
            AdvisorError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

/// Serializable failure value returned to callers instead of an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub error: String,
    pub code: ErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl From<&AdvisorError> for AnalysisFailure {
    fn from(err: &AdvisorError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code(),
            raw: err.raw().map(str::to_string),
        }
    }
}

impl From<AdvisorError> for AnalysisFailure {
    fn from(err: AdvisorError) -> Self {
        Self::from(&err)
    }
}
