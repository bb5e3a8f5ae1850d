//! Decoding of the model's raw text into a [`RouteAnalysis`]

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::DECODE_FAILURE_MESSAGE;
use crate::models::RouteAnalysis;
use crate::{AdvisorError, Result};

/// Parse the model output. One strict attempt; on failure the raw text is
/// kept in the returned [`AdvisorError::Decode`].
pub fn decode(raw: &str) -> Result<RouteAnalysis> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        warn!("Model response is not valid JSON: {}", e);
        debug!("Raw model response: {}", raw);
        AdvisorError::decode(DECODE_FAILURE_MESSAGE, raw)
    })?;

    serde_json::from_value(value).map_err(|e| {
        warn!("Model response does not match the route analysis schema: {}", e);
        AdvisorError::decode(
            format!("model response does not match the route analysis schema: {e}"),
            raw,
        )
    })
}
