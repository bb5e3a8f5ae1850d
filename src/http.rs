//! Shared HTTP client construction

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::{AdvisorError, Result};

const USER_AGENT: &str = concat!("route-advisor/", env!("CARGO_PKG_VERSION"));

/// Build a client. `timeout_seconds == 0` leaves requests unbounded and
/// `max_retries == 0` sends every request exactly once.
pub fn build_client(timeout_seconds: u32, max_retries: u32) -> Result<ClientWithMiddleware> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if timeout_seconds > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_seconds.into()));
    }

    let client = builder
        .build()
        .map_err(|e| AdvisorError::config(format!("Failed to create HTTP client: {e}")))?;

    let mut middleware = ClientBuilder::new(client);
    if max_retries > 0 {
        let policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        middleware = middleware.with(RetryTransientMiddleware::new_with_policy(policy));
    }

    Ok(middleware.build())
}

/// Map a middleware error to a transport error
pub(crate) fn transport_error(err: reqwest_middleware::Error) -> AdvisorError {
    AdvisorError::transport(without_query(&err.to_string()))
}

/// Error strings from reqwest embed the URL; drop the query so that
/// credentials passed as parameters never reach logs or callers.
pub(crate) fn without_query(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    let mut rest = message;
    while let Some(start) = rest.find('?') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = tail
            .find(|c: char| c.is_whitespace() || c == ')')
            .unwrap_or(tail.len());
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}
