//! Forwarding error taxonomy.

use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// A failed attempt to get response headers back from the upstream.
///
/// Every variant is turned into the JSON error envelope at the relay
/// boundary; none of them escape a connection task.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// The outbound request could not be constructed
    #[error("Invalid upstream request: {0}")]
    InvalidRequest(String),

    /// Connect, DNS, TLS or protocol failure talking to the upstream
    #[error("{0}")]
    Upstream(String),

    /// No response headers within the configured bound
    #[error("Upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl ForwardError {
    /// Build an `Upstream` error whose message spells out the whole source chain.
    ///
    /// hyper-util's client error only says "client error (Connect)" at the top
    /// level; the useful part ("Connection refused", "dns error") sits further down.
    pub fn upstream<E>(err: E) -> Self
    where
        E: StdError + 'static,
    {
        ForwardError::Upstream(describe_error_chain(&err))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ForwardError::InvalidRequest(_) => "invalid_request",
            ForwardError::Upstream(_) => "upstream",
            ForwardError::Timeout(_) => "timeout",
        }
    }
}

impl From<hyper::http::Error> for ForwardError {
    fn from(err: hyper::http::Error) -> Self {
        ForwardError::InvalidRequest(err.to_string())
    }
}

/// Join an error and all of its sources with `": "`, skipping repeats.
pub fn describe_error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut parts: Vec<String> = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        source = cause.source();
    }
    parts.join(": ")
}
