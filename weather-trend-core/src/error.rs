use thiserror::Error;

/// Failures that can surface from the weather, stream and LLM collaborators.
///
/// Parse ambiguity in LLM output is deliberately absent: it is resolved by the
/// analyzer's fallback cascade and never reaches a caller.
#[derive(Debug, Error)]
pub enum TrendError {
    /// A required secret or setting is missing.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Client input outside the accepted range.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The remote service answered with a non-success status.
    #[error("{service} request failed with status {status}: {body}")]
    Upstream { service: &'static str, status: u16, body: String },

    /// The request never completed (connect error, timeout, body read).
    #[error("{service} request failed: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered 2xx with a body we could not decode.
    #[error("{service} returned a malformed response: {message}")]
    Malformed { service: &'static str, message: String },

    /// The LLM answered 2xx but carried no generated text.
    #[error("LLM response contained no text content")]
    EmptyContent,
}

impl TrendError {
    /// Build an upstream error, truncating the vendor body for log/response use.
    pub fn upstream(service: &'static str, status: u16, body: &str) -> Self {
        Self::Upstream { service, status, body: truncate_body(body) }
    }

    pub fn network(service: &'static str, source: reqwest::Error) -> Self {
        Self::Network { service, source }
    }

    /// HTTP status reported by the upstream, when one was received.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
