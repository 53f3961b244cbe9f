//! Error taxonomy for the API client

use serde_json::Value;
use thiserror::Error;

/// Maximum length for response bodies carried inside error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    /// No response received (connect failure, TLS, timeout). Never triggers
    /// a token refresh.
    #[error("network error: {0}")]
    Network(String),

    /// Credentials are missing or could not be recovered by the refresh
    /// protocol; the user must authenticate again.
    #[error("session expired -- run 'dreamhouse-cli login'")]
    SessionExpired,

    /// Non-2xx response outside the refresh protocol. The server's own
    /// explanation is preserved for domain-level interpretation.
    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    /// Body could not be decoded as the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data around
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            format!(
                "{}... (truncated, {} total bytes)",
                &body[..MAX_ERROR_BODY_LENGTH],
                body.len()
            )
        }
    }

    /// Build an error from a non-2xx response, preferring the server's
    /// `detail`/`message`/`reason` field over the raw body.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| detail_field(&v))
            .unwrap_or_else(|| Self::truncate_body(body.trim()));
        ApiError::Status { status, detail }
    }
}

/// API error bodies carry their explanation under one of several keys.
fn detail_field(value: &Value) -> Option<String> {
    for key in ["detail", "message", "reason"] {
        if let Some(s) = value.get(key).and_then(Value::as_str) {
            if !s.is_empty() {
                return Some(s.to_string());
            }
        }
    }
    None
}
