//! Error types for the remote gateway.

use thiserror::Error;

/// Fallback message for a failed request whose response carried no `message`.
pub const REQUEST_FAILED: &str = "Request failed";
/// Fallback message for failures that are not HTTP failures (e.g. an unreadable body).
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";

/// The only error kind the gateway surfaces: a transport or HTTP failure.
///
/// `message` is the server-reported message when the response had one, otherwise a
/// generic fallback. `status` is the HTTP status code when a response was received.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
    pub status: Option<u16>,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
        }
    }

    /// Builds the error for a non-2xx response.
    ///
    /// Uses the body's `message` field when the body is a JSON object carrying a
    /// non-empty string there, otherwise `fallback`.
    pub fn from_response_body(status: u16, body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| {
                value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| fallback.to_string());
        Self::with_status(message, status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl From<String> for RequestError {
    fn from(msg: String) -> Self {
        RequestError::new(msg)
    }
}
