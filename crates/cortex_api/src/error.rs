use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum CortexApiError {
    MissingAccessToken,
    InvalidEndpoint(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    /// One event block failed to parse; isolated per block, never fatal to
    /// the stream.
    MalformedEnvelope(String),
    /// The retry wall-clock budget ran out.
    RetryTimeout { elapsed: Duration },
    Serde(JsonError),
}

impl fmt::Display for CortexApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAccessToken => write!(f, "access token is required"),
            Self::InvalidEndpoint(detail) => write!(f, "invalid agent endpoint: {detail}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::MalformedEnvelope(detail) => write!(f, "malformed event envelope: {detail}"),
            Self::RetryTimeout { elapsed } => {
                write!(f, "retry timeout after {}ms", elapsed.as_millis())
            }
            Self::Serde(error) => write!(f, "serialization error: {error}"),
        }
    }
}

impl std::error::Error for CortexApiError {}

impl From<reqwest::Error> for CortexApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for CortexApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// Extract a human-readable message from a non-success response body.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.filter(|message| !message.trim().is_empty()) {
            return match parsed.code.filter(|code| !code.trim().is_empty()) {
                Some(code) => format!("{message} (code {code})"),
                None => message,
            };
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    }
}
