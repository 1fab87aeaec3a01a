use std::fmt;

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Coarse failure category, kept alongside user-facing messages for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Transport,
    Server,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not_found"),
            ErrorKind::Transport => write!(f, "transport"),
            ErrorKind::Server => write!(f, "server"),
        }
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error body shape used by the backend, e.g. `{"message": "Email already exists"}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Prefer the server's `message` field, fall back to the raw body.
    fn extract_message(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody { message: Some(msg) }) if !msg.is_empty() => Self::truncate_body(&msg),
            _ => Self::truncate_body(body),
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::extract_message(body);
        match status.as_u16() {
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            code => ApiError::ServerError { status: code, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::RateLimited | ApiError::ServerError { .. } => ErrorKind::Server,
            ApiError::NetworkError(_) | ApiError::InvalidResponse(_) | ApiError::InvalidUrl(_) => {
                ErrorKind::Transport
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }

    /// One line suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound(_) => "User not found".to_string(),
            ApiError::RateLimited => "The server is busy, please try again shortly".to_string(),
            ApiError::ServerError { status, message } => {
                if message.is_empty() {
                    format!("Server error (HTTP {})", status)
                } else {
                    message.clone()
                }
            }
            ApiError::NetworkError(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            ApiError::NetworkError(_) => "Could not reach the server".to_string(),
            ApiError::InvalidResponse(_) => "The server sent an unexpected response".to_string(),
            ApiError::InvalidUrl(url) => format!("Invalid API address: {}", url),
        }
    }
}

/// Cloneable snapshot of a failed request.
///
/// Every reader waiting on the same fetch receives an identical copy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    /// Full error text for logs
    pub detail: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            detail: message.clone(),
            message,
        }
    }
}

impl From<&ApiError> for ErrorInfo {
    fn from(err: &ApiError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
            detail: err.to_string(),
        }
    }
}

impl From<ApiError> for ErrorInfo {
    fn from(err: ApiError) -> Self {
        Self::from(&err)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_not_found() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"message":"User not found"}"#);
        assert!(err.is_not_found());
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_from_status_keeps_code_and_message() {
        let err = ApiError::from_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Email already exists"}"#,
        );
        match &err {
            ApiError::ServerError { status, message } => {
                assert_eq!(*status, 422);
                assert_eq!(message, "Email already exists");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.user_message(), "Email already exists");
    }

    #[test]
    fn test_from_status_plain_body() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.user_message(), "upstream down");

        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.user_message(), "Server error (HTTP 500)");
    }

    #[test]
    fn test_from_status_rate_limited() {
        let err = ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, ApiError::RateLimited));
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[test]
    fn test_truncate_body() {
        let short = "short body";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "é".repeat(400);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_error_info_snapshot() {
        let err = ApiError::NotFound("no such id".to_string());
        let info = ErrorInfo::from(&err);
        assert_eq!(info.kind, ErrorKind::NotFound);
        assert_eq!(info.message, "User not found");
        assert_eq!(info.detail, "Resource not found: no such id");
        assert_eq!(info.to_string(), "User not found");
    }
}
