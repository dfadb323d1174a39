//! Error classification for resource requests

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors produced by the [`ResourceClient`](crate::ResourceClient)
#[derive(Error, Debug)]
pub enum ResourceError {
    /// 401: the session token was rejected
    #[error("Unauthorized: the session is no longer valid")]
    Unauthorized,

    /// 404: nothing at this resource
    #[error("Resource not found")]
    NotFound,

    /// 400 and any other 4xx
    #[error("Invalid request (Status: {status}): {}", .message.as_deref().unwrap_or("no details"))]
    InvalidRequest {
        status: StatusCode,
        message: Option<String>,
    },

    /// 5xx, retried on reads
    #[error("Server error (Status: {status}): {}", .message.as_deref().unwrap_or("no details"))]
    Server {
        status: StatusCode,
        message: Option<String>,
    },

    /// Connection, timeout or other transport failure, retried on reads
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Retries on transient failures were used up
    #[error("Server unreachable after {attempts} attempts: {last_error}")]
    Unreachable { attempts: u32, last_error: String },

    /// An authorized call was attempted with an empty token
    #[error("Missing authorization token")]
    MissingToken,

    /// The request was abandoned because its screen went away
    #[error("Request cancelled")]
    Cancelled,

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The body of a successful response could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Pull a human readable message out of an error body
///
/// The backend sends `{"message": ...}` and occasionally `{"error": ...}`;
/// a non-JSON body is used as-is when it is not empty.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(parsed) => ["message", "error"]
            .iter()
            .filter_map(|key| parsed.get(*key).and_then(Value::as_str))
            .find(|m| !m.trim().is_empty())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}

impl ResourceError {
    /// Classify a non-success HTTP status and its body
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ResourceError::Unauthorized,
            StatusCode::NOT_FOUND => ResourceError::NotFound,
            s if s.is_server_error() => ResourceError::Server {
                status: s,
                message: server_message(body),
            },
            s => ResourceError::InvalidRequest {
                status: s,
                message: server_message(body),
            },
        }
    }

    /// Whether a read may be retried after this error
    pub fn is_transient(&self) -> bool {
        match self {
            ResourceError::Server { .. } => true,
            ResourceError::Network(err) => !err.is_decode(),
            _ => false,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ResourceError::Unauthorized)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResourceError::Cancelled)
    }

    /// Text suitable for showing to the guard
    pub fn user_message(&self) -> String {
        match self {
            ResourceError::Unauthorized | ResourceError::MissingToken => {
                "Your session has expired. Please log in again.".to_string()
            }
            ResourceError::NotFound => "Nothing found.".to_string(),
            ResourceError::InvalidRequest { message, .. } => message
                .clone()
                .unwrap_or_else(|| "Invalid request. Please check your input.".to_string()),
            ResourceError::Server { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("Server error: {}", status.as_u16())),
            ResourceError::Unreachable { .. } | ResourceError::Network(_) => {
                "Unable to reach the server. Please check your connection and try again."
                    .to_string()
            }
            ResourceError::Cancelled => "Request cancelled.".to_string(),
            ResourceError::Url(_)
            | ResourceError::Serialization(_)
            | ResourceError::InvalidResponse(_) => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ResourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert!(ResourceError::from_status(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(ResourceError::from_status(StatusCode::NOT_FOUND, "").is_not_found());
        assert!(ResourceError::from_status(StatusCode::BAD_GATEWAY, "").is_transient());
        assert!(!ResourceError::from_status(StatusCode::BAD_REQUEST, "").is_transient());
        assert!(matches!(
            ResourceError::from_status(StatusCode::CONFLICT, ""),
            ResourceError::InvalidRequest { .. }
        ));
    }

    #[test]
    fn test_server_message_prefers_message_field() {
        assert_eq!(
            server_message(r#"{"message":"Flat is required","error":"x"}"#),
            Some("Flat is required".to_string())
        );
        assert_eq!(server_message(r#"{"error":"Bad id"}"#), Some("Bad id".to_string()));
        assert_eq!(server_message("plain failure"), Some("plain failure".to_string()));
        assert_eq!(server_message("   "), None);
        assert_eq!(server_message(r#"{"status":400}"#), None);
    }

    #[test]
    fn test_user_message_falls_back_to_generic_text() {
        let err = ResourceError::InvalidRequest {
            status: StatusCode::BAD_REQUEST,
            message: None,
        };
        assert_eq!(err.user_message(), "Invalid request. Please check your input.");

        let err = ResourceError::InvalidRequest {
            status: StatusCode::BAD_REQUEST,
            message: Some("Phone number is invalid".to_string()),
        };
        assert_eq!(err.user_message(), "Phone number is invalid");
    }
}
