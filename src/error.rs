use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Failures surfaced by calls to the story service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("could not reach the story service: {0}")]
    Network(String),
    #[error("not authorized: {0}")]
    Auth(String),
    #[error("request rejected: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl ApiError {
    /// Classify a non-success response. `body` is the raw response text; the
    /// service's `error.message` is used when it can be found.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            });

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            s if s.is_client_error() => ApiError::Validation(message),
            _ => ApiError::Network(format!("{} ({})", message, status.as_u16())),
        }
    }

    /// Text shown to the user when an explicit action fails.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => "The story service could not be reached. \
                 Check your connection and try again."
                .to_string(),
            ApiError::Auth(msg) => format!("You are not authorized to do that: {}", msg),
            ApiError::Validation(msg) => format!("The service rejected that request: {}", msg),
            ApiError::NotFound(msg) => format!("That no longer exists: {}", msg),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "network",
            ApiError::Auth(_) => "auth",
            ApiError::Validation(_) => "validation",
            ApiError::NotFound(_) => "not_found",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ApiError::from_status(status, ""),
            None => ApiError::Network(err.to_string()),
        }
    }
}
