use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Challenge returned alongside every 401.
pub const AUTH_CHALLENGE: &str = "Basic realm=\"laureates\"";

#[derive(Debug, Error)]
pub enum Error {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("laureate not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },

    #[error("persistence failure for laureate {id}: {reason}")]
    Persistence { id: String, reason: String },

    #[error("data file is unreadable: {0}")]
    Corrupt(String),

    #[error("bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Bootstrap(err.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            code,
        }
    }

    pub fn from_error(err: &Error) -> Self {
        match err {
            Error::Validation(msg) => Self::new("bad_request", msg, 400),
            Error::NotFound(id) => {
                Self::new("not_found", &format!("No laureate with id '{}'", id), 404)
            }
            Error::Unauthorized(msg) => Self::new("unauthorized", msg, 401),
            Error::RateLimited { .. } => {
                Self::new("rate_limit_exceeded", "Request rate limit exceeded", 429)
            }
            Error::Persistence { id, .. } => Self::new(
                "persistence_failure",
                &format!(
                    "Change to laureate '{}' was not applied: the data file was not durably written",
                    id
                ),
                500,
            ),
            other => Self::new("internal_error", &other.to_string(), 500),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorResponse::from_error(&self);
        let status =
            StatusCode::from_u16(body.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let mut resp = (status, Json(body)).into_response();

        match &self {
            Error::Unauthorized(_) => {
                resp.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static(AUTH_CHALLENGE),
                );
            }
            Error::RateLimited { retry_after } => {
                let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
                resp.headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            }
            _ => {}
        }

        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorResponse::from_error(&Error::Validation("x".into())).code, 400);
        assert_eq!(ErrorResponse::from_error(&Error::NotFound("7".into())).code, 404);
        assert_eq!(ErrorResponse::from_error(&Error::Unauthorized("x".into())).code, 401);
        assert_eq!(
            ErrorResponse::from_error(&Error::RateLimited {
                retry_after: Duration::from_secs(1)
            })
            .code,
            429
        );
        assert_eq!(ErrorResponse::from_error(&Error::Corrupt("bad".into())).code, 500);
    }

    #[test]
    fn test_unauthorized_carries_challenge() {
        let resp = Error::Unauthorized("missing credentials".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            AUTH_CHALLENGE
        );
    }

    #[test]
    fn test_rate_limited_retry_after_rounds_up() {
        let resp = Error::RateLimited {
            retry_after: Duration::from_millis(250),
        }
        .into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "1");
    }

    #[test]
    fn test_persistence_message_mentions_durability() {
        let body = ErrorResponse::from_error(&Error::Persistence {
            id: "12".into(),
            reason: "disk full".into(),
        });
        assert_eq!(body.code, 500);
        assert!(body.message.contains("not durably written"));
    }
}
