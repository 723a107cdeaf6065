use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token is structurally invalid: {0}")]
    Malformed(String),
    #[error("token signature mismatch")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Malformed(_) => "AUTH_TOKEN",
            AuthError::BadSignature => "AUTH_SIGNATURE",
            AuthError::Expired => "AUTH_EXPIRED",
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => "AUTH_HEADER",
            AuthError::Signing(_) => "AUTH_SIGN",
        }
    }
}

/// Uniform JSON error shape returned from every request boundary.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub timestamp: i64,
    pub status: u16,
}

impl ErrorBody {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            timestamp: Utc::now().timestamp_millis(),
            status: status.as_u16(),
        }
    }

    pub fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Signing failures keep their detail out of the response body.
        let message = match &self {
            AuthError::Signing(_) => "Unable to issue token".to_string(),
            other => other.to_string(),
        };
        ErrorBody::new(self.status(), self.code(), message).into_response()
    }
}
