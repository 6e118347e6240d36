use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use aerodesk_auth::{AuthzError, PasswordPolicyError};
use aerodesk_core::DomainError;
use aerodesk_infra::ProviderError;

/// Error surface of every API handler.
///
/// Client-facing messages are fixed per variant except where the caller
/// supplies one; upstream detail is logged, never returned.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("unauthenticated")]
    Unauthenticated,

    #[error("forbidden")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("upstream failure: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Self::Upstream(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(msg) | Self::NotFound(msg) | Self::Conflict(msg) => json_error(status, msg),
            Self::Unauthenticated => json_error(status, "Unauthorized"),
            Self::Unauthorized => json_error(status, "Forbidden"),
            Self::InvalidCredentials => json_error(status, "Invalid email or password"),
            Self::Upstream(detail) => {
                tracing::error!(error = %detail, "request failed on an upstream call");
                json_error(status, "Internal server error")
            }
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NoRole | AuthzError::InsufficientRole { .. } => Self::Unauthorized,
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound => Self::not_found("User not found"),
            ProviderError::InvalidCredentials => Self::InvalidCredentials,
            other => Self::upstream(other),
        }
    }
}
