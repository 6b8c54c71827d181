//! API error handling
//!
//! Every error leaving the API is rendered as the uniform envelope
//! `{message, status, error, timestamp}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Authentication / Authorization
    // =========================================================================
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    // =========================================================================
    // Request Errors
    // =========================================================================
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    AlreadyExists(String),

    // =========================================================================
    // Resource Errors
    // =========================================================================
    #[error("{0}")]
    NotFound(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal server error")]
    Internal(String),

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl ApiError {
    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) | Self::AlreadyExists(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthenticated | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::AccountDisabled => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Machine-readable error kind
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Message safe to expose to clients
    pub fn client_message(&self) -> String {
        match self {
            // Internal detail stays in the logs
            Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Uniform API error envelope
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    /// Human-readable error message
    pub message: String,
    /// Numeric HTTP status
    pub status: u16,
    /// Machine-readable error kind
    pub error: String,
    /// When the error was produced
    pub timestamp: DateTime<Utc>,
}

impl From<&ApiError> for ErrorEnvelope {
    fn from(err: &ApiError) -> Self {
        Self {
            message: err.client_message(),
            status: err.status_code().as_u16(),
            error: err.error_kind().to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref detail) = self {
            tracing::error!(detail = %detail, "Internal error");
        }
        let status = self.status_code();
        (status, Json(ErrorEnvelope::from(&self))).into_response()
    }
}

impl From<storekeeper_auth::AuthError> for ApiError {
    fn from(err: storekeeper_auth::AuthError) -> Self {
        use storekeeper_auth::AuthError;
        match err {
            AuthError::EmptyToken
            | AuthError::TokenMalformed
            | AuthError::TokenSignatureInvalid
            | AuthError::TokenExpired => Self::Unauthenticated,
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::AccountDisabled => Self::AccountDisabled,
            AuthError::WeakPassword(msg) => Self::Validation(msg),
            AuthError::InvalidRole(name) => Self::BadRequest(format!("Invalid role name: {}", name)),
            AuthError::PasswordHashingFailed => {
                Self::Internal("Password hashing failed".to_string())
            }
            AuthError::Config(msg) | AuthError::Internal(msg) => Self::Internal(msg),
        }
    }
}

impl From<storekeeper_db::DbError> for ApiError {
    fn from(err: storekeeper_db::DbError) -> Self {
        use storekeeper_db::DbError;
        match err {
            DbError::Duplicate(msg) => Self::AlreadyExists(msg),
            DbError::NotFound(msg) => Self::NotFound(msg),
            other => {
                tracing::error!(error = ?other, "Store error");
                Self::Internal(other.to_string())
            }
        }
    }
}
