//! Authentication error types
//!
//! Errors are designed to be:
//! - Informative for logging/debugging
//! - Safe for external exposure (no sensitive data leakage)
//! - Convertible to HTTP status codes

use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    // =========================================================================
    // Token Errors (swallowed by the request authenticator; a request carrying
    // one of these proceeds unauthenticated)
    // =========================================================================
    /// Token value is null or blank
    #[error("Token is empty")]
    EmptyToken,

    /// Token is structurally invalid (not a decodable JWT)
    #[error("Token is malformed")]
    TokenMalformed,

    /// Token signature does not match
    #[error("Token signature is invalid")]
    TokenSignatureInvalid,

    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,

    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// Invalid credentials (unknown email or wrong password; never says which)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// User account is disabled
    #[error("Account is disabled")]
    AccountDisabled,

    // =========================================================================
    // Password Errors
    // =========================================================================
    /// Password does not meet requirements
    #[error("Password does not meet requirements: {0}")]
    WeakPassword(String),

    /// Password hashing failed
    #[error("Password hashing failed")]
    PasswordHashingFailed,

    // =========================================================================
    // Role Errors
    // =========================================================================
    /// Role name is not in the closed role set
    #[error("Invalid role name: {0}")]
    InvalidRole(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (never exposed to clients verbatim)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::WeakPassword(_) | Self::InvalidRole(_) => 400,

            // 401 Unauthorized
            Self::EmptyToken
            | Self::TokenMalformed
            | Self::TokenSignatureInvalid
            | Self::TokenExpired
            | Self::InvalidCredentials => 401,

            // 403 Forbidden
            Self::AccountDisabled => 403,

            // 500 Internal Server Error
            Self::PasswordHashingFailed | Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyToken => "EMPTY_TOKEN",
            Self::TokenMalformed => "TOKEN_MALFORMED",
            Self::TokenSignatureInvalid => "TOKEN_SIGNATURE_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidRole(_) => "INVALID_ROLE",
            Self::PasswordHashingFailed | Self::Config(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            Self::Config(_) | Self::Internal(_) | Self::PasswordHashingFailed => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidSignature => Self::TokenSignatureInvalid,
            _ => Self::TokenMalformed,
        }
    }
}
