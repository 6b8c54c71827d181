//! Authentication configuration
//!
//! Centralized configuration for the token codec, cookie transport and
//! password hashing, with secure defaults following OWASP recommendations.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Main authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,
    /// Password hashing configuration
    #[serde(default)]
    pub password: PasswordConfig,
}

impl AuthConfig {
    /// Apply environment variable overrides
    pub fn from_env(mut self) -> Self {
        if let Ok(secret) = std::env::var("STOREKEEPER_JWT_SECRET") {
            self.jwt.secret = secret;
        }
        if let Ok(days) = std::env::var("STOREKEEPER_JWT_EXPIRATION_DAYS") {
            if let Ok(days) = days.parse() {
                self.jwt.expiration_days = days;
            }
        }
        if let Ok(name) = std::env::var("STOREKEEPER_JWT_COOKIE_NAME") {
            self.jwt.cookie_name = name;
        }
        self
    }

    /// Validate the configuration before the service starts
    pub fn validate(&self) -> AuthResult<()> {
        if self.jwt.secret.len() < 32 {
            return Err(AuthError::Config(
                "JWT secret must be at least 32 bytes".to_string(),
            ));
        }
        if self.jwt.expiration_days < 1 {
            return Err(AuthError::Config(
                "JWT expiration must be at least 1 day".to_string(),
            ));
        }
        if self.jwt.cookie_name.is_empty() || self.jwt.cookie_name.contains([';', '=', ' ']) {
            return Err(AuthError::Config(
                "Cookie name must be non-empty and free of ';', '=' and spaces".to_string(),
            ));
        }
        Ok(())
    }
}

/// JWT token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing tokens (at least 256 bits)
    pub secret: String,
    /// Token lifetime in whole days
    pub expiration_days: i64,
    /// Name of the cookie carrying the token
    pub cookie_name: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set in production
            expiration_days: 14,
            cookie_name: "access_token".to_string(),
        }
    }
}

/// Password hashing configuration (Argon2id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB (OWASP recommends 19456 KiB = 19 MiB minimum)
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
    /// Output hash length in bytes
    pub hash_length: u32,
    /// Minimum password length
    pub min_password_length: usize,
    /// Maximum password length (to prevent hashing DoS)
    pub max_password_length: usize,
    /// Require at least one uppercase letter
    pub require_uppercase: bool,
    /// Require at least one lowercase letter
    pub require_lowercase: bool,
    /// Require at least one digit
    pub require_digit: bool,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            // OWASP recommended values for Argon2id
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
            hash_length: 32,
            min_password_length: 8,
            max_password_length: 128,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
        }
    }
}
