//! JWT Token Service
//!
//! Stateless HS256 access tokens carried in a cookie. A token binds a
//! subject (email) to its granted authorities for a fixed lifetime; there
//! is no server-side token state and no revocation before expiry.
//!
//! Expiration is checked against a caller-supplied clock rather than the
//! library's, so issuance and verification share one clock source.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;

use storekeeper_db::Role;

use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};

/// Claims carried by an access token
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AccessClaims {
    /// Subject: the principal's email
    pub sub: String,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Granted authorities, serialized as role-name strings
    pub authorities: HashSet<Role>,
}

/// JWT service for issuing and verifying access tokens
#[derive(Clone)]
pub struct TokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Create a new token service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Issue a token for the subject with the given authorities
    pub fn issue(&self, subject: &str, authorities: &HashSet<Role>) -> AuthResult<String> {
        self.issue_at(subject, authorities, Utc::now())
    }

    /// Issue a token with an explicit clock
    pub fn issue_at(
        &self,
        subject: &str,
        authorities: &HashSet<Role>,
        now: DateTime<Utc>,
    ) -> AuthResult<String> {
        let exp = now + Duration::days(self.config.expiration_days);

        let claims = AccessClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            authorities: authorities.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode token: {}", e)))
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> AuthResult<AccessClaims> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token with an explicit clock
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<AccessClaims> {
        if token.trim().is_empty() {
            return Err(AuthError::EmptyToken);
        }

        // Expiry is validated below against the caller's clock
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.set_required_spec_claims::<&str>(&[]);

        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation)?;

        if data.claims.exp < now.timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(data.claims)
    }

    /// Token lifetime in whole days
    pub fn expiration_days(&self) -> i64 {
        self.config.expiration_days
    }
}
