//! Storekeeper Authentication Layer
//!
//! Stateless JWT cookie authentication for the Storekeeper backend:
//!
//! - **Token codec**: HS256 access tokens with subject + authorities claims
//! - **Cookie transport**: `HttpOnly` cookie attach/detach/extract
//! - **Password security**: Argon2id hashing with strength validation
//! - **Request authentication**: fail-open Tower middleware that attaches
//!   the verified identity to request extensions
//!
//! # Architecture
//!
//! ```text
//! Request ──► AuthLayer ──► route extractors ──► Handler
//!                │
//!                ├─ CookieTransport::extract
//!                ├─ TokenService::verify
//!                └─ AuthenticatedUser into extensions
//! ```
//!
//! The middleware never rejects a request itself; per-route extractors in
//! the API crate turn a missing identity into 401/403.

pub mod config;
pub mod cookie;
pub mod error;
pub mod middleware;
pub mod password;
pub mod token;
pub mod types;

pub use config::{AuthConfig, JwtConfig, PasswordConfig};
pub use cookie::CookieTransport;
pub use error::{AuthError, AuthResult};
pub use middleware::{AuthLayer, AuthMiddleware};
pub use password::PasswordService;
pub use token::{AccessClaims, TokenService};
pub use types::AuthenticatedUser;

use std::sync::Arc;

/// Main authentication service combining the auth components
#[derive(Clone)]
pub struct AuthService {
    pub token: Arc<TokenService>,
    pub cookies: Arc<CookieTransport>,
    pub password: PasswordService,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new auth service from validated configuration
    pub fn new(config: AuthConfig) -> Self {
        let token = Arc::new(TokenService::new(config.jwt.clone()));
        let cookies = Arc::new(CookieTransport::new(&config.jwt));
        let password = PasswordService::new(config.password.clone());

        Self {
            token,
            cookies,
            password,
            config,
        }
    }

    /// Get the config reference
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Create an auth layer for an Axum router
    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(self.token.clone(), self.cookies.clone())
    }
}
