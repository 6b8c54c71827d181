//! Request authentication middleware for Axum
//!
//! Tower layer that runs in front of every route. It extracts the access
//! token from the request cookie, verifies it, and on success attaches an
//! [`AuthenticatedUser`] to the request extensions.
//!
//! The middleware is fail-open: a missing or invalid token never short-
//! circuits the request. The request simply proceeds without an identity
//! and the per-route authorization extractors decide whether that is
//! acceptable. The inner service is called exactly once on every path.

use axum::extract::Request;
use axum::response::Response;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

use crate::cookie::CookieTransport;
use crate::token::TokenService;
use crate::types::AuthenticatedUser;

/// Authentication middleware layer
#[derive(Clone)]
pub struct AuthLayer {
    token: Arc<TokenService>,
    transport: Arc<CookieTransport>,
}

impl AuthLayer {
    /// Create a new authentication layer
    pub fn new(token: Arc<TokenService>, transport: Arc<CookieTransport>) -> Self {
        Self { token, transport }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            token: self.token.clone(),
            transport: self.transport.clone(),
        }
    }
}

/// Authentication middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    token: Arc<TokenService>,
    transport: Arc<CookieTransport>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let token_service = self.token.clone();
        let transport = self.transport.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if let Some(raw) = transport.extract(req.headers()) {
                match token_service.verify(&raw) {
                    Ok(claims) => {
                        req.extensions_mut().insert(AuthenticatedUser::from(claims));
                    }
                    Err(e) => {
                        // Proceed unauthenticated; route extractors enforce access
                        warn!(
                            error = %e,
                            code = e.error_code(),
                            "Discarding unusable access token"
                        );
                    }
                }
            }

            inner.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use axum::body::Body;
    use axum::http::{header::COOKIE, StatusCode};
    use std::collections::HashSet;
    use storekeeper_db::Role;
    use tower::ServiceExt;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string(),
            expiration_days: 14,
            cookie_name: "access_token".to_string(),
        }
    }

    fn layer() -> AuthLayer {
        let config = jwt_config();
        AuthLayer::new(
            Arc::new(TokenService::new(config.clone())),
            Arc::new(CookieTransport::new(&config)),
        )
    }

    /// Inner service reporting whether an identity was attached
    fn probe() -> impl Service<
        Request,
        Response = Response,
        Error = std::convert::Infallible,
        Future: Send + 'static,
    > + Clone
           + Send
           + 'static {
        tower::service_fn(|req: Request| async move {
            let authed = req.extensions().get::<AuthenticatedUser>().is_some();
            let response = Response::builder()
                .status(StatusCode::OK)
                .header("x-authenticated", if authed { "yes" } else { "no" })
                .body(Body::empty())
                .unwrap();
            Ok(response)
        })
    }

    #[tokio::test]
    async fn test_valid_cookie_attaches_identity() {
        let auth_layer = layer();
        let token_service = TokenService::new(jwt_config());
        let token = token_service
            .issue("ada@example.com", &HashSet::from([Role::User]))
            .unwrap();

        let request = Request::builder()
            .header(COOKIE, format!("access_token={}", token))
            .body(Body::empty())
            .unwrap();

        let response = auth_layer.layer(probe()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-authenticated"], "yes");
    }

    #[tokio::test]
    async fn test_missing_cookie_proceeds_unauthenticated() {
        let request = Request::builder().body(Body::empty()).unwrap();

        let response = layer().layer(probe()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-authenticated"], "no");
    }

    #[tokio::test]
    async fn test_garbage_token_proceeds_unauthenticated() {
        let request = Request::builder()
            .header(COOKIE, "access_token=garbage")
            .body(Body::empty())
            .unwrap();

        let response = layer().layer(probe()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-authenticated"], "no");
    }

    #[tokio::test]
    async fn test_empty_cookie_value_proceeds_unauthenticated() {
        let request = Request::builder()
            .header(COOKIE, "access_token=")
            .body(Body::empty())
            .unwrap();

        let response = layer().layer(probe()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-authenticated"], "no");
    }
}
