//! Custom Axum extractors
//!
//! The authorization gate: per-route extractors that turn the identity
//! attached by the authentication middleware into access decisions.
//! Public routes simply take no extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use storekeeper_auth::AuthenticatedUser;

use crate::error::{ApiError, ErrorEnvelope};

/// Extractor requiring an authenticated caller.
///
/// Rejects with 401 when the request carries no verified identity.
pub struct CurrentUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| error_response(ApiError::Unauthenticated))
    }
}

/// Extractor requiring the ADMIN role.
///
/// 401 for anonymous callers, 403 for authenticated callers without ADMIN.
pub struct RequireAdmin(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| error_response(ApiError::Unauthenticated))?;

        if user.is_admin() {
            Ok(RequireAdmin(user))
        } else {
            Err(error_response(ApiError::Forbidden))
        }
    }
}

/// Optional identity; never rejects
pub struct OptionalUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(
            parts.extensions.get::<AuthenticatedUser>().cloned(),
        ))
    }
}

/// JSON extractor with validation
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> axum::extract::FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + validator::Validate,
{
    type Rejection = Response;

    async fn from_request(
        req: axum::http::Request<axum::body::Body>,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| error_response(ApiError::BadRequest(e.to_string())))?;

        value
            .validate()
            .map_err(|e| error_response(ApiError::Validation(first_validation_message(&e))))?;

        Ok(ValidatedJson(value))
    }
}

/// Create error response from ApiError
pub fn error_response(error: ApiError) -> Response {
    let status = error.status_code();
    (status, Json(ErrorEnvelope::from(&error))).into_response()
}

/// First violation message, by field name order.
///
/// The underlying map has no stable iteration order, so fields are sorted
/// to keep the 400 body deterministic when several fail at once.
fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    let mut entries: Vec<_> = errors.field_errors().into_iter().collect();
    entries.sort_by_key(|(field, _)| *field);

    entries
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: validation failed", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Validation failed".to_string())
}
