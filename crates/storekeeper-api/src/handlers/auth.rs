//! Authentication handlers
//!
//! Login, registration and logout. Login attaches the access-token cookie;
//! logout replaces it with an immediately expiring one. Credential failures
//! never reveal whether the email or the password was wrong.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use std::collections::HashSet;
use std::sync::Arc;

use storekeeper_db::{NewUser, Role};

use crate::dto::{LoginRequest, RegisterRequest, UserDto};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// User login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, token cookie attached", body = UserDto),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled")
    )
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .store
        .find_by_email(&request.email)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    if !user.enabled {
        return Err(ApiError::AccountDisabled);
    }

    let valid = state
        .auth
        .password
        .verify_password(&request.password, &user.password_hash)
        .map_err(ApiError::from)?;

    if !valid {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .auth
        .token
        .issue(&user.email, &user.roles)
        .map_err(ApiError::from)?;
    let cookie = state.auth.cookies.attach(&token);

    tracing::info!(user_id = %user.id, email = %user.email, "User logged in");

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(UserDto::from(user)),
    ))
}

/// User registration
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = UserDto),
        (status = 400, description = "Validation failure or email already taken")
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    if state.store.exists_by_email(&request.email).await? {
        return Err(ApiError::AlreadyExists(format!(
            "User with email {} already exists",
            request.email
        )));
    }

    let password_hash = state
        .auth
        .password
        .hash_password(&request.password)
        .map_err(ApiError::from)?;

    // Self-registration always grants the default role
    state.store.ensure_role(Role::User).await?;

    let user = state
        .store
        .create(NewUser {
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            gender: request.gender,
            birth_date: request.birth_date,
            enabled: true,
            roles: HashSet::from([Role::User]),
        })
        .await?;

    tracing::info!(user_id = %user.id, email = %user.email, "New user registered");

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Logout
///
/// Idempotent: always succeeds and always emits the deletion cookie,
/// whether or not the caller held a valid token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Token cookie cleared")
    )
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cookie = state.auth.cookies.detach();
    (StatusCode::OK, AppendHeaders([(SET_COOKIE, cookie)]))
}
