//! User management handlers
//!
//! The self endpoint reads the subject from the security context, never
//! from a path parameter. Everything else is admin-only CRUD.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use storekeeper_db::{NewUser, UserUpdate};

use crate::dto::{UserDto, UserRequest, UserUpdateRequest};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{CurrentUser, RequireAdmin, ValidatedJson};
use crate::state::AppState;

/// Current user's own profile
#[utoipa::path(
    get,
    path = "/api/v1/users/current-user",
    tag = "Users",
    responses(
        (status = 200, description = "Caller's profile", body = UserDto),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Authenticated subject no longer exists")
    )
)]
pub async fn current_user(
    State(state): State<Arc<AppState>>,
    CurrentUser(identity): CurrentUser,
) -> ApiResult<Json<UserDto>> {
    let user = state
        .store
        .find_by_email(&identity.subject)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("User with email {} not found", identity.subject))
        })?;

    Ok(Json(UserDto::from(user)))
}

/// List all users (admin)
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users", body = [UserDto]),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_admin): RequireAdmin,
) -> ApiResult<Json<Vec<UserDto>>> {
    let users = state.store.list().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

/// Fetch one user by id (admin)
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserDto),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserDto>> {
    let user = state
        .store
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User with id {} not found", id)))?;

    Ok(Json(UserDto::from(user)))
}

/// Create a user with explicit roles (admin)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Validation failure or email already taken")
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    ValidatedJson(request): ValidatedJson<UserRequest>,
) -> ApiResult<impl IntoResponse> {
    let password_hash = state
        .auth
        .password
        .hash_password(&request.password)
        .map_err(ApiError::from)?;

    for role in &request.roles {
        state.store.ensure_role(*role).await?;
    }

    let user = state
        .store
        .create(NewUser {
            email: request.email,
            password_hash,
            first_name: request.first_name,
            last_name: request.last_name,
            gender: request.gender,
            birth_date: request.birth_date,
            enabled: request.enabled,
            roles: request.roles,
        })
        .await?;

    tracing::info!(user_id = %user.id, admin = %admin.subject, "User created by admin");

    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Replace a user's profile, roles and enabled flag (admin)
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserUpdateRequest,
    responses(
        (status = 200, description = "User updated", body = UserDto),
        (status = 404, description = "No such user")
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UserUpdateRequest>,
) -> ApiResult<Json<UserDto>> {
    for role in &request.roles {
        state.store.ensure_role(*role).await?;
    }

    let user = state
        .store
        .update(
            id,
            UserUpdate {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                gender: request.gender,
                birth_date: request.birth_date,
                enabled: request.enabled,
                roles: request.roles,
            },
        )
        .await?;

    tracing::info!(user_id = %user.id, admin = %admin.subject, "User updated by admin");

    Ok(Json(UserDto::from(user)))
}

/// Delete a user (admin)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "No such user")
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.store.delete(id).await?;
    tracing::info!(user_id = %id, admin = %admin.subject, "User deleted by admin");
    Ok(StatusCode::NO_CONTENT)
}
