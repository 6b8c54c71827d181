//! OpenAPI documentation
//!
//! The document is assembled with utoipa and served as plain JSON from
//! `/api-docs/openapi.json`.

use axum::{routing::get, Json, Router};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorEnvelope;
use crate::handlers;
use crate::state::AppState;

/// Complete API documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::logout,
        handlers::user::current_user,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::create_user,
        handlers::user::update_user,
        handlers::user::delete_user,
        handlers::health::health_check,
        handlers::health::readiness_check,
    ),
    components(schemas(
        dto::LoginRequest,
        dto::RegisterRequest,
        dto::UserDto,
        dto::UserRequest,
        dto::UserUpdateRequest,
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
        handlers::health::ComponentStatus,
        ErrorEnvelope,
    )),
    tags(
        (name = "Authentication", description = "Login, registration and logout"),
        (name = "Users", description = "Profile and admin user management"),
        (name = "Health", description = "Liveness and readiness probes")
    ),
    info(
        title = "Storekeeper API",
        description = "Store-management backend with JWT cookie authentication"
    )
)]
pub struct ApiDoc;

/// Routes serving the OpenAPI document
pub fn doc_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_auth_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/auth/login"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/v1/users/current-user"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
    }
}
