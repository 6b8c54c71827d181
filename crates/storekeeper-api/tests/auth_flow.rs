//! End-to-end authentication flow tests
//!
//! Exercise the full router (middleware, extractors, handlers) against the
//! in-memory store.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use storekeeper_api::{create_test_router, AppState};
use storekeeper_auth::{AuthConfig, AuthService};
use storekeeper_db::{MemoryUserStore, NewUser, Role, UserStore};

const USER_EMAIL: &str = "ada@example.com";
const USER_PASSWORD: &str = "Str0ngPassword1";
const ADMIN_EMAIL: &str = "root@example.com";
const ADMIN_PASSWORD: &str = "Adm1nPassword";
const DISABLED_EMAIL: &str = "gone@example.com";

async fn seed(store: &MemoryUserStore, auth: &AuthService) {
    let mk = |email: &str, password: &str, roles: HashSet<Role>, enabled: bool| NewUser {
        email: email.to_string(),
        password_hash: auth.password.hash_password(password).unwrap(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        gender: storekeeper_db::Gender::Female,
        birth_date: NaiveDate::from_ymd_opt(1990, 12, 10).unwrap(),
        enabled,
        roles,
    };

    store
        .create(mk(USER_EMAIL, USER_PASSWORD, HashSet::from([Role::User]), true))
        .await
        .unwrap();
    store
        .create(mk(
            ADMIN_EMAIL,
            ADMIN_PASSWORD,
            HashSet::from([Role::User, Role::Admin]),
            true,
        ))
        .await
        .unwrap();
    store
        .create(mk(
            DISABLED_EMAIL,
            USER_PASSWORD,
            HashSet::from([Role::User]),
            false,
        ))
        .await
        .unwrap();
}

async fn test_router() -> Router {
    let mut config = AuthConfig::default();
    config.jwt.secret = "test-secret-key-at-least-32-bytes-long!!".to_string();
    // Low hashing cost so tests stay fast
    config.password.memory_cost = 4096;
    config.password.time_cost = 1;

    let auth = AuthService::new(config);
    let store = MemoryUserStore::new();
    seed(&store, &auth).await;

    let state = Arc::new(AppState::new(Arc::new(store), Arc::new(auth)));
    create_test_router(state)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Log in and return the `name=value` cookie pair
async fn login_cookie(router: &Router, email: &str, password: &str) -> String {
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_login_sets_cookie_and_returns_sanitized_profile() {
    let router = test_router().await;
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            json!({"email": USER_EMAIL, "password": USER_PASSWORD}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Path=/"));
    assert!(set_cookie.contains("Max-Age=1209600"));

    let body = body_json(response).await;
    assert_eq!(body["email"], USER_EMAIL);
    assert_eq!(body["firstName"], "Ada");
    assert!(body.get("password").is_none());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_wrong_password_yields_envelope() {
    let router = test_router().await;
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            json!({"email": USER_EMAIL, "password": "WrongPassword1"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid credentials");
    assert_eq!(body["status"], 401);
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_login_unknown_email_indistinguishable_from_wrong_password() {
    let router = test_router().await;
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            json!({"email": "nobody@example.com", "password": USER_PASSWORD}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_disabled_account_forbidden() {
    let router = test_router().await;
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            json!({"email": DISABLED_EMAIL, "password": USER_PASSWORD}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "ACCOUNT_DISABLED");
}

#[tokio::test]
async fn test_current_user_requires_authentication() {
    let router = test_router().await;
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/current-user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_current_user_with_cookie() {
    let router = test_router().await;
    let cookie = login_cookie(&router, USER_EMAIL, USER_PASSWORD).await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/current-user")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["email"], USER_EMAIL);
}

#[tokio::test]
async fn test_current_user_gone_after_deletion_is_not_found() {
    let router = test_router().await;
    let user_cookie = login_cookie(&router, USER_EMAIL, USER_PASSWORD).await;
    let admin_cookie = login_cookie(&router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Look up the account's id through the admin list
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/users")
                .header(header::COOKIE, admin_cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let users = body_json(response).await;
    let id = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == USER_EMAIL)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Delete the account while its token is still in circulation
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/users/{}", id))
                .header(header::COOKIE, admin_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The cookie still verifies, but the subject no longer exists
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/current-user")
                .header(header::COOKIE, user_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_admin_endpoint_forbidden_for_plain_user() {
    let router = test_router().await;
    let cookie = login_cookie(&router, USER_EMAIL, USER_PASSWORD).await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/users")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["error"], "FORBIDDEN");
}

#[tokio::test]
async fn test_admin_endpoint_unauthorized_for_anonymous() {
    let router = test_router().await;
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/users")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_users() {
    let router = test_router().await;
    let cookie = login_cookie(&router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/users")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_register_then_login() {
    let router = test_router().await;
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/register",
            json!({
                "firstName": "Grace",
                "lastName": "Hopper",
                "email": "grace@example.com",
                "gender": "FEMALE",
                "birthDate": "1906-12-09",
                "password": "C0mpilersRule",
                "confirmPassword": "C0mpilersRule"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["email"], "grace@example.com");
    assert_eq!(body["roles"], json!(["USER"]));
    assert!(body.get("password").is_none());

    // Registration does not auto-login; credentials now work
    let cookie = login_cookie(&router, "grace@example.com", "C0mpilersRule").await;
    assert!(cookie.starts_with("access_token="));
}

#[tokio::test]
async fn test_duplicate_registration_is_bad_request() {
    let router = test_router().await;
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/register",
            json!({
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": USER_EMAIL,
                "gender": "FEMALE",
                "birthDate": "1990-12-10",
                "password": "An0therPassword",
                "confirmPassword": "An0therPassword"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_confirm_mismatch() {
    let router = test_router().await;
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/register",
            json!({
                "firstName": "Grace",
                "lastName": "Hopper",
                "email": "grace@example.com",
                "gender": "FEMALE",
                "birthDate": "1906-12-09",
                "password": "C0mpilersRule",
                "confirmPassword": "Different1"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("do not match"));
}

#[tokio::test]
async fn test_logout_is_idempotent_and_clears_cookie() {
    let router = test_router().await;

    for _ in 0..2 {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.starts_with("access_token=;"));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}

#[tokio::test]
async fn test_garbage_cookie_behaves_as_anonymous() {
    let router = test_router().await;
    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/users/current-user")
                .header(header::COOKIE, "access_token=garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Middleware swallows the bad token; the gate answers 401
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_crud_round_trip() {
    let router = test_router().await;
    let cookie = login_cookie(&router, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Create
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, cookie.clone())
                .body(Body::from(
                    json!({
                        "firstName": "Alan",
                        "lastName": "Turing",
                        "email": "alan@example.com",
                        "gender": "MALE",
                        "birthDate": "1912-06-23",
                        "password": "En1gmaMachine",
                        "roles": ["USER", "ADMIN"]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    // Update: drop the admin role and disable
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/users/{}", id))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, cookie.clone())
                .body(Body::from(
                    json!({
                        "firstName": "Alan",
                        "lastName": "Turing",
                        "email": "alan@example.com",
                        "gender": "MALE",
                        "birthDate": "1912-06-23",
                        "enabled": false,
                        "roles": ["USER"]
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["enabled"], false);
    assert_eq!(updated["roles"], json!(["USER"]));

    // Delete, then fetch is 404
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/users/{}", id))
                .header(header::COOKIE, cookie.clone())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/users/{}", id))
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_openapi_are_public() {
    let router = test_router().await;

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api-docs/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
