//! Backend API Integration Tests
//!
//! Tests for the Axum HTTP endpoints using Router::oneshot pattern against an
//! in-memory SQLite database:
//! - Registration, email verification and login
//! - Token verification, refresh and password changes
//! - Admin-only user management

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use backend::api::{self, AppState};
use backend::db;
use backend::token::TokenKeys;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

/// Helper to create a test database pool with the schema and default admin
async fn test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    db::init(&pool, "admin123").await.expect("schema");
    pool
}

/// Helper to create test router
async fn test_app(dev_mode: bool) -> (Router, SqlitePool) {
    let pool = test_db().await;
    let state = AppState::new(pool.clone(), TokenKeys::new("test-secret", 24), dev_mode);
    (api::router(state), pool)
}

async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn register(app: &Router, username: &str, email: &str, password: &str) -> Value {
    call(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "username": username, "email": email, "password": password })),
    )
    .await
    .1
}

async fn login(app: &Router, username: &str, password: &str) -> Value {
    call(
        app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
    .1
}

async fn token_for(app: &Router, username: &str, password: &str) -> String {
    let body = login(app, username, password).await;
    assert_eq!(body["success"], true, "{body}");
    body["token"].as_str().unwrap().to_string()
}

// ============================================================================
// Health and Accounts
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app(false).await;
    let (status, body) = call(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy", "service": "auth", "storage": "sqlite" }));
}

#[tokio::test]
async fn test_default_admin_can_login() {
    let (app, _) = test_app(false).await;
    let body = login(&app, "admin", "admin123").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["is_admin"], true);
    assert_eq!(body["message"], "Welcome back, admin!");
}

#[tokio::test]
async fn test_dev_mode_registration_logs_in_by_email() {
    //! Dev mode verifies immediately; login accepts the email in any case
    let (app, _) = test_app(true).await;
    let body = register(&app, "Alice", "alice@example.com", "password123").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Registration successful! (Dev mode: auto-verified)");
    assert_eq!(body["verification_token"].as_str().map(str::len), Some(64));

    let body = login(&app, "ALICE@example.com", "password123").await;
    assert_eq!(body["success"], true);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["is_admin"], false);
}

#[tokio::test]
async fn test_unverified_account_needs_email_token() {
    let (app, pool) = test_app(false).await;
    let body = register(&app, "bob", "bob@example.com", "password123").await;
    assert_eq!(
        body["message"],
        "Registration successful! Please check your email for verification."
    );
    assert!(body.get("verification_token").is_none());

    let body = login(&app, "bob", "password123").await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Account not verified"));

    let token: String =
        sqlx::query_scalar("SELECT verification_token FROM users WHERE username = 'bob'")
            .fetch_one(&pool)
            .await
            .unwrap();
    let (_, body) = call(&app, "POST", "/auth/verify-email", None, Some(json!({ "token": token }))).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Email verified successfully! You can now login, bob.");

    let (_, again) = call(&app, "POST", "/auth/verify-email", None, Some(json!({ "token": token }))).await;
    assert_eq!(again["message"], "Invalid verification token.");

    assert_eq!(login(&app, "bob", "password123").await["success"], true);
}

#[tokio::test]
async fn test_duplicates_rejected() {
    let (app, _) = test_app(true).await;
    register(&app, "carol", "carol@example.com", "password123").await;

    let body = register(&app, "CAROL", "other@example.com", "password123").await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Username already exists.");

    let body = register(&app, "carol2", "Carol@Example.com", "password123").await;
    assert_eq!(body["message"], "Email already registered.");
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_the_same() {
    let (app, _) = test_app(true).await;
    register(&app, "dave", "dave@example.com", "password123").await;

    let wrong = login(&app, "dave", "nope").await;
    let unknown = login(&app, "nobody", "password123").await;
    assert_eq!(wrong, json!({ "success": false, "message": "Invalid username or password." }));
    assert_eq!(wrong, unknown);
}

// ============================================================================
// Tokens
// ============================================================================

#[tokio::test]
async fn test_verify_and_refresh_token() {
    let (app, _) = test_app(true).await;
    register(&app, "erin", "erin@example.com", "password123").await;
    let token = token_for(&app, "erin", "password123").await;

    let (_, body) = call(&app, "POST", "/auth/verify", None, Some(json!({ "token": token }))).await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["username"], "erin");
    assert_eq!(body["email"], "erin@example.com");

    let (_, body) = call(&app, "POST", "/auth/refresh", None, Some(json!({ "token": token }))).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Token refreshed successfully.");
    assert!(body["token"].is_string());

    let (_, body) = call(&app, "POST", "/auth/verify", None, Some(json!({ "token": "junk" }))).await;
    assert_eq!(body, json!({ "valid": false, "message": "Invalid or expired token." }));
}

#[tokio::test]
async fn test_logout_always_succeeds() {
    let (app, _) = test_app(false).await;
    let (status, body) = call(&app, "POST", "/auth/logout", None, Some(json!({ "token": "x" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully.");
}

#[tokio::test]
async fn test_change_password() {
    let (app, _) = test_app(true).await;
    register(&app, "frank", "frank@example.com", "password123").await;
    let token = token_for(&app, "frank", "password123").await;
    let change = |old: &str, new: &str| json!({ "old_password": old, "new_password": new });

    let (_, body) = call(&app, "POST", "/auth/change-password", None, Some(change("password123", "n"))).await;
    assert_eq!(body["message"], "Authorization required.");

    let (_, body) =
        call(&app, "POST", "/auth/change-password", Some(&token), Some(change("wrong", "newpass123"))).await;
    assert_eq!(body["message"], "Current password is incorrect.");

    let (_, body) = call(
        &app,
        "POST",
        "/auth/change-password",
        Some(&token),
        Some(change("password123", "newpass123")),
    )
    .await;
    assert_eq!(body["success"], true);

    assert_eq!(login(&app, "frank", "password123").await["success"], false);
    assert_eq!(login(&app, "frank", "newpass123").await["success"], true);
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_requires_token_and_role() {
    let (app, _) = test_app(true).await;
    register(&app, "gina", "gina@example.com", "password123").await;
    let user_token = token_for(&app, "gina", "password123").await;

    let (status, body) = call(&app, "GET", "/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, "GET", "/admin/users", Some("junk"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, "GET", "/admin/users", Some(&user_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required.");
}

#[tokio::test]
async fn test_admin_manages_users() {
    let (app, _) = test_app(true).await;
    register(&app, "hank", "hank@example.com", "password123").await;
    let admin = token_for(&app, "admin", "admin123").await;

    let (status, body) = call(&app, "GET", "/admin/users", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 2);
    assert!(body["users"][0].get("password_hash").is_none());

    let target = Some(json!({ "username": "hank" }));
    let (_, body) = call(&app, "POST", "/admin/users/promote", Some(&admin), target.clone()).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["admin"], "admin");
    assert_eq!(login(&app, "hank", "password123").await["is_admin"], true);

    let (_, body) = call(&app, "POST", "/admin/users/demote", Some(&admin), target.clone()).await;
    assert_eq!(body["success"], true);

    let (_, body) = call(&app, "GET", "/admin/stats", Some(&admin), None).await;
    assert_eq!(body["stats"]["total_users"], 2);
    assert_eq!(body["stats"]["admins"], 1);
    assert_eq!(body["stats"]["unverified"], 0);

    let (_, body) = call(&app, "POST", "/admin/users/delete", Some(&admin), target.clone()).await;
    assert_eq!(body["message"], "User 'hank' deleted.");
    let (status, _) = call(&app, "POST", "/admin/users/delete", Some(&admin), target).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cannot_remove_self() {
    let (app, _) = test_app(false).await;
    let admin = token_for(&app, "admin", "admin123").await;
    let me = Some(json!({ "username": "admin" }));

    let (status, body) = call(&app, "POST", "/admin/users/delete", Some(&admin), me.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You cannot delete your own account.");

    let (status, _) = call(&app, "POST", "/admin/users/demote", Some(&admin), me).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_verifies_account() {
    let (app, _) = test_app(false).await;
    register(&app, "ivy", "ivy@example.com", "password123").await;
    let admin = token_for(&app, "admin", "admin123").await;

    let (_, body) =
        call(&app, "POST", "/admin/users/verify", Some(&admin), Some(json!({ "username": "ivy" }))).await;
    assert_eq!(body["success"], true);
    assert_eq!(login(&app, "ivy", "password123").await["success"], true);
}
