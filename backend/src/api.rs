use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::token::TokenKeys;
use crate::{admin, auth};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: Arc<TokenKeys>,
    /// Registrations skip email verification
    pub dev_mode: bool,
}

impl AppState {
    pub fn new(db: SqlitePool, tokens: TokenKeys, dev_mode: bool) -> Self {
        Self {
            db,
            tokens: Arc::new(tokens),
            dev_mode,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify", post(auth::verify))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/refresh", post(auth::refresh))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/delete", post(admin::delete_user))
        .route("/admin/users/promote", post(admin::promote_user))
        .route("/admin/users/demote", post(admin::demote_user))
        .route("/admin/users/verify", post(admin::verify_user))
        .route("/admin/stats", get(admin::stats))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "auth", "storage": "sqlite" }))
}
