//! Admin-only user management
//!
//! Every handler takes an [`AdminUser`], which checks the bearer token and
//! then the current `is_admin` flag in the database, so a demoted admin's
//! old token stops working.

use axum::{
    extract::{FromRequestParts, Json, State},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::api::AppState;
use crate::auth::bearer_token;
use crate::db::{self, UserSummary};
use crate::error::{ApiError, ApiResult};

/// An authenticated administrator
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization token.".to_string()))?;
        let claims = state
            .tokens
            .verify(token)
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token.".to_string()))?;

        match db::find_by_username(&state.db, &claims.username).await? {
            Some(user) if user.is_admin => Ok(AdminUser {
                username: user.username,
            }),
            Some(_) => Err(ApiError::Forbidden),
            None => Err(ApiError::Unauthorized("Account no longer exists.".to_string())),
        }
    }
}

#[derive(Deserialize)]
pub struct UserRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AdminResponse {
    pub success: bool,
    pub message: String,
    pub admin: String,
}

impl AdminResponse {
    fn done(admin: AdminUser, message: String) -> Json<Self> {
        Json(Self {
            success: true,
            message,
            admin: admin.username,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStats {
    pub total_users: i64,
    pub admins: i64,
    pub verified: i64,
    pub unverified: i64,
    pub total_games: i64,
}

pub async fn list_users(admin: AdminUser, State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let users: Vec<UserSummary> = db::list_users(&state.db)
        .await?
        .into_iter()
        .map(UserSummary::from)
        .collect();
    Ok(Json(json!({
        "success": true,
        "admin": admin.username,
        "total_users": users.len(),
        "users": users,
    })))
}

pub async fn delete_user(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<UserRequest>,
) -> ApiResult<Json<AdminResponse>> {
    let target = existing_user(&state, &payload.username).await?;
    if target.eq_ignore_ascii_case(&admin.username) {
        return Err(ApiError::BadRequest(
            "You cannot delete your own account.".to_string(),
        ));
    }

    sqlx::query("DELETE FROM users WHERE username = ?")
        .bind(&target)
        .execute(&state.db)
        .await?;
    info!("[ADMIN] {} deleted {}", admin.username, target);
    Ok(AdminResponse::done(admin, format!("User '{target}' deleted.")))
}

pub async fn promote_user(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<UserRequest>,
) -> ApiResult<Json<AdminResponse>> {
    let target = existing_user(&state, &payload.username).await?;
    set_admin(&state, &target, true).await?;
    info!("[ADMIN] {} promoted {}", admin.username, target);
    Ok(AdminResponse::done(admin, format!("User '{target}' is now an admin.")))
}

pub async fn demote_user(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<UserRequest>,
) -> ApiResult<Json<AdminResponse>> {
    let target = existing_user(&state, &payload.username).await?;
    if target.eq_ignore_ascii_case(&admin.username) {
        return Err(ApiError::BadRequest(
            "You cannot demote yourself.".to_string(),
        ));
    }
    set_admin(&state, &target, false).await?;
    info!("[ADMIN] {} demoted {}", admin.username, target);
    Ok(AdminResponse::done(admin, format!("User '{target}' is no longer an admin.")))
}

/// Mark an account verified without the emailed token
pub async fn verify_user(
    admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<UserRequest>,
) -> ApiResult<Json<AdminResponse>> {
    let target = existing_user(&state, &payload.username).await?;
    sqlx::query("UPDATE users SET is_verified = 1, verification_token = NULL WHERE username = ?")
        .bind(&target)
        .execute(&state.db)
        .await?;
    info!("[ADMIN] {} verified {}", admin.username, target);
    Ok(AdminResponse::done(admin, format!("User '{target}' verified.")))
}

pub async fn stats(admin: AdminUser, State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let (total_users, admins, verified, total_games): (i64, i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COALESCE(SUM(is_admin), 0),
                COALESCE(SUM(is_verified), 0),
                COALESCE(SUM(games_count), 0)
         FROM users",
    )
    .fetch_one(&state.db)
    .await?;

    let stats = SystemStats {
        total_users,
        admins,
        verified,
        unverified: total_users - verified,
        total_games,
    };
    Ok(Json(json!({ "success": true, "admin": admin.username, "stats": stats })))
}

/// Stored username for `username`, or 404
async fn existing_user(state: &AppState, username: &str) -> ApiResult<String> {
    db::find_by_username(&state.db, username.trim())
        .await?
        .map(|user| user.username)
        .ok_or_else(|| ApiError::NotFound(format!("User '{}' not found.", username.trim())))
}

async fn set_admin(state: &AppState, username: &str, is_admin: bool) -> ApiResult<()> {
    sqlx::query("UPDATE users SET is_admin = ? WHERE username = ?")
        .bind(is_admin)
        .bind(username)
        .execute(&state.db)
        .await?;
    Ok(())
}
