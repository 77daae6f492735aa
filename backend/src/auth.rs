//! Account endpoints
//!
//! Refusals (bad password, taken username) are ordinary `200` answers with
//! `success: false`; only server faults use error statuses.

use axum::{
    extract::{Json, State},
    http::{header::AUTHORIZATION, HeaderMap},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::AppState;
use crate::db::{self, NewUser};
use crate::error::ApiResult;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Default, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_token: Option<String>,
}

impl AuthResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

const BAD_LOGIN: &str = "Invalid username or password.";
const BAD_TOKEN: &str = "Invalid or expired token.";

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let username = payload.username.trim().to_lowercase();
    let email = payload.email.trim();
    if username.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Ok(Json(AuthResponse::refused(
            "Username, email and password are required.",
        )));
    }

    if db::find_by_username(&state.db, &username).await?.is_some() {
        return Ok(Json(AuthResponse::refused("Username already exists.")));
    }
    if db::find_by_email(&state.db, email).await?.is_some() {
        return Ok(Json(AuthResponse::refused("Email already registered.")));
    }

    let verification_token = db::verification_token();
    db::insert_user(
        &state.db,
        &NewUser {
            username: &username,
            email,
            password: &payload.password,
            is_admin: false,
            is_verified: state.dev_mode,
            verification_token: Some(&verification_token),
        },
    )
    .await?;
    info!("[AUTH] Registered {}", username);

    if state.dev_mode {
        return Ok(Json(AuthResponse {
            verification_token: Some(verification_token),
            ..AuthResponse::ok("Registration successful! (Dev mode: auto-verified)")
        }));
    }
    Ok(Json(AuthResponse::ok(
        "Registration successful! Please check your email for verification.",
    )))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let Some(user) = db::find_by_login(&state.db, payload.username.trim()).await? else {
        return Ok(Json(AuthResponse::refused(BAD_LOGIN)));
    };
    if !db::verify_password(&payload.password, &user.password_hash) {
        info!("[AUTH] Wrong password for {}", user.username);
        return Ok(Json(AuthResponse::refused(BAD_LOGIN)));
    }
    if !user.is_verified {
        return Ok(Json(AuthResponse::refused(
            "Account not verified. Please check your email for the verification link.",
        )));
    }

    let token = state
        .tokens
        .issue(&user.username, user.is_admin, &user.email)?;
    info!("[AUTH] {} logged in", user.username);
    let message = format!("Welcome back, {}!", user.username);
    Ok(Json(AuthResponse {
        token: Some(token),
        username: Some(user.username),
        is_admin: Some(user.is_admin),
        ..AuthResponse::ok(message)
    }))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Json<VerifyResponse> {
    match state.tokens.verify(&payload.token) {
        Some(claims) => Json(VerifyResponse {
            valid: true,
            username: Some(claims.username),
            is_admin: Some(claims.is_admin),
            email: Some(claims.email),
            message: None,
        }),
        None => Json(VerifyResponse {
            message: Some(BAD_TOKEN.to_string()),
            ..VerifyResponse::default()
        }),
    }
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let username: Option<String> = sqlx::query_scalar(
        "UPDATE users SET is_verified = 1, verification_token = NULL
         WHERE verification_token = ? AND is_verified = 0
         RETURNING username",
    )
    .bind(payload.token.trim())
    .fetch_optional(&state.db)
    .await?;

    Ok(Json(match username {
        Some(username) => {
            info!("[AUTH] Verified {}", username);
            AuthResponse::ok(format!(
                "Email verified successfully! You can now login, {username}."
            ))
        }
        None => AuthResponse::refused("Invalid verification token."),
    }))
}

/// Tokens are stateless; the client just forgets its token
pub async fn logout() -> Json<AuthResponse> {
    Json(AuthResponse::ok("Logged out successfully."))
}

pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let Some(token) = bearer_token(&headers) else {
        return Ok(Json(AuthResponse::refused("Authorization required.")));
    };
    let Some(claims) = state.tokens.verify(token) else {
        return Ok(Json(AuthResponse::refused(BAD_TOKEN)));
    };
    let Some(user) = db::find_by_username(&state.db, &claims.username).await? else {
        return Ok(Json(AuthResponse::refused("User not found.")));
    };
    if !db::verify_password(&payload.old_password, &user.password_hash) {
        return Ok(Json(AuthResponse::refused("Current password is incorrect.")));
    }

    let new_hash = db::hash_password(&payload.new_password)?;
    sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(new_hash)
        .bind(&user.id)
        .execute(&state.db)
        .await?;
    info!("[AUTH] {} changed their password", user.username);
    Ok(Json(AuthResponse::ok("Password changed successfully.")))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let Some(claims) = state.tokens.verify(&payload.token) else {
        return Ok(Json(AuthResponse::refused(BAD_TOKEN)));
    };
    let token = state
        .tokens
        .issue(&claims.username, claims.is_admin, &claims.email)?;
    Ok(Json(AuthResponse {
        token: Some(token),
        ..AuthResponse::ok("Token refreshed successfully.")
    }))
}

/// Value of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
