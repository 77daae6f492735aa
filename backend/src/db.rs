//! SQLite storage for user accounts

use std::str::FromStr;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::Rng;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_ADMIN: &str = "admin";
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@chess.local";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    is_admin BOOLEAN NOT NULL DEFAULT 0,
    is_verified BOOLEAN NOT NULL DEFAULT 0,
    verification_token TEXT,
    games_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);";

/// One row of `users`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_verified: bool,
    pub verification_token: Option<String>,
    pub games_count: i64,
    pub created_at: String,
}

/// What admins see of an account
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub is_verified: bool,
    pub games_count: i64,
    pub created_at: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            is_admin: user.is_admin,
            is_verified: user.is_verified,
            games_count: user.games_count,
            created_at: user.created_at,
        }
    }
}

pub async fn connect(database_url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create the schema and the default admin account if missing
pub async fn init(pool: &SqlitePool, admin_password: &str) -> ApiResult<()> {
    sqlx::query(SCHEMA).execute(pool).await?;

    if find_by_username(pool, DEFAULT_ADMIN).await?.is_none() {
        insert_user(
            pool,
            &NewUser {
                username: DEFAULT_ADMIN,
                email: DEFAULT_ADMIN_EMAIL,
                password: admin_password,
                is_admin: true,
                is_verified: true,
                verification_token: None,
            },
        )
        .await?;
        info!("[DB] Created default admin user");
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    info!("[DB] {} users in database", count);
    Ok(())
}

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub is_admin: bool,
    pub is_verified: bool,
    pub verification_token: Option<&'a str>,
}

pub async fn insert_user(pool: &SqlitePool, user: &NewUser<'_>) -> ApiResult<()> {
    let password_hash = hash_password(user.password)?;
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, is_admin, is_verified, verification_token)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(uuid::Uuid::new_v4().to_string())
    .bind(user.username)
    .bind(user.email)
    .bind(password_hash)
    .bind(user.is_admin)
    .bind(user.is_verified)
    .bind(user.verification_token)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> ApiResult<Option<User>> {
    Ok(
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER(?)")
            .bind(username)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> ApiResult<Option<User>> {
    Ok(
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER(?)")
            .bind(email)
            .fetch_optional(pool)
            .await?,
    )
}

/// Login lookup: the identifier may be a username or an email
pub async fn find_by_login(pool: &SqlitePool, identifier: &str) -> ApiResult<Option<User>> {
    Ok(sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE LOWER(username) = LOWER(?) OR LOWER(email) = LOWER(?)",
    )
    .bind(identifier)
    .bind(identifier)
    .fetch_optional(pool)
    .await?)
}

pub async fn list_users(pool: &SqlitePool) -> ApiResult<Vec<User>> {
    Ok(
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at, username")
            .fetch_all(pool)
            .await?,
    )
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Hashing(e.to_string()))
}

/// Unparseable hashes count as a mismatch
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// 32 random bytes as lowercase hex
pub fn verification_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-hash"));
    }

    #[test]
    fn test_verification_token_shape() {
        let token = verification_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(token, verification_token());
    }
}
