//! Service settings
//!
//! Read once at startup from the environment (after `.env` is loaded).

use std::net::SocketAddr;

use anyhow::Context;
use tracing::warn;

const DEFAULT_DATABASE_URL: &str = "sqlite:users.db";
const DEFAULT_SECRET: &str = "chess-app-secret-key-change-in-production";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8002";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    /// Registrations are verified immediately
    pub dev_mode: bool,
    pub bind_addr: SocketAddr,
    /// Password for the default `admin` account when it is created
    pub admin_password: String,
}

impl ServiceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET_KEY").unwrap_or_else(|_| {
            warn!("[CONFIG] JWT_SECRET_KEY not set, using the built-in development secret");
            DEFAULT_SECRET.to_string()
        });

        let jwt_expiration_hours = match std::env::var("JWT_EXPIRATION_HOURS") {
            Ok(value) => value
                .trim()
                .parse()
                .context("invalid JWT_EXPIRATION_HOURS")?,
            Err(_) => 24,
        };

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("invalid BIND_ADDR")?;

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours,
            dev_mode: std::env::var("CHESS_DEV_MODE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            bind_addr,
            admin_password: std::env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string()),
        })
    }
}
