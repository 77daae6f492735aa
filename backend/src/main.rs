use anyhow::Context;
use backend::api::{self, AppState};
use backend::config::ServiceConfig;
use backend::db;
use backend::token::TokenKeys;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    info!("[AUTH] Database: {}", config.database_url);

    let pool = db::connect(&config.database_url)
        .await
        .with_context(|| format!("connecting to {}", config.database_url))?;
    db::init(&pool, &config.admin_password)
        .await
        .context("initializing database schema")?;

    let state = AppState::new(
        pool,
        TokenKeys::new(&config.jwt_secret, config.jwt_expiration_hours),
        config.dev_mode,
    );
    if config.dev_mode {
        info!("[AUTH] Dev mode: registrations are verified automatically");
    }

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    info!("[AUTH] Listening on {}", config.bind_addr);
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
