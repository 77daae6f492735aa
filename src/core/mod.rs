//! Core module - application infrastructure
//!
//! - [`config`] - start-up configuration ([`AppConfig`])
//! - [`error`] - error taxonomy ([`GameError`], [`ConfigError`])
//! - [`logging`] - diagnostic tracing setup
//! - [`palette`] - console formatting context

pub mod config;
pub mod error;
pub mod logging;
pub mod palette;

pub use config::{AiSettings, AppConfig, EngineSettings, HUMAN_KEY};
pub use error::{ConfigError, GameError, GameResult};
pub use logging::{init_tracing, startup_subscriber, LoggingOptions};
pub use palette::Palette;
