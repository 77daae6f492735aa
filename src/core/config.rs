//! Application configuration loading
//!
//! Loads [`AppConfig`] from a JSON file at start-up. This is the only place
//! where a failure stops the program: a game cannot be set up without knowing
//! which player keys exist.
//!
//! # File Location
//!
//! The first of these that applies is used:
//!
//! 1. An explicit path (the `--config` flag)
//! 2. The `CHESS_ARENA_CONFIG` environment variable
//! 3. `config.json` in the user's configuration directory
//! 4. `config.json` in the working directory
//!
//! Explicit paths must exist. For the implicit locations a missing file means
//! "use the built-in defaults".
//!
//! # Example
//!
//! ```json
//! {
//!   "ai_models": { "m1": "openai/gpt-4o" },
//!   "engine_path": "/usr/local/bin/stockfish",
//!   "engines": {
//!     "s1": { "name": "Stockfish Easy", "parameters": { "Skill Level": 3 }, "movetime_ms": 500 }
//!   },
//!   "no_move_policy": { "kind": "retry", "limit": 3 }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::ConfigError;
use crate::game::turn::NoMovePolicy;

/// Config filename looked up in the implicit locations
const CONFIG_FILENAME: &str = "config.json";

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "CHESS_ARENA_CONFIG";

/// Environment variable overriding the engine binary location
pub const ENGINE_ENV: &str = "STOCKFISH_EXECUTABLE";

/// Player key reserved for the human player
pub const HUMAN_KEY: &str = "hu";

/// Top-level configuration for the console application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Player key → model identifier understood by the completion API
    pub ai_models: BTreeMap<String, String>,

    /// Path to the UCI engine binary (see [`AppConfig::resolved_engine_path`])
    pub engine_path: Option<String>,

    /// Player key → engine settings
    pub engines: BTreeMap<String, EngineSettings>,

    /// Completion API settings shared by every AI player
    pub ai: AiSettings,

    /// Model used by the chess expert Q&A
    pub expert_model: String,

    /// Base URL of the auth service
    pub auth_service_url: String,

    /// Ask for a login before the main menu
    pub require_login: bool,

    /// Directory for game logs, stats and `debug.log`
    pub log_dir: PathBuf,

    /// Directory for the expert's markdown answer file
    pub docs_dir: PathBuf,

    /// JSON list of practice positions
    pub practice_file: Option<PathBuf>,

    /// What happens when an AI or engine produces no move
    pub no_move_policy: NoMovePolicy,
}

/// Settings for one engine-backed player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Display name
    pub name: String,

    /// UCI options sent with `setoption` before the first search
    #[serde(default)]
    pub parameters: BTreeMap<String, serde_json::Value>,

    /// Fixed thinking time per move, passed as `go movetime`
    #[serde(default = "default_movetime_ms")]
    pub movetime_ms: u64,
}

fn default_movetime_ms() -> u64 {
    1500
}

impl EngineSettings {
    /// Convenience constructor used by the built-in table and tests
    pub fn new(name: &str, skill: u8, movetime_ms: u64) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("Skill Level".to_string(), serde_json::Value::from(skill));
        Self {
            name: name.to_string(),
            parameters,
            movetime_ms,
        }
    }

    /// UCI option pairs with values rendered the way `setoption` expects
    pub fn uci_options(&self) -> Vec<(String, String)> {
        self.parameters
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect()
    }
}

/// Completion API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSettings {
    /// OpenAI-compatible base URL
    pub base_url: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Completion calls per turn before the player gives up
    pub max_attempts: u32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.5,
            max_tokens: 10,
            max_attempts: 1,
        }
    }
}

impl AiSettings {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let ai_models = [
            ("m1", "openai/gpt-4o"),
            ("m2", "deepseek/deepseek-chat-v3.1"),
            ("m3", "google/gemini-1.5-pro"),
            ("m4", "anthropic/claude-3-opus"),
            ("m5", "meta-llama/llama-3-70b-instruct"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let engines = [
            ("s1", EngineSettings::new("Stockfish Easy", 3, 500)),
            ("s2", EngineSettings::new("Stockfish Medium", 10, 1500)),
            ("s3", EngineSettings::new("Stockfish Hard", 20, 3000)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            ai_models,
            engine_path: None,
            engines,
            ai: AiSettings::default(),
            expert_model: "openai/gpt-4o".to_string(),
            auth_service_url: "http://localhost:8002".to_string(),
            require_login: false,
            log_dir: PathBuf::from("logs"),
            docs_dir: PathBuf::from("docs"),
            practice_file: None,
            no_move_policy: NoMovePolicy::default(),
        }
    }
}

impl AppConfig {
    /// Load and validate the configuration
    ///
    /// `explicit` is the `--config` flag, if given.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match std::env::var_os(CONFIG_ENV) {
                Some(path) => (PathBuf::from(path), true),
                None => (default_config_path(), false),
            },
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::Io {
                    path,
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "config file not found",
                    ),
                });
            }
            info!("[CONFIG] No config file at {:?}. Using defaults.", path);
            return Ok(Self::default());
        }

        let config = Self::from_file(&path)?;
        info!("[CONFIG] Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Parse and validate a specific file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations whose player keys would be ambiguous
    pub fn validate(&self) -> Result<(), ConfigError> {
        for key in self.ai_models.keys().chain(self.engines.keys()) {
            if key.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: "player keys must not be empty".to_string(),
                });
            }
            if key == HUMAN_KEY {
                return Err(ConfigError::Invalid {
                    message: format!("'{HUMAN_KEY}' is reserved for the human player"),
                });
            }
        }

        if let Some(key) = self
            .ai_models
            .keys()
            .find(|key| self.engines.contains_key(*key))
        {
            return Err(ConfigError::Invalid {
                message: format!("player key '{key}' is defined as both AI model and engine"),
            });
        }

        if let Some((key, _)) = self
            .ai_models
            .iter()
            .find(|(_, model)| model.trim().is_empty())
        {
            return Err(ConfigError::Invalid {
                message: format!("AI model for key '{key}' is empty"),
            });
        }

        if let Some((key, _)) = self
            .engines
            .iter()
            .find(|(_, settings)| settings.name.trim().is_empty())
        {
            return Err(ConfigError::EmptyEngineName { key: key.clone() });
        }

        if self.ai.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                message: "ai.max_attempts must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Engine binary: `STOCKFISH_EXECUTABLE`, then `engine_path`, then `stockfish`
    pub fn resolved_engine_path(&self) -> String {
        std::env::var(ENGINE_ENV)
            .ok()
            .filter(|path| !path.trim().is_empty())
            .or_else(|| self.engine_path.clone())
            .unwrap_or_else(|| "stockfish".to_string())
    }

    /// Location of the player statistics file
    pub fn stats_path(&self) -> PathBuf {
        self.log_dir.join("player_stats.json")
    }
}

/// Resolve the implicit config path
///
/// Prefers the user's configuration directory, falling back to the working
/// directory when neither exists there.
fn default_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "trilltino", "ChessArena") {
        let candidate = proj_dirs.config_dir().join(CONFIG_FILENAME);
        if candidate.exists() {
            return candidate;
        }
    } else {
        warn!("[CONFIG] Could not determine the user configuration directory");
    }
    PathBuf::from(CONFIG_FILENAME)
}
