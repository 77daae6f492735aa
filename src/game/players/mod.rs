//! Players: humans, AI models and UCI engines
//!
//! Player kinds are resolved once, when the configuration is turned into a
//! [`PlayerRegistry`]. Everything downstream works with [`PlayerKind`] and the
//! [`Player`] trait and never inspects key text.
//!
//! # Move Acquisition
//!
//! [`Player::get_move`] is the single call the turn loop makes for every
//! player kind:
//!
//! - [`HumanPlayer`] reads the console itself
//! - [`AiPlayer`] asks a chat-completion model
//! - [`EngineBackedPlayer`] asks a UCI engine process

pub mod ai;
pub mod engine;
pub mod human;

use std::collections::BTreeMap;
use std::rc::Rc;

use shakmaty::Color;

use crate::core::config::{AiSettings, AppConfig, EngineSettings, HUMAN_KEY};
use crate::core::error::{GameError, GameResult};
use crate::game::position::ChessPosition;
use crate::networking::completion::CompletionClient;
use crate::ui::console::Console;

pub use ai::{extract_uci_move, AiPlayer};
pub use engine::{EngineBackedPlayer, EngineBackend, EngineLauncher, ProcessLauncher, UciEngine};
pub use human::HumanPlayer;

/// What a player decided to do on its turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    /// A move in coordinate notation (SAN is tolerated from humans)
    Move(String),
    /// The player could not produce a move
    NoMove,
    /// Open the in-game menu
    Menu,
    /// Leave the game
    Quit,
}

/// Everything a player may look at when choosing a move
#[derive(Debug, Clone, Copy)]
pub struct MoveContext<'a> {
    pub position: &'a ChessPosition,
    /// Opening strategy for the side to move, if one applies this turn
    pub strategy: Option<&'a str>,
    pub color: Color,
}

/// How a player key produces moves
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerKind {
    Human,
    Ai { model: String },
    Engine(EngineSettings),
}

impl PlayerKind {
    pub fn is_human(&self) -> bool {
        matches!(self, PlayerKind::Human)
    }

    /// Short kind label for menus and logs
    pub fn describe(&self) -> &'static str {
        match self {
            PlayerKind::Human => "human",
            PlayerKind::Ai { .. } => "AI model",
            PlayerKind::Engine(_) => "engine",
        }
    }
}

/// A configured player key
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSpec {
    pub key: String,
    /// Default display name
    pub label: String,
    pub kind: PlayerKind,
}

/// Player keys known to the current configuration
///
/// `hu` is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRegistry {
    specs: BTreeMap<String, PlayerSpec>,
}

impl PlayerRegistry {
    pub fn from_config(config: &AppConfig) -> Self {
        let mut specs = BTreeMap::new();
        specs.insert(
            HUMAN_KEY.to_string(),
            PlayerSpec {
                key: HUMAN_KEY.to_string(),
                label: "Human".to_string(),
                kind: PlayerKind::Human,
            },
        );
        for (key, model) in &config.ai_models {
            specs.insert(
                key.clone(),
                PlayerSpec {
                    key: key.clone(),
                    label: model.clone(),
                    kind: PlayerKind::Ai {
                        model: model.clone(),
                    },
                },
            );
        }
        for (key, settings) in &config.engines {
            specs.insert(
                key.clone(),
                PlayerSpec {
                    key: key.clone(),
                    label: settings.name.clone(),
                    kind: PlayerKind::Engine(settings.clone()),
                },
            );
        }
        Self { specs }
    }

    pub fn get(&self, key: &str) -> Option<&PlayerSpec> {
        self.specs.get(key)
    }

    /// Look up a key, failing with `UnknownPlayerKey`
    pub fn resolve(&self, key: &str) -> GameResult<&PlayerSpec> {
        self.get(key).ok_or_else(|| GameError::UnknownPlayerKey {
            key: key.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.specs.contains_key(key)
    }

    /// Specs in key order
    pub fn iter(&self) -> impl Iterator<Item = &PlayerSpec> {
        self.specs.values()
    }
}

/// A participant in a game
pub trait Player {
    /// Display name
    fn name(&self) -> &str;

    /// Configuration key this player was created from
    fn key(&self) -> &str;

    fn kind(&self) -> &PlayerKind;

    /// Produce this player's action for the current turn
    fn get_move(
        &mut self,
        ctx: &MoveContext<'_>,
        console: &mut dyn Console,
    ) -> GameResult<PlayerAction>;

    fn is_human(&self) -> bool {
        self.kind().is_human()
    }
}

/// Builds [`Player`]s from registry keys
pub struct PlayerFactory {
    registry: PlayerRegistry,
    ai: AiSettings,
    completion: Rc<dyn CompletionClient>,
    launcher: Rc<dyn EngineLauncher>,
}

impl PlayerFactory {
    pub fn new(
        registry: PlayerRegistry,
        ai: AiSettings,
        completion: Rc<dyn CompletionClient>,
        launcher: Rc<dyn EngineLauncher>,
    ) -> Self {
        Self {
            registry,
            ai,
            completion,
            launcher,
        }
    }

    pub fn registry(&self) -> &PlayerRegistry {
        &self.registry
    }

    /// Create the player for `key`
    ///
    /// `name_override` replaces the default display name; it is how human
    /// names from a saved log are restored.
    pub fn create(&self, key: &str, name_override: Option<&str>) -> GameResult<Box<dyn Player>> {
        let spec = self.registry.resolve(key)?;
        let name = name_override
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&spec.label)
            .to_string();

        let player: Box<dyn Player> = match &spec.kind {
            PlayerKind::Human => Box::new(HumanPlayer::new(key, name)),
            PlayerKind::Ai { model } => Box::new(AiPlayer::new(
                key,
                name,
                model.clone(),
                self.ai.clone(),
                Rc::clone(&self.completion),
            )),
            PlayerKind::Engine(settings) => Box::new(EngineBackedPlayer::new(
                key,
                name,
                settings.clone(),
                Rc::clone(&self.launcher),
            )),
        };
        Ok(player)
    }
}
