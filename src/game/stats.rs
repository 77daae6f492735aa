//! Player statistics persisted as JSON
//!
//! Stats are keyed by display name and stored as pretty JSON
//! (`player_stats.json` in the log directory). A missing or corrupt file
//! loads as an empty book, so a bad stats file never blocks a game.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shakmaty::Color;
use tracing::{info, warn};

use crate::core::error::{GameError, GameResult};
use crate::game::outcome::GameOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl PlayerStats {
    pub fn games(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsBook {
    path: PathBuf,
    players: BTreeMap<String, PlayerStats>,
}

impl StatsBook {
    /// Load from `path`, starting empty if it is missing or unreadable
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let players = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str(&contents) {
                    Ok(players) => {
                        info!("[STATS] Loaded player stats from {:?}", path);
                        players
                    }
                    Err(e) => {
                        warn!("[STATS] Failed to parse {:?}: {}. Starting empty.", path, e);
                        BTreeMap::new()
                    }
                },
                Err(e) => {
                    warn!("[STATS] Failed to read {:?}: {}. Starting empty.", path, e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Self { path, players }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, name: &str) -> Option<&PlayerStats> {
        self.players.get(name)
    }

    /// All players in name order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PlayerStats)> {
        self.players.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Credit a finished game to both players
    pub fn record(&mut self, white: &str, black: &str, outcome: &GameOutcome) {
        match outcome.winner() {
            Some(Color::White) => {
                self.entry(white).wins += 1;
                self.entry(black).losses += 1;
            }
            Some(Color::Black) => {
                self.entry(black).wins += 1;
                self.entry(white).losses += 1;
            }
            None => {
                self.entry(white).draws += 1;
                self.entry(black).draws += 1;
            }
        }
    }

    pub fn save(&self) -> GameResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GameError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&self.players)?;
        fs::write(&self.path, json).map_err(|e| GameError::io(&self.path, e))?;
        info!("[STATS] Saved player stats to {:?}", self.path);
        Ok(())
    }

    fn entry(&mut self, name: &str) -> &mut PlayerStats {
        self.players.entry(name.to_string()).or_default()
    }
}
