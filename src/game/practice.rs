//! Practice positions
//!
//! A JSON list of named positions a game can start from. A built-in set is
//! compiled in; `practice_file` in the config replaces it. FENs are only
//! checked when a position is picked, so one bad entry does not hide the rest.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{GameError, GameResult};
use crate::game::position::ChessPosition;

const BUILTIN_POSITIONS: &str = include_str!("../../data/practice_positions.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticePosition {
    pub name: String,
    pub fen: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PracticePosition {
    /// Parse the FEN into a playable position
    pub fn position(&self) -> GameResult<ChessPosition> {
        ChessPosition::from_fen(&self.fen)
    }
}

pub fn parse_positions(json: &str) -> GameResult<Vec<PracticePosition>> {
    Ok(serde_json::from_str(json)?)
}

/// Positions from `path`
pub fn load(path: &Path) -> GameResult<Vec<PracticePosition>> {
    let json = fs::read_to_string(path).map_err(|e| GameError::io(path, e))?;
    let positions = parse_positions(&json)?;
    info!("[PRACTICE] Loaded {} positions from {:?}", positions.len(), path);
    Ok(positions)
}

/// Compiled-in positions
pub fn builtin() -> GameResult<Vec<PracticePosition>> {
    parse_positions(BUILTIN_POSITIONS)
}

/// Configured file if given, otherwise the built-in set
pub fn load_configured(path: Option<&Path>) -> GameResult<Vec<PracticePosition>> {
    match path {
        Some(path) => load(path),
        None => builtin(),
    }
}
