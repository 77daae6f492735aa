//! Saved game archive
//!
//! Games live as plain log files in one directory:
//!
//! - `chess_game.log` - the log of the game being played, rewritten on exit
//! - `chess_game_YYYYMMDD_HHMMSS.log` - explicitly saved games
//!
//! Summaries are built with the strict reader; files that do not parse are
//! skipped with a warning rather than failing the listing.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use tracing::{info, warn};

use crate::core::error::{GameError, GameResult};
use crate::game::log::record::tags;
use crate::game::log::{parse_log, GameLog};

/// Log of the game in progress
pub const ACTIVE_LOG: &str = "chess_game.log";

static SAVED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^chess_game_(\d{4})(\d{2})(\d{2})_(\d{2})(\d{2})(\d{2})(?:_\d+)?\.log$")
        .expect("valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Finished,
    InProgress,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Finished => write!(f, "Finished"),
            GameStatus::InProgress => write!(f, "In Progress"),
        }
    }
}

/// One line of the saved games list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub path: PathBuf,
    pub filename: String,
    /// `YYYY-MM-DD HH:MM`, taken from the filename
    pub date: String,
    pub white: String,
    pub black: String,
    pub status: GameStatus,
    /// Half-moves recorded
    pub moves: usize,
}

#[derive(Debug, Clone)]
pub struct GameArchive {
    dir: PathBuf,
}

impl GameArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_LOG)
    }

    /// Save under a timestamped name
    pub fn save(&self, log: &GameLog) -> GameResult<PathBuf> {
        self.save_at(log, Local::now().naive_local())
    }

    /// Save with an explicit timestamp
    ///
    /// A clash with an existing file gets a numeric suffix.
    pub fn save_at(&self, log: &GameLog, timestamp: NaiveDateTime) -> GameResult<PathBuf> {
        let stem = format!("chess_game_{}", timestamp.format("%Y%m%d_%H%M%S"));
        let mut path = self.dir.join(format!("{stem}.log"));
        let mut suffix = 1;
        while path.exists() {
            path = self.dir.join(format!("{stem}_{suffix}.log"));
            suffix += 1;
        }
        log.write_to(&path)?;
        info!("[ARCHIVE] Game saved as {:?}", path);
        Ok(path)
    }

    /// Rewrite the active game log
    pub fn write_active(&self, log: &GameLog) -> GameResult<PathBuf> {
        let path = self.active_path();
        log.write_to(&path)?;
        Ok(path)
    }

    pub fn read(&self, path: &Path) -> GameResult<String> {
        fs::read_to_string(path).map_err(|e| GameError::io(path, e))
    }

    /// Saved games, newest first
    pub fn summaries(&self) -> GameResult<Vec<GameSummary>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GameError::io(&self.dir, e)),
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| SAVED_NAME.is_match(name))
            .collect();
        names.sort_unstable_by(|a, b| b.cmp(a));

        let mut summaries = Vec::with_capacity(names.len());
        for filename in names {
            let path = self.dir.join(&filename);
            match self.summarize(&path, &filename) {
                Ok(summary) => summaries.push(summary),
                Err(err) => warn!("[ARCHIVE] Skipping {:?}: {}", path, err),
            }
        }
        Ok(summaries)
    }

    fn summarize(&self, path: &Path, filename: &str) -> GameResult<GameSummary> {
        let parsed = parse_log(&self.read(path)?)?;
        let tag_or_na = |name: &str| parsed.tag(name).unwrap_or("N/A").to_string();

        Ok(GameSummary {
            path: path.to_path_buf(),
            filename: filename.to_string(),
            date: date_from_filename(filename).unwrap_or_else(|| "N/A".to_string()),
            white: tag_or_na(tags::WHITE),
            black: tag_or_na(tags::BLACK),
            status: if parsed.is_finished() {
                GameStatus::Finished
            } else {
                GameStatus::InProgress
            },
            moves: parsed.moves.len(),
        })
    }
}

/// `YYYY-MM-DD HH:MM` from a saved game filename
pub fn date_from_filename(filename: &str) -> Option<String> {
    let caps = SAVED_NAME.captures(filename)?;
    Some(format!(
        "{}-{}-{} {}:{}",
        &caps[1], &caps[2], &caps[3], &caps[4], &caps[5]
    ))
}
