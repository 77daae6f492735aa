//! Append-only game log buffer
//!
//! The header is written once, then one line per half-move, then the footer
//! when the game ends. Nothing touches the disk until [`GameLog::write_to`]
//! is called, and that write is not atomic.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::core::error::{GameError, GameResult};
use crate::game::log::record::{tags, LogRecord, MoveRecord};
use crate::game::log::GameHeader;
use crate::game::outcome::GameOutcome;
use crate::game::position::AppliedMove;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameLog {
    lines: Vec<String>,
    moves: usize,
    finished: bool,
}

impl GameLog {
    /// New log containing just the header
    pub fn start(header: &GameHeader) -> Self {
        let lines = header.to_records().iter().map(LogRecord::to_line).collect();
        Self {
            lines,
            moves: 0,
            finished: false,
        }
    }

    /// Log for a resumed game: header plus the moves already played
    pub fn resume(header: &GameHeader, history: &[MoveRecord]) -> Self {
        let mut log = Self::start(header);
        for record in history {
            log.push_move(record.clone());
        }
        log
    }

    /// Append one half-move line
    pub fn append_move(&mut self, applied: &AppliedMove, player: &str) {
        self.push_move(MoveRecord::from_applied(applied, player));
    }

    /// Append the `Result` and `Termination` footer
    ///
    /// Only the first call has an effect.
    pub fn finish(&mut self, outcome: &GameOutcome) {
        if self.finished {
            return;
        }
        self.lines
            .push(LogRecord::tag(tags::RESULT, outcome.result()).to_line());
        self.lines
            .push(LogRecord::tag(tags::TERMINATION, outcome.termination()).to_line());
        self.finished = true;
        debug!("[LOG] Footer written: {}", outcome.result());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn move_count(&self) -> usize {
        self.moves
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whole log as text, newline-terminated
    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Flush the buffer to `path`, replacing any existing file
    pub fn write_to(&self, path: &Path) -> GameResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| GameError::io(parent, e))?;
        }
        fs::write(path, self.to_text()).map_err(|e| GameError::io(path, e))?;
        info!("[LOG] Wrote {} lines to {:?}", self.lines.len(), path);
        Ok(())
    }

    fn push_move(&mut self, record: MoveRecord) {
        self.lines.push(LogRecord::Move(record).to_line());
        self.moves += 1;
    }
}
