//! Game log: the persisted record of a game
//!
//! - [`record`] - line grammar ([`LogRecord`], [`MoveRecord`])
//! - [`writer`] - append-only [`GameLog`] buffer
//! - [`reader`] - strict parser and session reconstruction ([`reconstruct`])

pub mod reader;
pub mod record;
pub mod writer;

pub use reader::{parse_log, reconstruct, ParsedGame, ParsedLog};
pub use record::{LogRecord, MoveRecord};
pub use writer::GameLog;

use record::tags;

/// Header block written once at game start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameHeader {
    pub event: String,
    pub date: String,
    pub white: String,
    pub black: String,
    pub white_key: String,
    pub black_key: String,
    pub white_strategy: Option<String>,
    pub black_strategy: Option<String>,
    /// Position the game started from
    pub initial_fen: Option<String>,
}

impl GameHeader {
    /// Tag records in the order they are written
    pub fn to_records(&self) -> Vec<LogRecord> {
        let mut records = vec![
            LogRecord::tag(tags::EVENT, self.event.clone()),
            LogRecord::tag(tags::DATE, self.date.clone()),
            LogRecord::tag(tags::WHITE, self.white.clone()),
            LogRecord::tag(tags::BLACK, self.black.clone()),
            LogRecord::tag(tags::WHITE_KEY, self.white_key.clone()),
            LogRecord::tag(tags::BLACK_KEY, self.black_key.clone()),
        ];
        if let Some(strategy) = &self.white_strategy {
            records.push(LogRecord::tag(tags::WHITE_STRATEGY, strategy.clone()));
        }
        if let Some(strategy) = &self.black_strategy {
            records.push(LogRecord::tag(tags::BLACK_STRATEGY, strategy.clone()));
        }
        if let Some(fen) = &self.initial_fen {
            records.push(LogRecord::tag(tags::FEN, fen.clone()));
        }
        records
    }
}
