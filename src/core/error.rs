//! Error types for the console application
//!
//! [`GameError`] covers everything that can go wrong while a game is being
//! played, saved or reconstructed. None of these are fatal: the turn loop and
//! the menus report them and carry on. [`ConfigError`] is the one class that
//! aborts start-up.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in game logic, player dispatch and log handling
#[derive(Error, Debug)]
pub enum GameError {
    /// Input is not coordinate notation (or SAN for human input)
    #[error("Invalid move format: '{input}'")]
    InvalidMoveFormat { input: String },

    /// Move parsed but is not legal in the current position
    #[error("Illegal move {input} in position {fen}")]
    IllegalMove { input: String, fen: String },

    /// A mandatory header tag is absent from a game log
    #[error("Header is missing required tags ({})", missing.join(", "))]
    MissingHeaderTag { missing: Vec<String> },

    /// A tag appears more than once in a game log
    #[error("Duplicate tag '{tag}' on line {line}")]
    DuplicateTag { tag: String, line: usize },

    /// A line of a game log is not one of the known record kinds
    #[error("Malformed log record on line {line}: {text}")]
    MalformedRecord { line: usize, text: String },

    /// A player key does not resolve in the loaded configuration
    #[error("Player key '{key}' is not in the current configuration")]
    UnknownPlayerKey { key: String },

    /// FEN could not be turned into a legal position
    #[error("Invalid position '{fen}': {reason}")]
    InvalidPosition { fen: String, reason: String },

    /// Model reply contained no usable coordinate move
    #[error("AI reply contained no legal move: {reply}")]
    AiParseFailure { reply: String },

    /// Transport or HTTP failure talking to the completion API
    #[error("AI request failed: {message}")]
    AiRequest { message: String },

    /// Engine binary could not be started
    #[error("Chess engine unavailable at '{path}': {reason}")]
    EngineUnavailable { path: String, reason: String },

    /// Engine started but broke the UCI conversation
    #[error("Chess engine error: {message}")]
    Engine { message: String },

    /// Reading or writing a file failed
    #[error("File I/O error on {path:?}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialisation of a data file failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GameError {
    /// Wrap an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GameError::FileIo {
            path: path.into(),
            source,
        }
    }

    /// Errors that a human player should simply retry
    pub fn is_move_rejection(&self) -> bool {
        matches!(
            self,
            GameError::InvalidMoveFormat { .. } | GameError::IllegalMove { .. }
        )
    }
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors raised while loading the start-up configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file exists but cannot be read
    #[error("Config I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::core::config::AppConfig`]
    #[error("Config parse error in {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Config parsed but is inconsistent
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    /// An engine has no display name to write into game logs
    #[error("Engine '{key}' needs a non-empty name")]
    EmptyEngineName { key: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tags_message_lists_all_tags() {
        //! The user-facing message names every missing tag
        let err = GameError::MissingHeaderTag {
            missing: vec!["white_key".to_string(), "black_key".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Header is missing required tags (white_key, black_key)"
        );
    }

    #[test]
    fn test_move_rejections_are_retryable() {
        //! Only format/legality errors count as human-retryable rejections
        assert!(GameError::InvalidMoveFormat {
            input: "zz".into()
        }
        .is_move_rejection());
        assert!(!GameError::UnknownPlayerKey { key: "x9".into() }.is_move_rejection());
    }
}
