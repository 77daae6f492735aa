//! Strict game log reader and session reconstruction
//!
//! Reading happens in two passes. [`parse_log`] applies the record grammar
//! and the ordering rules; it knows nothing about configuration and is what
//! the archive uses for summaries. [`reconstruct`] then checks the header
//! against the current [`PlayerRegistry`] and works out where the game
//! resumes.
//!
//! # Ordering Rules
//!
//! - Header tags come first, then move records, then footer tags
//! - Only `Result` and `Termination` may follow a move record
//! - Nothing may follow the footer except more footer tags
//! - Every tag appears at most once
//!
//! # Resumed Position
//!
//! The FEN of the last move record, in file order. A log with no moves
//! resumes from its `FEN` header tag, or the standard start without one.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::core::error::{GameError, GameResult};
use crate::game::log::record::{normalize_tag, tags, LogRecord, MoveRecord};
use crate::game::log::GameHeader;
use crate::game::outcome::GameOutcome;
use crate::game::players::{PlayerFactory, PlayerKind, PlayerRegistry};
use crate::game::position::ChessPosition;
use crate::game::session::{Seat, Session};

/// Grammar-level view of a log file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLog {
    /// Tag values keyed by normalised name
    pub tags: BTreeMap<String, String>,
    pub moves: Vec<MoveRecord>,
}

impl ParsedLog {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(&normalize_tag(name)).map(String::as_str)
    }

    /// Header block, failing if any required tag is absent
    pub fn header(&self) -> GameResult<GameHeader> {
        let missing: Vec<String> = tags::REQUIRED
            .iter()
            .filter(|tag| !self.tags.contains_key(**tag))
            .map(|tag| tag.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(GameError::MissingHeaderTag { missing });
        }

        let get = |name: &str| self.tag(name).unwrap_or_default().to_string();
        Ok(GameHeader {
            event: get(tags::EVENT),
            date: get(tags::DATE),
            white: get(tags::WHITE),
            black: get(tags::BLACK),
            white_key: get(tags::WHITE_KEY),
            black_key: get(tags::BLACK_KEY),
            white_strategy: self.tag(tags::WHITE_STRATEGY).map(str::to_string),
            black_strategy: self.tag(tags::BLACK_STRATEGY).map(str::to_string),
            initial_fen: self.tag(tags::FEN).map(str::to_string),
        })
    }

    /// A `Result` tag marks the game as over
    pub fn is_finished(&self) -> bool {
        self.tags.contains_key("result")
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        GameOutcome::from_tags(
            self.tag(tags::RESULT)?,
            self.tag(tags::TERMINATION).unwrap_or_default(),
        )
    }

    /// Position the game continues from
    pub fn resumed_fen(&self) -> String {
        self.moves
            .last()
            .map(|m| m.fen.clone())
            .or_else(|| self.tag(tags::FEN).map(str::to_string))
            .unwrap_or_else(|| ChessPosition::new().fen())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    Moves,
    Footer,
}

/// Apply the record grammar and ordering rules to a whole file
pub fn parse_log(text: &str) -> GameResult<ParsedLog> {
    let mut parsed = ParsedLog::default();
    let mut section = Section::Header;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let Some(record) = LogRecord::parse(raw, line_no)? else {
            continue;
        };
        let misplaced = || GameError::MalformedRecord {
            line: line_no,
            text: raw.trim().to_string(),
        };

        match record {
            LogRecord::Tag { name, value } => {
                let key = normalize_tag(&name);
                if !tags::KNOWN.contains(&key.as_str()) {
                    return Err(misplaced());
                }
                let is_footer = tags::FOOTER.contains(&key.as_str());
                if section != Section::Header && !is_footer {
                    return Err(misplaced());
                }
                if parsed.tags.contains_key(&key) {
                    return Err(GameError::DuplicateTag {
                        tag: name,
                        line: line_no,
                    });
                }
                if is_footer {
                    section = Section::Footer;
                }
                parsed.tags.insert(key, value);
            }
            LogRecord::Move(record) => {
                if section == Section::Footer {
                    return Err(misplaced());
                }
                section = Section::Moves;
                parsed.moves.push(record);
            }
        }
    }

    debug!(
        "[LOG] Parsed {} tags and {} moves",
        parsed.tags.len(),
        parsed.moves.len()
    );
    Ok(parsed)
}

/// A log checked against the current configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGame {
    pub header: GameHeader,
    pub moves: Vec<MoveRecord>,
    pub resumed_fen: String,
    /// Present when the log carries a recognised footer
    pub outcome: Option<GameOutcome>,
    pub white_kind: PlayerKind,
    pub black_kind: PlayerKind,
}

/// Rebuild a game from log text
///
/// Fails with `MissingHeaderTag` if any of `white`, `black`, `white_key`,
/// `black_key` is absent and with `UnknownPlayerKey` if a key is not
/// configured. The result is a fresh value; no existing session is touched.
pub fn reconstruct(text: &str, registry: &PlayerRegistry) -> GameResult<ParsedGame> {
    let parsed = parse_log(text)?;
    let header = parsed.header()?;

    let white_kind = registry.resolve(&header.white_key)?.kind.clone();
    let black_kind = registry.resolve(&header.black_key)?.kind.clone();

    if let Some(fen) = &header.initial_fen {
        ChessPosition::from_fen(fen)?;
    }
    for record in &parsed.moves {
        ChessPosition::from_fen(&record.fen)?;
    }
    let resumed_fen = parsed.resumed_fen();
    ChessPosition::from_fen(&resumed_fen)?;

    info!(
        "[LOG] Reconstructed {} ({}) vs {} ({}) after {} half-moves",
        header.white,
        header.white_key,
        header.black,
        header.black_key,
        parsed.moves.len()
    );

    Ok(ParsedGame {
        outcome: parsed.outcome(),
        moves: parsed.moves,
        resumed_fen,
        header,
        white_kind,
        black_kind,
    })
}

impl ParsedGame {
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Build a playable session from the log
    ///
    /// Display names come from the header, so humans keep their names.
    pub fn into_session(self, factory: &PlayerFactory) -> GameResult<Session> {
        let white = factory.create(&self.header.white_key, Some(&self.header.white))?;
        let black = factory.create(&self.header.black_key, Some(&self.header.black))?;

        let initial_fen = self
            .header
            .initial_fen
            .clone()
            .unwrap_or_else(|| ChessPosition::new().fen());

        Session::resume(
            Seat::new(white, self.header.white_strategy.clone()),
            Seat::new(black, self.header.black_strategy.clone()),
            &initial_fen,
            self.moves,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;

    const E4_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

    fn registry() -> PlayerRegistry {
        PlayerRegistry::from_config(&AppConfig::default())
    }

    fn header_lines() -> String {
        "[White \"A\"]\n[Black \"B\"]\n[White_Key \"hu\"]\n[Black_Key \"s1\"]\n".to_string()
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        let parsed = parse_log("[WHITE \"A\"]\n[black_key \"s1\"]\n").expect("valid");
        assert_eq!(parsed.tag("White"), Some("A"));
        assert_eq!(parsed.tag("Black_Key"), Some("s1"));
    }

    #[test]
    fn test_duplicate_tag_rejected() {
        //! The same tag twice is an error, not "last one wins"
        let text = format!("{}[White \"C\"]\n", header_lines());
        let err = parse_log(&text).unwrap_err();
        assert!(matches!(err, GameError::DuplicateTag { line: 5, .. }));
    }

    #[test]
    fn test_header_tag_after_moves_rejected() {
        let text = format!("[White \"A\"]\n1. A: e4 (e2e4) FEN: {E4_FEN}\n[Black \"B\"]\n");
        let err = parse_log(&text).unwrap_err();
        assert!(matches!(err, GameError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn test_move_after_footer_rejected() {
        let text = format!("{}[Result \"1-0\"]\n1. A: e4 (e2e4) FEN: {E4_FEN}\n", header_lines());
        assert!(matches!(
            parse_log(&text).unwrap_err(),
            GameError::MalformedRecord { .. }
        ));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = parse_log("[Opening \"Sicilian\"]\n").unwrap_err();
        assert!(matches!(err, GameError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let text = header_lines().replace("s1", "x7");
        let err = reconstruct(&text, &registry()).unwrap_err();
        assert!(matches!(err, GameError::UnknownPlayerKey { key } if key == "x7"));
    }

    #[test]
    fn test_no_moves_resumes_from_header_fen() {
        let fen = "8/8/8/4k3/8/8/4P3/4K3 w - - 0 1";
        let text = format!("{}[FEN \"{fen}\"]\n", header_lines());
        let game = reconstruct(&text, &registry()).expect("valid");
        assert_eq!(game.resumed_fen, fen);
        assert!(!game.is_finished());
    }

    #[test]
    fn test_no_moves_no_fen_is_start() {
        let game = reconstruct(&header_lines(), &registry()).expect("valid");
        assert_eq!(game.resumed_fen, ChessPosition::new().fen());
    }

    #[test]
    fn test_bad_fen_in_move_rejected() {
        let text = format!("{}1. A: e4 (e2e4) FEN: not/a/fen w - - 0 1\n", header_lines());
        let err = reconstruct(&text, &registry()).unwrap_err();
        assert!(matches!(err, GameError::InvalidPosition { .. }));
    }

    #[test]
    fn test_footer_becomes_outcome() {
        let text = format!(
            "{}[Result \"0-1\"]\n[Termination \"forfeit\"]\n",
            header_lines()
        );
        let game = reconstruct(&text, &registry()).expect("valid");
        assert_eq!(
            game.outcome,
            Some(GameOutcome::Forfeit {
                loser: shakmaty::Color::White
            })
        );
    }
}
