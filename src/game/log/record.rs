//! Game log record grammar
//!
//! A game log is UTF-8 text with exactly one typed record per line:
//!
//! ```text
//! [White "Alice"]
//! [White_Key "hu"]
//! 1. Alice: e4 (e2e4) FEN: rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1
//! ```
//!
//! Blank lines carry nothing. Any other line is rejected, so a log can be
//! read back without guessing.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::error::{GameError, GameResult};
use crate::game::position::AppliedMove;

static TAG_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\[([A-Za-z][A-Za-z0-9_]*)\s+"((?:[^"\\]|\\.)*)"\]$"#).expect("valid regex")
});

/// The player group is greedy: a name may itself contain `: x (e2e4) FEN: `,
/// so the record splits on the last such separator. FENs never contain `:`.
static MOVE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.\s+(.+):\s+(\S+)\s+\(([a-h][1-8][a-h][1-8][qrbn]?)\)\s+FEN:\s+(.+)$")
        .expect("valid regex")
});

/// Tag names as written, in header order
pub mod tags {
    pub const EVENT: &str = "Event";
    pub const DATE: &str = "Date";
    pub const WHITE: &str = "White";
    pub const BLACK: &str = "Black";
    pub const WHITE_KEY: &str = "White_Key";
    pub const BLACK_KEY: &str = "Black_Key";
    pub const WHITE_STRATEGY: &str = "White_Strategy";
    pub const BLACK_STRATEGY: &str = "Black_Strategy";
    pub const FEN: &str = "FEN";
    pub const RESULT: &str = "Result";
    pub const TERMINATION: &str = "Termination";

    /// Tags a log must carry, normalised
    pub const REQUIRED: [&str; 4] = ["white", "black", "white_key", "black_key"];

    /// Tags that may follow move records, normalised
    pub const FOOTER: [&str; 2] = ["result", "termination"];

    /// Every tag the reader accepts, normalised
    pub const KNOWN: [&str; 11] = [
        "event",
        "date",
        "white",
        "black",
        "white_key",
        "black_key",
        "white_strategy",
        "black_strategy",
        "fen",
        "result",
        "termination",
    ];
}

/// One half-move as it appears in the log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Fullmove number
    pub number: u32,
    /// Display name of the mover
    pub player: String,
    pub san: String,
    pub uci: String,
    /// Position after the move
    pub fen: String,
}

impl MoveRecord {
    pub fn from_applied(applied: &AppliedMove, player: &str) -> Self {
        Self {
            number: applied.move_number,
            player: player.to_string(),
            san: applied.san.clone(),
            uci: applied.uci.clone(),
            fen: applied.fen_after.clone(),
        }
    }
}

/// A single parsed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// `[Name "Value"]`, with the name kept as written
    Tag { name: String, value: String },
    /// `N. Player: SAN (UCI) FEN: <fen>`
    Move(MoveRecord),
}

impl LogRecord {
    pub fn tag(name: &str, value: impl Into<String>) -> Self {
        LogRecord::Tag {
            name: name.to_string(),
            value: value.into(),
        }
    }

    /// Parse one line; `Ok(None)` for blank lines
    ///
    /// `line_no` is 1-based and only used for error reporting.
    pub fn parse(line: &str, line_no: usize) -> GameResult<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        if let Some(caps) = TAG_LINE.captures(line) {
            return Ok(Some(LogRecord::Tag {
                name: caps[1].to_string(),
                value: unescape(&caps[2]),
            }));
        }

        if let Some(caps) = MOVE_LINE.captures(line) {
            let number = caps[1].parse().map_err(|_| malformed(line, line_no))?;
            return Ok(Some(LogRecord::Move(MoveRecord {
                number,
                player: caps[2].trim().to_string(),
                san: caps[3].to_string(),
                uci: caps[4].to_string(),
                fen: caps[5].trim().to_string(),
            })));
        }

        Err(malformed(line, line_no))
    }

    /// Render as a single log line
    pub fn to_line(&self) -> String {
        match self {
            LogRecord::Tag { name, value } => format!("[{name} \"{}\"]", escape(value)),
            LogRecord::Move(m) => format!(
                "{}. {}: {} ({}) FEN: {}",
                m.number, m.player, m.san, m.uci, m.fen
            ),
        }
    }
}

/// Lower-case a tag name for lookup
pub fn normalize_tag(name: &str) -> String {
    name.to_ascii_lowercase()
}

fn malformed(line: &str, line_no: usize) -> GameError {
    GameError::MalformedRecord {
        line: line_no,
        text: line.to_string(),
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}
