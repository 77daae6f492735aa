//! Game outcome and result reporting
//!
//! A [`GameOutcome`] is produced once, when the turn loop decides the game has
//! ended. It drives the `Result`/`Termination` footer of the game log, the
//! player statistics and the message shown to the players.
//!
//! # Outcomes
//!
//! ## Decided by the board
//! - **Checkmate**: side to move is in check with no legal moves
//! - **Stalemate**: side to move has no legal moves and is not in check
//! - **InsufficientMaterial**: neither side can deliver mate
//! - **ThreefoldRepetition**: the same position occurred three times
//! - **FiftyMoveRule**: fifty moves by each side without capture or pawn move
//!
//! ## Decided by a player
//! - **Resignation**: a human chose to resign from the quit prompt
//! - **Forfeit**: an AI or engine player kept failing to produce a move

use shakmaty::Color;

/// Terminal state of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FiftyMoveRule,
    Resignation { loser: Color },
    Forfeit { loser: Color },
}

impl GameOutcome {
    /// Winning colour, `None` for draws
    pub fn winner(&self) -> Option<Color> {
        match self {
            GameOutcome::Checkmate { winner } => Some(*winner),
            GameOutcome::Resignation { loser } | GameOutcome::Forfeit { loser } => {
                Some(loser.other())
            }
            _ => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        self.winner().is_none()
    }

    /// Result tag value: `1-0`, `0-1` or `1/2-1/2`
    pub fn result(&self) -> &'static str {
        match self.winner() {
            Some(Color::White) => "1-0",
            Some(Color::Black) => "0-1",
            None => "1/2-1/2",
        }
    }

    /// Termination tag value
    ///
    /// The text is stable: it is written to game logs and parsed back by
    /// [`GameOutcome::from_tags`].
    pub fn termination(&self) -> &'static str {
        match self {
            GameOutcome::Checkmate { .. } => "checkmate",
            GameOutcome::Stalemate => "stalemate",
            GameOutcome::InsufficientMaterial => "insufficient material",
            GameOutcome::ThreefoldRepetition => "threefold repetition",
            GameOutcome::FiftyMoveRule => "fifty-move rule",
            GameOutcome::Resignation { .. } => "resignation",
            GameOutcome::Forfeit { .. } => "forfeit",
        }
    }

    /// Human-readable message for the end-of-game banner
    pub fn message(&self) -> String {
        match self {
            GameOutcome::Checkmate { winner } => {
                format!("Checkmate! {} wins.", color_name(*winner))
            }
            GameOutcome::Stalemate => "Draw by stalemate.".to_string(),
            GameOutcome::InsufficientMaterial => "Draw by insufficient material.".to_string(),
            GameOutcome::ThreefoldRepetition => "Draw by threefold repetition.".to_string(),
            GameOutcome::FiftyMoveRule => "Draw by the fifty-move rule.".to_string(),
            GameOutcome::Resignation { loser } => format!(
                "{} resigns. {} wins.",
                color_name(*loser),
                color_name(loser.other())
            ),
            GameOutcome::Forfeit { loser } => format!(
                "{} produced no move and forfeits. {} wins.",
                color_name(*loser),
                color_name(loser.other())
            ),
        }
    }

    /// Rebuild an outcome from the `Result` and `Termination` footer tags
    ///
    /// Returns `None` when the pair does not describe a known outcome.
    pub fn from_tags(result: &str, termination: &str) -> Option<Self> {
        let winner = match result {
            "1-0" => Some(Color::White),
            "0-1" => Some(Color::Black),
            "1/2-1/2" => None,
            _ => return None,
        };
        let outcome = match (termination, winner) {
            ("checkmate", Some(winner)) => GameOutcome::Checkmate { winner },
            ("resignation", Some(winner)) => GameOutcome::Resignation {
                loser: winner.other(),
            },
            ("forfeit", Some(winner)) => GameOutcome::Forfeit {
                loser: winner.other(),
            },
            ("stalemate", None) => GameOutcome::Stalemate,
            ("insufficient material", None) => GameOutcome::InsufficientMaterial,
            ("threefold repetition", None) => GameOutcome::ThreefoldRepetition,
            ("fifty-move rule", None) => GameOutcome::FiftyMoveRule,
            _ => return None,
        };
        Some(outcome)
    }
}

/// "White" / "Black"
pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_strings() {
        //! Result tags follow the usual 1-0 / 0-1 / 1/2-1/2 convention
        assert_eq!(GameOutcome::Checkmate { winner: Color::Black }.result(), "0-1");
        assert_eq!(GameOutcome::Stalemate.result(), "1/2-1/2");
        assert_eq!(GameOutcome::Forfeit { loser: Color::Black }.result(), "1-0");
    }

    #[test]
    fn test_resignation_winner_is_opponent() {
        let outcome = GameOutcome::Resignation { loser: Color::White };
        assert_eq!(outcome.winner(), Some(Color::Black));
        assert!(!outcome.is_draw());
    }

    #[test]
    fn test_footer_tags_parse_back() {
        //! Every outcome survives a trip through its footer tags
        let outcomes = [
            GameOutcome::Checkmate { winner: Color::White },
            GameOutcome::ThreefoldRepetition,
            GameOutcome::Forfeit { loser: Color::White },
        ];
        for outcome in outcomes {
            assert_eq!(
                GameOutcome::from_tags(outcome.result(), outcome.termination()),
                Some(outcome)
            );
        }
    }

    #[test]
    fn test_inconsistent_footer_rejected() {
        //! A draw result cannot pair with checkmate
        assert_eq!(GameOutcome::from_tags("1/2-1/2", "checkmate"), None);
        assert_eq!(GameOutcome::from_tags("2-0", "checkmate"), None);
    }
}
