//! Board position adapter
//!
//! Wraps [`shakmaty::Chess`] so the rest of the crate talks in FEN strings and
//! coordinate moves. Legality, check detection and FEN handling all come from
//! `shakmaty`; nothing here re-implements chess rules.

use std::collections::HashMap;

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Move, Position, Rank, Square};

use crate::core::error::{GameError, GameResult};
use crate::game::outcome::GameOutcome;

/// A move that has been played, with everything the log needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// Coordinate notation, e.g. `e2e4`, `e7e8q`
    pub uci: String,
    /// Standard algebraic notation including `+`/`#`
    pub san: String,
    /// Position after the move
    pub fen_after: String,
    /// Side that made the move
    pub mover: Color,
    /// Fullmove number the move was played in
    pub move_number: u32,
}

/// A legal chess position
#[derive(Debug, Clone, Default)]
pub struct ChessPosition {
    inner: Chess,
}

impl ChessPosition {
    /// Standard starting position
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a FEN string into a legal position
    pub fn from_fen(fen: &str) -> GameResult<Self> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e: shakmaty::fen::ParseFenError| GameError::InvalidPosition {
                fen: fen.to_string(),
                reason: e.to_string(),
            })?;
        let inner: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| GameError::InvalidPosition {
                fen: fen.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { inner })
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.inner.clone(), EnPassantMode::Legal).to_string()
    }

    /// Side to move
    pub fn turn(&self) -> Color {
        self.inner.turn()
    }

    pub fn fullmove_number(&self) -> u32 {
        self.inner.fullmoves().get()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.inner.halfmoves()
    }

    pub fn is_check(&self) -> bool {
        self.inner.is_check()
    }

    /// Every legal move in coordinate notation
    pub fn legal_uci_moves(&self) -> Vec<String> {
        self.inner
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect()
    }

    /// Whether `uci` names a legal move in this position
    pub fn is_legal_uci(&self, uci: &str) -> bool {
        self.parse_move(uci).is_ok()
    }

    /// Resolve user or player input to a legal move
    ///
    /// Coordinate notation is tried first; SAN (`Nf3`, `O-O`, `exd5`) is
    /// accepted as a fallback. Input that is neither yields
    /// `InvalidMoveFormat`; a well-formed move that is not legal here yields
    /// `IllegalMove`.
    pub fn parse_move(&self, input: &str) -> GameResult<Move> {
        let input = input.trim();

        if let Ok(uci) = input.parse::<UciMove>() {
            return uci.to_move(&self.inner).map_err(|_| self.illegal(input));
        }

        match input.parse::<SanPlus>() {
            Ok(san_plus) => san_plus
                .san
                .to_move(&self.inner)
                .map_err(|_| self.illegal(input)),
            Err(_) => Err(GameError::InvalidMoveFormat {
                input: input.to_string(),
            }),
        }
    }

    /// Play an already-legal move
    pub fn play(&mut self, m: &Move) -> GameResult<AppliedMove> {
        let uci = m.to_uci(CastlingMode::Standard).to_string();
        let mover = self.inner.turn();
        let move_number = self.fullmove_number();
        let mut san = San::from_move(&self.inner, m).to_string();

        let next = self
            .inner
            .clone()
            .play(m)
            .map_err(|_| self.illegal(&uci))?;

        if next.is_checkmate() {
            san.push('#');
        } else if next.is_check() {
            san.push('+');
        }

        self.inner = next;
        Ok(AppliedMove {
            uci,
            san,
            fen_after: self.fen(),
            mover,
            move_number,
        })
    }

    /// Parse and play in one step; the position is untouched on error
    pub fn apply(&mut self, input: &str) -> GameResult<AppliedMove> {
        let m = self.parse_move(input)?;
        self.play(&m)
    }

    /// Identity used for repetition counting
    ///
    /// Placement, side to move, castling rights and en passant square. The
    /// move counters are left out.
    pub fn repetition_key(&self) -> String {
        self.fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Board-decided end of game, if any
    pub fn status(&self, repetitions: &RepetitionTable) -> Option<GameOutcome> {
        if self.inner.is_checkmate() {
            return Some(GameOutcome::Checkmate {
                winner: self.inner.turn().other(),
            });
        }
        if self.inner.is_stalemate() {
            return Some(GameOutcome::Stalemate);
        }
        if self.inner.is_insufficient_material() {
            return Some(GameOutcome::InsufficientMaterial);
        }
        if repetitions.count(self) >= 3 {
            return Some(GameOutcome::ThreefoldRepetition);
        }
        if self.inner.halfmoves() >= 100 {
            return Some(GameOutcome::FiftyMoveRule);
        }
        None
    }

    /// Piece letter on a square, `file` and `rank` counted from zero
    ///
    /// Uppercase for White, lowercase for Black.
    pub fn piece_char_at(&self, file: u32, rank: u32) -> Option<char> {
        if file > 7 || rank > 7 {
            return None;
        }
        let square = Square::from_coords(File::new(file), Rank::new(rank));
        self.inner.board().piece_at(square).map(|piece| piece.char())
    }

    fn illegal(&self, input: &str) -> GameError {
        GameError::IllegalMove {
            input: input.to_string(),
            fen: self.fen(),
        }
    }
}

/// Occurrence counts of positions seen in a game
#[derive(Debug, Clone, Default)]
pub struct RepetitionTable {
    counts: HashMap<String, u32>,
}

impl RepetitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more occurrence of `position`, returning the new total
    pub fn record(&mut self, position: &ChessPosition) -> u32 {
        let count = self.counts.entry(position.repetition_key()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, position: &ChessPosition) -> u32 {
        self.counts
            .get(&position.repetition_key())
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_start_position_fen() {
        //! The default position is the standard start
        let position = ChessPosition::new();
        assert_eq!(position.fen(), START_FEN);
        assert_eq!(position.turn(), Color::White);
        assert_eq!(position.legal_uci_moves().len(), 20);
    }

    #[test]
    fn test_apply_coordinate_move() {
        let mut position = ChessPosition::new();
        let applied = position.apply("e2e4").expect("e2e4 is legal");

        assert_eq!(applied.uci, "e2e4");
        assert_eq!(applied.san, "e4");
        assert_eq!(applied.mover, Color::White);
        assert_eq!(applied.move_number, 1);
        assert_eq!(position.turn(), Color::Black);
        assert_ne!(position.fen(), START_FEN);
    }

    #[test]
    fn test_san_input_accepted() {
        //! SAN works as a convenience for human players
        let mut position = ChessPosition::new();
        let applied = position.apply("Nf3").expect("Nf3 is legal");
        assert_eq!(applied.uci, "g1f3");
    }

    #[test]
    fn test_illegal_move_leaves_position() {
        //! A rejected move must not change the position
        let mut position = ChessPosition::new();
        let err = position.apply("e2e5").unwrap_err();
        assert!(matches!(err, GameError::IllegalMove { .. }));
        assert_eq!(position.fen(), START_FEN);
    }

    #[test]
    fn test_garbage_is_format_error() {
        let position = ChessPosition::new();
        let err = position.parse_move("hello there").unwrap_err();
        assert!(matches!(err, GameError::InvalidMoveFormat { .. }));
    }

    #[test]
    fn test_checkmate_detected_with_suffix() {
        //! Fool's mate ends with '#' and a Black win
        let mut position = ChessPosition::new();
        for mv in ["f2f3", "e7e5", "g2g4"] {
            position.apply(mv).expect("legal");
        }
        let mate = position.apply("d8h4").expect("legal");
        assert_eq!(mate.san, "Qh4#");
        assert_eq!(
            position.status(&RepetitionTable::new()),
            Some(GameOutcome::Checkmate { winner: Color::Black })
        );
    }

    #[test]
    fn test_invalid_fen_rejected() {
        let err = ChessPosition::from_fen("not a fen").unwrap_err();
        assert!(matches!(err, GameError::InvalidPosition { .. }));
    }

    #[test]
    fn test_insufficient_material() {
        let position = ChessPosition::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").expect("valid");
        assert_eq!(
            position.status(&RepetitionTable::new()),
            Some(GameOutcome::InsufficientMaterial)
        );
    }

    #[test]
    fn test_repetition_ignores_move_counters() {
        //! Knight shuffles bring the start position back with new counters
        let mut position = ChessPosition::new();
        let mut table = RepetitionTable::new();
        table.record(&position);
        for mv in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
            position.apply(mv).expect("legal");
            table.record(&position);
        }
        assert_eq!(table.count(&position), 3);
        assert_eq!(
            position.status(&table),
            Some(GameOutcome::ThreefoldRepetition)
        );
    }

    #[test]
    fn test_piece_lookup() {
        let position = ChessPosition::new();
        assert_eq!(position.piece_char_at(4, 0), Some('K'));
        assert_eq!(position.piece_char_at(3, 7), Some('q'));
        assert_eq!(position.piece_char_at(4, 4), None);
    }
}
