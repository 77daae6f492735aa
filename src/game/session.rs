//! Game session: two seats and a position
//!
//! A [`Session`] owns both players, the current [`ChessPosition`], the move
//! history and the repetition table. It is created at game start (or from a
//! log), mutated only by [`Session::apply_move`], and dropped or persisted
//! when the game ends.

use shakmaty::Color;
use tracing::{debug, info};

use crate::core::error::GameResult;
use crate::game::log::{GameHeader, MoveRecord};
use crate::game::outcome::GameOutcome;
use crate::game::players::{MoveContext, Player, PlayerAction};
use crate::game::position::{AppliedMove, ChessPosition, RepetitionTable};
use crate::ui::console::Console;

/// Opening strategies are only passed to players up to this fullmove
pub const STRATEGY_MOVES: u32 = 3;

/// Default `Event` tag for new games
pub const DEFAULT_EVENT: &str = "Casual Game";

/// One side of the board
pub struct Seat {
    pub key: String,
    pub player: Box<dyn Player>,
    /// Opening or defence the player was asked to follow
    pub strategy: Option<String>,
}

impl Seat {
    pub fn new(player: Box<dyn Player>, strategy: Option<String>) -> Self {
        Self {
            key: player.key().to_string(),
            player,
            strategy,
        }
    }

    pub fn name(&self) -> &str {
        self.player.name()
    }
}

impl std::fmt::Debug for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seat")
            .field("key", &self.key)
            .field("name", &self.player.name())
            .field("strategy", &self.strategy)
            .finish()
    }
}

#[derive(Debug)]
pub struct Session {
    white: Seat,
    black: Seat,
    position: ChessPosition,
    history: Vec<MoveRecord>,
    repetitions: RepetitionTable,
    initial_fen: String,
}

impl Session {
    /// New game from the standard start
    pub fn new(white: Seat, black: Seat) -> Self {
        Self::with_position(white, black, ChessPosition::new())
    }

    /// New game from an arbitrary position
    pub fn from_fen(white: Seat, black: Seat, fen: &str) -> GameResult<Self> {
        Ok(Self::with_position(white, black, ChessPosition::from_fen(fen)?))
    }

    /// Continue a game that already has moves
    ///
    /// Every recorded position is counted for repetition; play continues from
    /// the last one.
    pub fn resume(
        white: Seat,
        black: Seat,
        initial_fen: &str,
        history: Vec<MoveRecord>,
    ) -> GameResult<Self> {
        let mut session = Self::from_fen(white, black, initial_fen)?;
        for record in &history {
            let position = ChessPosition::from_fen(&record.fen)?;
            session.repetitions.record(&position);
            session.position = position;
        }
        session.history = history;
        info!(
            "[SESSION] Resumed after {} half-moves, {} to move",
            session.history.len(),
            if session.position.turn() == Color::White { "White" } else { "Black" }
        );
        Ok(session)
    }

    fn with_position(white: Seat, black: Seat, position: ChessPosition) -> Self {
        let mut repetitions = RepetitionTable::new();
        repetitions.record(&position);
        Self {
            initial_fen: position.fen(),
            white,
            black,
            position,
            history: Vec::new(),
            repetitions,
        }
    }

    pub fn position(&self) -> &ChessPosition {
        &self.position
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.history.last()
    }

    pub fn initial_fen(&self) -> &str {
        &self.initial_fen
    }

    pub fn seat(&self, color: Color) -> &Seat {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn seat_mut(&mut self, color: Color) -> &mut Seat {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    /// Seat of the side to move
    pub fn current_seat(&self) -> &Seat {
        self.seat(self.position.turn())
    }

    pub fn current_seat_mut(&mut self) -> &mut Seat {
        self.seat_mut(self.position.turn())
    }

    /// Strategy for the side to move, while the opening lasts
    pub fn strategy_for_turn(&self) -> Option<&str> {
        if self.position.fullmove_number() > STRATEGY_MOVES {
            return None;
        }
        self.current_seat().strategy.as_deref()
    }

    pub fn set_strategy(&mut self, color: Color, strategy: Option<String>) {
        self.seat_mut(color).strategy = strategy;
    }

    /// Ask the side to move for its action
    pub fn request_move(&mut self, console: &mut dyn Console) -> GameResult<PlayerAction> {
        let color = self.position.turn();
        let strategy = self.strategy_for_turn().map(str::to_string);
        let ctx = MoveContext {
            position: &self.position,
            strategy: strategy.as_deref(),
            color,
        };
        let seat = match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        };
        seat.player.get_move(&ctx, console)
    }

    /// Play `input` for the side to move
    ///
    /// On error the session is unchanged.
    pub fn apply_move(&mut self, input: &str) -> GameResult<AppliedMove> {
        let mover_name = self.current_seat().name().to_string();
        let applied = self.position.apply(input)?;
        self.repetitions.record(&self.position);
        self.history
            .push(MoveRecord::from_applied(&applied, &mover_name));
        debug!(
            "[SESSION] {} played {} ({})",
            mover_name, applied.san, applied.uci
        );
        Ok(applied)
    }

    /// Board-decided end of game, if any
    pub fn status(&self) -> Option<GameOutcome> {
        self.position.status(&self.repetitions)
    }

    /// Log header describing this session
    pub fn header(&self, date: &str) -> GameHeader {
        GameHeader {
            event: DEFAULT_EVENT.to_string(),
            date: date.to_string(),
            white: self.white.name().to_string(),
            black: self.black.name().to_string(),
            white_key: self.white.key.clone(),
            black_key: self.black.key.clone(),
            white_strategy: self.white.strategy.clone(),
            black_strategy: self.black.strategy.clone(),
            initial_fen: Some(self.initial_fen.clone()),
        }
    }
}
