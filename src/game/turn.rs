//! Turn loop state machine
//!
//! ```text
//!              ┌──────────── cancel ─────────────┐
//!              v                                 │
//! AwaitingMove ──move──> MoveApplied ──advance──> AwaitingMove
//!   │  │  │                    └──────advance───> GameOver
//!   │  │  └──quit──> QuitRequested ──save/exit──> Quit
//!   │  │                         └────resign────> GameOver
//!   │  └──menu──> InMenu ──resume──> AwaitingMove
//!   └──no move (policy)──> AwaitingMove | GameOver
//! ```
//!
//! The loop owns the [`Session`] and its [`GameLog`]; every applied move adds
//! exactly one log line, and reaching `GameOver` writes the footer.

use serde::{Deserialize, Serialize};
use shakmaty::Color;
use tracing::{info, warn};

use crate::core::error::GameResult;
use crate::game::log::GameLog;
use crate::game::outcome::{color_name, GameOutcome};
use crate::game::players::PlayerAction;
use crate::game::position::AppliedMove;
use crate::game::session::Session;
use crate::ui::console::Console;

/// What happens when an AI or engine player produces no move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoMovePolicy {
    /// Ask the same side again; after `limit` consecutive failures it forfeits
    Retry { limit: u32 },
    /// Forfeit on the first failure
    Forfeit,
}

impl Default for NoMovePolicy {
    fn default() -> Self {
        NoMovePolicy::Retry { limit: 3 }
    }
}

impl NoMovePolicy {
    /// Whether `failures` consecutive failures end the game
    pub fn forfeits_after(&self, failures: u32) -> bool {
        match self {
            NoMovePolicy::Retry { limit } => failures >= (*limit).max(1),
            NoMovePolicy::Forfeit => true,
        }
    }
}

/// Answers to the quit prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitChoice {
    SaveAndExit,
    Exit,
    Cancel,
    Resign,
}

/// How a game was left without finishing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitReason {
    /// The caller should archive the log
    SaveAndExit,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    AwaitingMove,
    MoveApplied(AppliedMove),
    InMenu,
    QuitRequested,
    GameOver(GameOutcome),
    Quit(QuitReason),
}

impl TurnState {
    /// No further moves will be requested
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnState::GameOver(_) | TurnState::Quit(_))
    }
}

pub struct TurnLoop {
    session: Session,
    log: GameLog,
    state: TurnState,
    policy: NoMovePolicy,
    failures: u32,
}

impl TurnLoop {
    /// Drive `session`, appending to `log`
    ///
    /// A session that is already decided starts in `GameOver`.
    pub fn new(session: Session, log: GameLog, policy: NoMovePolicy) -> Self {
        let mut turn_loop = Self {
            session,
            log,
            state: TurnState::AwaitingMove,
            policy,
            failures: 0,
        };
        if let Some(outcome) = turn_loop.session.status() {
            turn_loop.end(outcome);
        }
        turn_loop
    }

    /// Fresh game: the log starts with this session's header
    pub fn start(session: Session, date: &str, policy: NoMovePolicy) -> Self {
        let log = GameLog::start(&session.header(date));
        Self::new(session, log, policy)
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn into_parts(self) -> (Session, GameLog) {
        (self.session, self.log)
    }

    /// Feed the current player's action into the machine
    ///
    /// Rejected human input is returned as an error and the state stays
    /// `AwaitingMove`. Rejected AI or engine moves count as no move.
    pub fn submit(&mut self, action: PlayerAction) -> GameResult<&TurnState> {
        if self.state != TurnState::AwaitingMove {
            warn!("[TURN] Ignoring {:?} in state {:?}", action, self.state);
            return Ok(&self.state);
        }

        match action {
            PlayerAction::Move(input) => {
                let mover = self.session.current_seat().name().to_string();
                match self.session.apply_move(&input) {
                    Ok(applied) => {
                        self.log.append_move(&applied, &mover);
                        self.failures = 0;
                        self.state = TurnState::MoveApplied(applied);
                    }
                    Err(err) if self.session.current_seat().player.is_human() => {
                        return Err(err);
                    }
                    Err(err) => {
                        warn!("[TURN] {} offered a rejected move: {}", mover, err);
                        self.no_move();
                    }
                }
            }
            PlayerAction::NoMove => self.no_move(),
            PlayerAction::Menu => self.state = TurnState::InMenu,
            PlayerAction::Quit => self.state = TurnState::QuitRequested,
        }
        Ok(&self.state)
    }

    /// Settle an applied move: either the game is over or the other side moves
    pub fn advance(&mut self) -> &TurnState {
        if let TurnState::MoveApplied(_) = self.state {
            match self.session.status() {
                Some(outcome) => self.end(outcome),
                None => self.state = TurnState::AwaitingMove,
            }
        }
        &self.state
    }

    /// Leave the in-game menu
    pub fn resume(&mut self) -> &TurnState {
        if self.state == TurnState::InMenu {
            self.state = TurnState::AwaitingMove;
        }
        &self.state
    }

    /// Answer a pending quit prompt
    pub fn resolve_quit(&mut self, choice: QuitChoice) -> &TurnState {
        if self.state != TurnState::QuitRequested {
            return &self.state;
        }
        match choice {
            QuitChoice::SaveAndExit => self.state = TurnState::Quit(QuitReason::SaveAndExit),
            QuitChoice::Exit => self.state = TurnState::Quit(QuitReason::Exit),
            QuitChoice::Cancel => self.state = TurnState::AwaitingMove,
            QuitChoice::Resign => {
                let loser = self.session.position().turn();
                self.end(GameOutcome::Resignation { loser });
            }
        }
        &self.state
    }

    /// Ask the side to move and run the result through the machine
    ///
    /// Player errors other than move rejections (engine missing, network
    /// down) are reported on the console and count as no move.
    pub fn step(&mut self, console: &mut dyn Console) -> GameResult<&TurnState> {
        if self.state != TurnState::AwaitingMove {
            return Ok(&self.state);
        }

        let action = match self.session.request_move(console) {
            Ok(action) => action,
            Err(err) => {
                warn!("[TURN] Player error: {}", err);
                console.print(&format!("{err}"));
                PlayerAction::NoMove
            }
        };
        if action == PlayerAction::NoMove {
            console.print(&format!(
                "{} produced no move.",
                self.session.current_seat().name()
            ));
        }

        self.submit(action)?;
        Ok(self.advance())
    }

    fn no_move(&mut self) {
        let side = self.session.position().turn();
        self.failures += 1;
        if self.policy.forfeits_after(self.failures) {
            info!(
                "[TURN] {} forfeits after {} failed turns",
                color_name(side),
                self.failures
            );
            self.end(GameOutcome::Forfeit { loser: side });
        } else {
            self.state = TurnState::AwaitingMove;
        }
    }

    fn end(&mut self, outcome: GameOutcome) {
        info!("[TURN] Game over: {}", outcome.message());
        self.log.finish(&outcome);
        self.state = TurnState::GameOver(outcome);
    }

    /// Consecutive no-move turns of the side to move
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Side whose turn it is
    pub fn side_to_move(&self) -> Color {
        self.session.position().turn()
    }
}
