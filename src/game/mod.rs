//! Game module - rules, players, turn flow and persistence
//!
//! # Layout
//!
//! - [`position`] - board adapter over `shakmaty`
//! - [`outcome`] - how a game ended
//! - [`players`] - human, AI and engine players
//! - [`session`] - the two seats and the position
//! - [`turn`] - turn loop state machine
//! - [`log`] - game log writer and reader
//! - [`archive`] - saved game files
//! - [`stats`] - win/loss/draw records
//! - [`practice`] - practice positions
//! - [`strategy`] - opening and defence tables

pub mod archive;
pub mod log;
pub mod outcome;
pub mod players;
pub mod position;
pub mod practice;
pub mod session;
pub mod stats;
pub mod strategy;
pub mod turn;

pub use outcome::GameOutcome;
pub use position::{AppliedMove, ChessPosition};
pub use session::{Seat, Session};
pub use turn::{NoMovePolicy, QuitChoice, TurnLoop, TurnState};
