//! Console chess with human, AI-model and UCI-engine players
//!
//! - [`core`] - configuration, errors, diagnostics, palette
//! - [`game`] - rules adapter, players, session, turn loop, game logs
//! - [`networking`] - completion client, chess expert, auth client
//! - [`ui`] - console, board renderer, menus
//! - [`states`] - application flow

pub mod core;
pub mod game;
pub mod networking;
pub mod states;
pub mod ui;
