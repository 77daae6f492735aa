//! Console user interface
//!
//! - **console**: line-based input/output, scripted in tests
//! - **board**: text board with the last move highlighted
//! - **menus**: main, setup, in-game and quit menus
//!
//! Renderers take a [`Palette`](crate::core::Palette) argument instead of
//! reading colour constants.

pub mod board;
pub mod console;
pub mod menus;

pub use console::{Console, ScriptedConsole, StdConsole};
pub use menus::{GameSetup, InGameChoice, ListChoice, MainMenuChoice};
