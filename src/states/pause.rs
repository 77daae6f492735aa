//! In-game menu
//!
//! Opened when a human types `m`. Saving, analysis and expert questions keep
//! the menu open. Loading a game or practice position replaces the current
//! game.

use tracing::info;

use super::{App, Selection};
use crate::game::turn::TurnLoop;
use crate::ui::console::Console;
use crate::ui::menus::{self, InGameChoice};

/// How the menu was left
pub enum PauseOutcome {
    Resume,
    /// Play this game instead of the current one
    Replace(Box<TurnLoop>),
    /// Go to the quit prompt
    Quit,
}

pub fn run(app: &App, console: &mut dyn Console, turn_loop: &TurnLoop) -> PauseOutcome {
    loop {
        match menus::in_game_menu(console, &app.palette) {
            InGameChoice::Return => return PauseOutcome::Resume,
            InGameChoice::Quit => return PauseOutcome::Quit,
            InGameChoice::Save => match app.archive.save(turn_loop.log()) {
                Ok(path) => console.print(&app.palette.success(&format!(
                    "Game saved to {}",
                    path.display()
                ))),
                Err(err) => app.report(console, &format!("Could not save the game: {err}")),
            },
            InGameChoice::Load => match app.pick_saved_game(console) {
                Selection::Game(next) => return PauseOutcome::Replace(next),
                Selection::Back => {}
                Selection::Quit => return PauseOutcome::Quit,
            },
            InGameChoice::Practice => match app.pick_practice(console) {
                Selection::Game(next) => {
                    info!("[MENU] Switching to a practice position");
                    return PauseOutcome::Replace(next);
                }
                Selection::Back => {}
                Selection::Quit => return PauseOutcome::Quit,
            },
            InGameChoice::Analyze => {
                let fen = turn_loop.session().position().fen();
                console.print(&app.palette.prompt("Asking the Chessmaster to analyze the position..."));
                match app.expert.analyze_position(&fen) {
                    Ok(analysis) => console.print(&analysis),
                    Err(err) => app.report(console, &format!("Sorry, analysis failed. {err}")),
                }
            }
            InGameChoice::Ask(question) => app.ask_expert(console, &question),
        }
    }
}
