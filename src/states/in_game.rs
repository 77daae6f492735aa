//! Playing a game
//!
//! Drives the [`TurnLoop`] one step at a time, rendering the board before
//! every move request. The active log (`chess_game.log`) is rewritten whenever
//! a game stops being played; player stats are updated once per finished
//! game.

use tracing::{error, info};

use super::pause::{self, PauseOutcome};
use super::{App, AppState};
use crate::game::outcome::color_name;
use crate::game::players::PlayerAction;
use crate::game::turn::{QuitReason, TurnLoop, TurnState};
use crate::ui::board;
use crate::ui::console::Console;
use crate::ui::menus;

pub fn run(app: &mut App, console: &mut dyn Console, turn_loop: TurnLoop) -> AppState {
    let mut turn_loop = turn_loop;
    // Games decided before play started have been counted already
    let mut decided_on_entry = turn_loop.state().is_terminal();
    announce(app, console, &turn_loop);

    loop {
        match turn_loop.state().clone() {
            TurnState::AwaitingMove => {
                show_position(app, console, &turn_loop);
                if let Err(err) = turn_loop.step(console) {
                    app.report(console, &format!("{err}"));
                }
            }
            TurnState::MoveApplied(_) => {
                turn_loop.advance();
            }
            TurnState::InMenu => match pause::run(app, console, &turn_loop) {
                PauseOutcome::Resume => {
                    turn_loop.resume();
                }
                PauseOutcome::Replace(next) => {
                    persist_active(app, console, &turn_loop);
                    turn_loop = *next;
                    decided_on_entry = turn_loop.state().is_terminal();
                    announce(app, console, &turn_loop);
                }
                PauseOutcome::Quit => {
                    turn_loop.resume();
                    if let Err(err) = turn_loop.submit(PlayerAction::Quit) {
                        error!("[GAME] Could not open the quit prompt: {}", err);
                    }
                }
            },
            TurnState::QuitRequested => {
                let choice = menus::quit_prompt(console, &app.palette);
                info!("[GAME] Quit prompt answered: {:?}", choice);
                turn_loop.resolve_quit(choice);
            }
            TurnState::GameOver(outcome) => {
                console.print(&app.palette.title("--- Game Over ---"));
                show_board(app, console, &turn_loop);
                console.print(&app.palette.highlight(&outcome.message()));
                console.print(&format!("Result: {}", outcome.result()));

                if !decided_on_entry {
                    let session = turn_loop.session();
                    let white = session.seat(shakmaty::Color::White).name().to_string();
                    let black = session.seat(shakmaty::Color::Black).name().to_string();
                    app.stats.record(&white, &black, &outcome);
                    if let Err(err) = app.stats.save() {
                        app.report(console, &format!("Could not save player stats: {err}"));
                    }
                }
                persist_active(app, console, &turn_loop);
                return AppState::MainMenu;
            }
            TurnState::Quit(reason) => {
                persist_active(app, console, &turn_loop);
                if reason == QuitReason::SaveAndExit {
                    match app.archive.save(turn_loop.log()) {
                        Ok(path) => console.print(&app.palette.success(&format!(
                            "Game saved to {}",
                            path.display()
                        ))),
                        Err(err) => app.report(console, &format!("Could not save the game: {err}")),
                    }
                }
                console.print("Goodbye!");
                return AppState::Exit;
            }
        }
    }
}

fn announce(app: &App, console: &mut dyn Console, turn_loop: &TurnLoop) {
    let session = turn_loop.session();
    console.print(&app.palette.title("--- Game Started ---"));
    for color in [shakmaty::Color::White, shakmaty::Color::Black] {
        let seat = session.seat(color);
        let strategy = seat
            .strategy
            .as_deref()
            .map(|s| format!(" - {s}"))
            .unwrap_or_default();
        console.print(&format!(
            "{}: {} [{}]{}",
            color_name(color),
            seat.name(),
            seat.key,
            strategy
        ));
    }
    console.print(&format!("Initial FEN: {}", session.initial_fen()));
}

fn show_board(app: &App, console: &mut dyn Console, turn_loop: &TurnLoop) {
    let session = turn_loop.session();
    let last = session.last_move().map(|m| m.uci.as_str());
    console.print(&board::render(session.position(), last, &app.palette));
}

fn show_position(app: &App, console: &mut dyn Console, turn_loop: &TurnLoop) {
    show_board(app, console, turn_loop);
    let session = turn_loop.session();
    if let Some(last) = session.last_move() {
        console.print(&format!("Last move: {} played {}", last.player, last.san));
    }
    let position = session.position();
    let mut message = format!(
        "{}'s turn ({}), move {}.",
        color_name(position.turn()),
        session.current_seat().name(),
        position.fullmove_number()
    );
    if position.is_check() {
        message.push_str(" Check!");
    }
    console.print(&app.palette.prompt(&message));
}

/// Rewrite `chess_game.log`; failure is reported, never fatal
fn persist_active(app: &App, console: &mut dyn Console, turn_loop: &TurnLoop) {
    match app.archive.write_active(turn_loop.log()) {
        Ok(path) => info!("[GAME] Active log written to {:?}", path),
        Err(err) => app.report(console, &format!("Could not write the game log: {err}")),
    }
}
