//! Chessmaster submenu
//!
//! Runs until the user goes back to the main menu. Positions typed in for
//! analysis are checked locally before the model is asked.

use tracing::info;

use super::App;
use crate::core::error::GameResult;
use crate::game::position::ChessPosition;
use crate::ui::board;
use crate::ui::console::Console;
use crate::ui::menus::{self, ChessmasterChoice};

pub fn run(app: &App, console: &mut dyn Console) {
    loop {
        let choice = menus::chessmaster_menu(console, &app.palette);
        info!("[MENU] Chessmaster choice: {:?}", choice);
        match choice {
            ChessmasterChoice::Analyze(fen) => analyze(app, console, &fen),
            ChessmasterChoice::Ask(question) => app.ask_expert(console, &question),
            ChessmasterChoice::Puzzle => puzzle(app, console),
            ChessmasterChoice::FunFact => consult(
                app,
                console,
                "Asking the Chessmaster for a fun fact...",
                "Sorry, I couldn't get a fact.",
                || app.expert.fun_fact(),
            ),
            ChessmasterChoice::Joke => consult(
                app,
                console,
                "Asking the Chessmaster for a joke...",
                "Sorry, I couldn't get a joke.",
                || app.expert.chess_joke(),
            ),
            ChessmasterChoice::News => consult(
                app,
                console,
                "Asking the Chessmaster for the latest news...",
                "Sorry, I couldn't get the news.",
                || app.expert.latest_news(),
            ),
            ChessmasterChoice::OpeningAdvice => consult(
                app,
                console,
                "Asking the Chessmaster for opening advice...",
                "Sorry, I couldn't get any advice.",
                || app.expert.opening_advice(),
            ),
            ChessmasterChoice::Back => return,
        }
    }
}

fn consult(
    app: &App,
    console: &mut dyn Console,
    waiting: &str,
    failure: &str,
    request: impl FnOnce() -> GameResult<String>,
) {
    console.print(&app.palette.prompt(waiting));
    match request() {
        Ok(text) => console.print(&app.palette.highlight(&text)),
        Err(err) => app.report(console, &format!("{failure} {err}")),
    }
}

fn analyze(app: &App, console: &mut dyn Console, fen: &str) {
    let position = match ChessPosition::from_fen(fen) {
        Ok(position) => position,
        Err(err) => {
            app.report(console, &format!("That FEN is not a legal position: {err}"));
            return;
        }
    };
    console.print(&board::render(&position, None, &app.palette));
    console.print(&app.palette.prompt("Asking the Chessmaster to analyze the position..."));
    match app.expert.analyze_position(&position.fen()) {
        Ok(analysis) => console.print(&analysis),
        Err(err) => app.report(console, &format!("Sorry, analysis failed. {err}")),
    }
}

fn puzzle(app: &App, console: &mut dyn Console) {
    console.print(&app.palette.prompt("Asking the Chessmaster for a puzzle..."));
    let puzzle = match app.expert.tactical_puzzle() {
        Ok(puzzle) => puzzle,
        Err(err) => {
            app.report(console, &format!("Sorry, I couldn't get a puzzle. {err}"));
            return;
        }
    };
    console.print(&puzzle.statement);
    if let Some(position) = puzzle.fen.as_deref().and_then(|fen| ChessPosition::from_fen(fen).ok()) {
        console.print(&board::render(&position, None, &app.palette));
    }
    if let Some(solution) = puzzle.solution {
        if console.read_line("Press Enter to see the solution: ").is_none() {
            return;
        }
        console.print(&app.palette.highlight(&format!("Solution: {solution}")));
    }
}
