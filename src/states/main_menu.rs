//! Main menu

use tracing::info;

use super::{chessmaster, App, AppState, Selection};
use crate::ui::console::Console;
use crate::ui::menus::{self, MainMenuChoice};

pub fn run(app: &mut App, console: &mut dyn Console) -> AppState {
    if let Some(user) = &app.user {
        console.print(&app.palette.highlight(&format!("Logged in as {}", user.username)));
    }

    loop {
        let choice = menus::main_menu(console, &app.palette);
        info!("[MENU] Main menu choice: {:?}", choice);
        match choice {
            MainMenuChoice::NewGame => {
                let Some(setup) = menus::setup_menu(console, &app.palette, app.factory.registry())
                else {
                    return AppState::Exit;
                };
                match app.start_game(console, &setup.white_key, &setup.black_key, setup.strategy) {
                    Ok(turn_loop) => return AppState::InGame(Box::new(turn_loop)),
                    Err(err) => app.report(console, &format!("Could not start the game: {err}")),
                }
            }
            MainMenuChoice::LoadGame => match app.pick_saved_game(console) {
                Selection::Game(turn_loop) => return AppState::InGame(turn_loop),
                Selection::Back => {}
                Selection::Quit => return AppState::Exit,
            },
            MainMenuChoice::Practice => match app.pick_practice(console) {
                Selection::Game(turn_loop) => return AppState::InGame(turn_loop),
                Selection::Back => {}
                Selection::Quit => return AppState::Exit,
            },
            MainMenuChoice::Stats => {
                console.print(&menus::render_stats(&app.stats, &app.palette));
            }
            MainMenuChoice::Chessmaster => chessmaster::run(app, console),
            MainMenuChoice::Ask(question) => app.ask_expert(console, &question),
            MainMenuChoice::Quit => return AppState::Exit,
        }
    }
}
