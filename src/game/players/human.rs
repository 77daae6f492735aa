//! Human player reading moves from the console

use tracing::debug;

use crate::core::error::GameResult;
use crate::game::outcome::color_name;
use crate::game::players::{MoveContext, Player, PlayerAction, PlayerKind};
use crate::ui::console::Console;

/// Reserved input that opens the in-game menu
pub const MENU_TOKEN: &str = "m";

/// Reserved input that leaves the game
pub const QUIT_TOKEN: &str = "q";

pub struct HumanPlayer {
    key: String,
    name: String,
    kind: PlayerKind,
}

impl HumanPlayer {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind: PlayerKind::Human,
        }
    }
}

impl Player for HumanPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn kind(&self) -> &PlayerKind {
        &self.kind
    }

    /// Read until the user types something
    ///
    /// Legality is checked by the turn loop, which re-prompts on rejection.
    /// Closed input counts as quitting.
    fn get_move(
        &mut self,
        ctx: &MoveContext<'_>,
        console: &mut dyn Console,
    ) -> GameResult<PlayerAction> {
        let prompt = format!(
            "{} ({}) - enter your move (e.g. e2e4), '{MENU_TOKEN}' for menu, '{QUIT_TOKEN}' to quit: ",
            self.name,
            color_name(ctx.color)
        );

        loop {
            let Some(line) = console.read_line(&prompt) else {
                debug!("[INPUT] Console closed, treating as quit");
                return Ok(PlayerAction::Quit);
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            return Ok(match input.to_ascii_lowercase().as_str() {
                MENU_TOKEN => PlayerAction::Menu,
                QUIT_TOKEN => PlayerAction::Quit,
                _ => PlayerAction::Move(input.to_string()),
            });
        }
    }
}
