//! Console menus
//!
//! Each menu prints its options, reads one answer and returns a typed choice.
//! Unrecognised answers re-prompt; closed input behaves like quitting.

use crate::core::palette::Palette;
use crate::game::archive::GameSummary;
use crate::game::players::PlayerRegistry;
use crate::game::practice::PracticePosition;
use crate::game::stats::StatsBook;
use crate::game::strategy::{parse_choice, StrategyChoice, BLACK_DEFENCES, WHITE_OPENINGS};
use crate::game::turn::QuitChoice;
use crate::ui::console::Console;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MainMenuChoice {
    NewGame,
    LoadGame,
    Practice,
    Stats,
    Chessmaster,
    Ask(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InGameChoice {
    Load,
    Practice,
    Save,
    Analyze,
    Return,
    Quit,
    Ask(String),
}

/// What to ask the Chessmaster
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessmasterChoice {
    /// Analyze the position in this FEN
    Analyze(String),
    Ask(String),
    Puzzle,
    FunFact,
    Joke,
    News,
    OpeningAdvice,
    Back,
}

/// Answer to a numbered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChoice {
    /// Zero-based index into the list
    Pick(usize),
    Back,
    Quit,
}

/// Everything the setup menu decides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSetup {
    pub strategy: StrategyChoice,
    pub white_key: String,
    pub black_key: String,
}

/// Text after a leading `?`, prompting for it when the `?` stands alone
fn expert_question(answer: &str, console: &mut dyn Console) -> Option<String> {
    let question = answer.strip_prefix('?')?.trim();
    if !question.is_empty() {
        return Some(question.to_string());
    }
    console
        .read_line("Your question for the chess expert: ")
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
}

pub fn main_menu(console: &mut dyn Console, palette: &Palette) -> MainMenuChoice {
    loop {
        console.print(&palette.title("--- Main Menu ---"));
        console.print("  1: Play a New Game");
        console.print("  2: Load a Saved Game");
        console.print("  3: Load a Practice Position");
        console.print("  4: View Player Stats");
        console.print("  5: Ask the Chessmaster");
        console.print("  ?: Ask a Chess Expert");
        console.print("  q: Quit");

        let Some(answer) = console.read_line(&palette.prompt("Choose an option: ")) else {
            return MainMenuChoice::Quit;
        };
        let answer = answer.trim();
        if answer.starts_with('?') {
            match expert_question(answer, console) {
                Some(question) => return MainMenuChoice::Ask(question),
                None => continue,
            }
        }
        match answer.to_ascii_lowercase().as_str() {
            "1" => return MainMenuChoice::NewGame,
            "2" => return MainMenuChoice::LoadGame,
            "3" => return MainMenuChoice::Practice,
            "4" => return MainMenuChoice::Stats,
            "5" => return MainMenuChoice::Chessmaster,
            "q" => return MainMenuChoice::Quit,
            _ => console.print(&palette.error("Invalid choice, please try again.")),
        }
    }
}

pub fn in_game_menu(console: &mut dyn Console, palette: &Palette) -> InGameChoice {
    loop {
        console.print(&palette.title("--- In-Game Menu ---"));
        console.print("  l: Load Saved Game");
        console.print("  p: Load Practice Position");
        console.print("  s: Save Game");
        console.print("  a: Analyze Position");
        console.print("  r: Return to Game");
        console.print("  q: Quit Application");
        console.print("  ?<question>: Ask Chess Expert");

        let Some(answer) = console.read_line(&palette.prompt("Choose an option: ")) else {
            return InGameChoice::Quit;
        };
        let answer = answer.trim();
        if answer.starts_with('?') {
            match expert_question(answer, console) {
                Some(question) => return InGameChoice::Ask(question),
                None => continue,
            }
        }
        match answer.to_ascii_lowercase().as_str() {
            "l" => return InGameChoice::Load,
            "p" => return InGameChoice::Practice,
            "s" => return InGameChoice::Save,
            "a" => return InGameChoice::Analyze,
            "r" | "" => return InGameChoice::Return,
            "q" => return InGameChoice::Quit,
            _ => console.print(&palette.error("Invalid choice, please try again.")),
        }
    }
}

/// The Chessmaster submenu
///
/// Analysis asks for a FEN and a question asks for its text; a blank answer
/// to either re-shows the menu. Closed input goes back.
pub fn chessmaster_menu(console: &mut dyn Console, palette: &Palette) -> ChessmasterChoice {
    loop {
        console.print(&palette.title("--- Ask the Chessmaster ---"));
        console.print("  1: Analyze a position");
        console.print("  2: Ask a chess question");
        console.print("  3: Get a tactical puzzle");
        console.print("  4: Tell me a fun chess fact");
        console.print("  5: Tell me a chess joke");
        console.print("  6: Tell the latest chess news");
        console.print("  7: Opening advice");
        console.print("  m: Back to main menu");

        let Some(answer) = console.read_line(&palette.prompt("Enter your choice: ")) else {
            return ChessmasterChoice::Back;
        };
        let answer = answer.trim();
        if answer.starts_with('?') {
            match expert_question(answer, console) {
                Some(question) => return ChessmasterChoice::Ask(question),
                None => continue,
            }
        }
        match answer.to_ascii_lowercase().as_str() {
            "1" => {
                let Some(fen) = console.read_line("Enter the FEN of the position to analyze: ") else {
                    return ChessmasterChoice::Back;
                };
                match fen.trim() {
                    "" => console.print("No FEN provided. Returning to menu."),
                    fen => return ChessmasterChoice::Analyze(fen.to_string()),
                }
            }
            "2" => match expert_question("?", console) {
                Some(question) => return ChessmasterChoice::Ask(question),
                None => console.print("No question provided. Returning to menu."),
            },
            "3" => return ChessmasterChoice::Puzzle,
            "4" => return ChessmasterChoice::FunFact,
            "5" => return ChessmasterChoice::Joke,
            "6" => return ChessmasterChoice::News,
            "7" => return ChessmasterChoice::OpeningAdvice,
            "m" | "" => return ChessmasterChoice::Back,
            _ => console.print(&palette.error("Invalid choice. Please try again.")),
        }
    }
}

/// Ask how to leave a game in progress
pub fn quit_prompt(console: &mut dyn Console, palette: &Palette) -> QuitChoice {
    loop {
        console.print(&palette.title("--- Quit Game ---"));
        console.print("  s: Save and exit");
        console.print("  e: Exit without saving");
        console.print("  r: Resign");
        console.print("  c: Cancel");

        let Some(answer) = console.read_line(&palette.prompt("Choose an option: ")) else {
            return QuitChoice::Exit;
        };
        match answer.trim().to_ascii_lowercase().as_str() {
            "s" => return QuitChoice::SaveAndExit,
            "e" => return QuitChoice::Exit,
            "r" => return QuitChoice::Resign,
            "c" | "" => return QuitChoice::Cancel,
            _ => console.print(&palette.error("Invalid choice, please try again.")),
        }
    }
}

/// Split a two-player answer such as `m1s2`, `m1 s2` or `hu hu`
pub fn parse_player_keys(input: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    match parts.as_slice() {
        [white, black] => Some((white.to_ascii_lowercase(), black.to_ascii_lowercase())),
        [joined] if joined.len() == 4 && joined.is_ascii() => Some((
            joined[..2].to_ascii_lowercase(),
            joined[2..].to_ascii_lowercase(),
        )),
        _ => None,
    }
}

/// Choose strategies and players for a new game
///
/// `None` when input closes before both answers are given.
pub fn setup_menu(
    console: &mut dyn Console,
    palette: &Palette,
    registry: &PlayerRegistry,
) -> Option<GameSetup> {
    console.print(&palette.title("--- Setup New Game ---"));
    console.print("White openings:");
    for opening in &WHITE_OPENINGS {
        console.print(&format!("  {}: {}", opening.key, opening.name));
    }
    console.print("Black defences:");
    for defence in &BLACK_DEFENCES {
        console.print(&format!("  {}: {}", defence.key, defence.name));
    }

    let strategy = loop {
        let answer = console.read_line(&palette.prompt(
            "Choose strategies (e.g. '1a', blank for none): ",
        ))?;
        match parse_choice(&answer) {
            Some(choice) => break choice,
            None => console.print(&palette.error("Unknown strategy keys.")),
        }
    };

    let (white_key, black_key) = choose_players(console, palette, registry)?;
    Some(GameSetup {
        strategy,
        white_key,
        black_key,
    })
}

/// Keys for White and Black, each checked against the registry
pub fn choose_players(
    console: &mut dyn Console,
    palette: &Palette,
    registry: &PlayerRegistry,
) -> Option<(String, String)> {
    console.print(&palette.title("--- Choose Players ---"));
    for spec in registry.iter() {
        console.print(&format!("  {}: {} ({})", spec.key, spec.label, spec.kind.describe()));
    }

    loop {
        let answer = console.read_line(&palette.prompt(
            "Enter keys for White and Black (e.g. 'm1s2' or 'hu s1'): ",
        ))?;
        let Some((white_key, black_key)) = parse_player_keys(&answer) else {
            console.print(&palette.error("Enter two player keys."));
            continue;
        };
        let unknown: Vec<&str> = [white_key.as_str(), black_key.as_str()]
            .into_iter()
            .filter(|key| !registry.contains(key))
            .collect();
        if !unknown.is_empty() {
            console.print(&palette.error(&format!("Unknown player key: {}", unknown.join(", "))));
            continue;
        }
        return Some((white_key, black_key));
    }
}

/// Name of a human player, defaulting to `fallback`
pub fn ask_player_name(
    console: &mut dyn Console,
    palette: &Palette,
    color: &str,
    fallback: &str,
) -> String {
    console
        .read_line(&palette.prompt(&format!("Name for {color} (blank for '{fallback}'): ")))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn list_choice(console: &mut dyn Console, palette: &Palette, len: usize) -> ListChoice {
    loop {
        let Some(answer) = console.read_line(&palette.prompt("Choose a number, 'm' for menu or 'q' to quit: ")) else {
            return ListChoice::Quit;
        };
        let answer = answer.trim().to_ascii_lowercase();
        match answer.as_str() {
            "m" | "" => return ListChoice::Back,
            "q" => return ListChoice::Quit,
            _ => {}
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => return ListChoice::Pick(n - 1),
            _ => console.print(&palette.error("Invalid choice, please try again.")),
        }
    }
}

pub fn choose_saved_game(
    console: &mut dyn Console,
    palette: &Palette,
    games: &[GameSummary],
) -> ListChoice {
    console.print(&palette.title("--- Saved Games ---"));
    if games.is_empty() {
        console.print("  (none)");
        return ListChoice::Back;
    }
    for (i, game) in games.iter().enumerate() {
        console.print(&format!(
            "  {}: {} | {} vs {} | {} | {} moves",
            i + 1,
            game.date,
            game.white,
            game.black,
            game.status,
            game.moves
        ));
    }
    list_choice(console, palette, games.len())
}

pub fn choose_practice_position(
    console: &mut dyn Console,
    palette: &Palette,
    positions: &[PracticePosition],
) -> ListChoice {
    console.print(&palette.title("--- Practice Positions ---"));
    if positions.is_empty() {
        console.print("  (none)");
        return ListChoice::Back;
    }
    for (i, position) in positions.iter().enumerate() {
        console.print(&format!("  {}: {}  ({})", i + 1, position.name, position.fen));
        if let Some(description) = &position.description {
            console.print(&format!("       {description}"));
        }
    }
    list_choice(console, palette, positions.len())
}

/// Player table, most wins first
pub fn render_stats(stats: &StatsBook, palette: &Palette) -> String {
    let mut rows: Vec<_> = stats.iter().collect();
    rows.sort_by(|(a_name, a), (b_name, b)| b.wins.cmp(&a.wins).then_with(|| a_name.cmp(b_name)));

    let mut out = palette.title("--- Player Statistics ---");
    out.push('\n');
    if rows.is_empty() {
        out.push_str("No games recorded yet.");
        return out;
    }
    out.push_str(&format!("{:30} | {:>4} | {:>6} | {:>5}\n", "Player", "Wins", "Losses", "Draws"));
    out.push_str(&"-".repeat(57));
    for (name, row) in rows {
        out.push_str(&format!(
            "\n{:30} | {:>4} | {:>6} | {:>5}",
            name, row.wins, row.losses, row.draws
        ));
    }
    out
}
