//! Application flow for the console client
//!
//! # State Flow
//!
//! ```text
//! [Auth] → [MainMenu] ⇄ [InGame] ⇄ (pause menu)
//!              ↓             ↓
//!            [Exit] ←────────┘
//! ```
//!
//! - `auth` - login/register loop, skipped offline or when not required
//! - `main_menu` - new game, saved games, practice positions, stats, expert
//! - `chessmaster` - analysis of typed positions, puzzles, facts, jokes, news
//! - `in_game` - drives the [`TurnLoop`] until the game ends or is left
//! - `pause` - in-game menu
//!
//! Each state runs until it knows the next one and returns it. Shared
//! services live on [`App`].

pub mod auth;
pub mod chessmaster;
pub mod in_game;
pub mod main_menu;
pub mod pause;

use std::path::Path;
use std::rc::Rc;

use chrono::Local;
use shakmaty::Color;
use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::error::GameResult;
use crate::core::palette::Palette;
use crate::game::archive::GameArchive;
use crate::game::log::{reconstruct, GameLog, ParsedGame};
use crate::game::outcome::color_name;
use crate::game::players::{EngineLauncher, PlayerFactory, PlayerRegistry, ProcessLauncher};
use crate::game::position::ChessPosition;
use crate::game::practice::{self, PracticePosition};
use crate::game::session::{Seat, Session};
use crate::game::stats::StatsBook;
use crate::game::strategy::StrategyChoice;
use crate::game::turn::TurnLoop;
use crate::networking::auth::AuthClient;
use crate::networking::completion::{CompletionClient, DisabledCompletion, OpenRouterClient};
use crate::networking::expert::ExpertService;
use crate::ui::board;
use crate::ui::console::Console;
use crate::ui::menus;

/// Where the application goes next
pub enum AppState {
    Auth,
    MainMenu,
    InGame(Box<TurnLoop>),
    Exit,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppState::Auth => write!(f, "Auth"),
            AppState::MainMenu => write!(f, "MainMenu"),
            AppState::InGame(_) => write!(f, "InGame"),
            AppState::Exit => write!(f, "Exit"),
        }
    }
}

/// Result of picking a game to play from a list
pub enum Selection {
    Game(Box<TurnLoop>),
    Back,
    Quit,
}

/// Logged-in user for this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub username: String,
    pub token: String,
}

/// Services shared by every state
pub struct App {
    pub config: AppConfig,
    pub palette: Palette,
    pub factory: PlayerFactory,
    pub archive: GameArchive,
    pub stats: StatsBook,
    pub expert: ExpertService,
    pub practice: Vec<PracticePosition>,
    pub auth: Option<AuthClient>,
    pub user: Option<UserSession>,
}

impl App {
    /// Wire up real services from configuration
    ///
    /// `offline` disables the completion client and the auth service.
    pub fn new(config: AppConfig, palette: Palette, offline: bool) -> Self {
        let completion: Rc<dyn CompletionClient> = if offline {
            Rc::new(DisabledCompletion {
                reason: "AI models are disabled in offline mode".to_string(),
            })
        } else {
            match OpenRouterClient::from_settings(&config.ai) {
                Some(client) => Rc::new(client),
                None => {
                    warn!(
                        "[CONFIG] {} is not set; AI players and the expert are unavailable",
                        config.ai.api_key_env
                    );
                    Rc::new(DisabledCompletion {
                        reason: format!("no API key in {}", config.ai.api_key_env),
                    })
                }
            }
        };
        let launcher: Rc<dyn EngineLauncher> =
            Rc::new(ProcessLauncher::new(config.resolved_engine_path()));

        let auth = (!offline && config.require_login)
            .then(|| AuthClient::from_env_or(&config.auth_service_url));

        Self::with_services(config, palette, completion, launcher, auth)
    }

    /// Build from explicit services
    pub fn with_services(
        config: AppConfig,
        palette: Palette,
        completion: Rc<dyn CompletionClient>,
        launcher: Rc<dyn EngineLauncher>,
        auth: Option<AuthClient>,
    ) -> Self {
        let registry = PlayerRegistry::from_config(&config);
        let factory = PlayerFactory::new(
            registry,
            config.ai.clone(),
            Rc::clone(&completion),
            launcher,
        );
        let expert = ExpertService::new(
            completion,
            config.expert_model.clone(),
            config.ai.temperature,
            &config.docs_dir,
        );
        let practice = practice::load_configured(config.practice_file.as_deref())
            .unwrap_or_else(|err| {
                warn!("[PRACTICE] {}; using the built-in positions", err);
                practice::builtin().unwrap_or_default()
            });

        Self {
            archive: GameArchive::new(&config.log_dir),
            stats: StatsBook::load(config.stats_path()),
            palette,
            factory,
            expert,
            practice,
            auth,
            user: None,
            config,
        }
    }

    /// Run states until one returns [`AppState::Exit`]
    pub fn run(&mut self, console: &mut dyn Console) {
        let mut state = if self.auth.is_some() {
            AppState::Auth
        } else {
            AppState::MainMenu
        };
        loop {
            info!("[STATE] Entering {:?}", state);
            state = match state {
                AppState::Auth => auth::run(self, console),
                AppState::MainMenu => main_menu::run(self, console),
                AppState::InGame(turn_loop) => in_game::run(self, console, *turn_loop),
                AppState::Exit => break,
            };
        }
        if let (Some(client), Some(user)) = (&self.auth, self.user.take()) {
            client.logout(&user.token);
        }
    }

    /// Print an error in the palette's error colour
    pub fn report(&self, console: &mut dyn Console, message: &str) {
        console.print(&self.palette.error(message));
    }

    /// Create the player for `key`, asking humans for a name
    fn seat(
        &self,
        console: &mut dyn Console,
        key: &str,
        color: Color,
        strategy: Option<String>,
    ) -> GameResult<Seat> {
        let spec = self.factory.registry().resolve(key)?;
        let name = if spec.kind.is_human() {
            let fallback = format!("{} Player", color_name(color));
            Some(menus::ask_player_name(console, &self.palette, color_name(color), &fallback))
        } else {
            None
        };
        let player = self.factory.create(key, name.as_deref())?;
        Ok(Seat::new(player, strategy))
    }

    /// Fresh game from the standard start
    pub fn start_game(
        &self,
        console: &mut dyn Console,
        white_key: &str,
        black_key: &str,
        strategy: StrategyChoice,
    ) -> GameResult<TurnLoop> {
        let white = self.seat(console, white_key, Color::White, strategy.white_instruction())?;
        let black = self.seat(console, black_key, Color::Black, strategy.black_instruction())?;
        Ok(self.begin(Session::new(white, black)))
    }

    /// Fresh game from a practice position
    pub fn start_practice(
        &self,
        console: &mut dyn Console,
        position: &PracticePosition,
        white_key: &str,
        black_key: &str,
    ) -> GameResult<TurnLoop> {
        let fen = position.position()?.fen();
        let white = self.seat(console, white_key, Color::White, None)?;
        let black = self.seat(console, black_key, Color::Black, None)?;
        info!("[PRACTICE] Starting from '{}'", position.name);
        Ok(self.begin(Session::from_fen(white, black, &fen)?))
    }

    fn begin(&self, session: Session) -> TurnLoop {
        let date = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        TurnLoop::start(session, &date, self.config.no_move_policy)
    }

    /// Read and check a saved game
    pub fn read_saved(&self, path: &Path) -> GameResult<ParsedGame> {
        let text = self.archive.read(path)?;
        reconstruct(&text, self.factory.registry())
    }

    /// Continue a reconstructed game
    pub fn resume_game(&self, game: ParsedGame) -> GameResult<TurnLoop> {
        let log = GameLog::resume(&game.header, &game.moves);
        let session = game.into_session(&self.factory)?;
        Ok(TurnLoop::new(session, log, self.config.no_move_policy))
    }

    /// Let the user pick a saved game to continue
    ///
    /// Finished games are shown and not resumed.
    pub fn pick_saved_game(&self, console: &mut dyn Console) -> Selection {
        let summaries = match self.archive.summaries() {
            Ok(summaries) => summaries,
            Err(err) => {
                self.report(console, &format!("Could not list saved games: {err}"));
                return Selection::Back;
            }
        };
        let index = match menus::choose_saved_game(console, &self.palette, &summaries) {
            menus::ListChoice::Pick(index) => index,
            menus::ListChoice::Back => return Selection::Back,
            menus::ListChoice::Quit => return Selection::Quit,
        };

        let summary = &summaries[index];
        let game = match self.read_saved(&summary.path) {
            Ok(game) => game,
            Err(err) => {
                self.report(console, &format!("Could not load {}: {err}", summary.filename));
                return Selection::Back;
            }
        };
        if let Some(outcome) = game.outcome {
            if let Ok(position) = ChessPosition::from_fen(&game.resumed_fen) {
                let last = game.moves.last().map(|m| m.uci.as_str());
                console.print(&board::render(&position, last, &self.palette));
            }
            console.print(&self.palette.highlight(&format!(
                "This game is already over: {}",
                outcome.message()
            )));
            return Selection::Back;
        }

        match self.resume_game(game) {
            Ok(turn_loop) => {
                console.print(&self.palette.success(&format!("Loaded {}", summary.filename)));
                Selection::Game(Box::new(turn_loop))
            }
            Err(err) => {
                self.report(console, &format!("Could not resume {}: {err}", summary.filename));
                Selection::Back
            }
        }
    }

    /// Let the user pick a practice position and players
    pub fn pick_practice(&self, console: &mut dyn Console) -> Selection {
        let index = match menus::choose_practice_position(console, &self.palette, &self.practice) {
            menus::ListChoice::Pick(index) => index,
            menus::ListChoice::Back => return Selection::Back,
            menus::ListChoice::Quit => return Selection::Quit,
        };
        let position = &self.practice[index];
        if let Err(err) = position.position() {
            self.report(console, &format!("'{}' is not playable: {err}", position.name));
            return Selection::Back;
        }

        let Some((white_key, black_key)) =
            menus::choose_players(console, &self.palette, self.factory.registry())
        else {
            return Selection::Quit;
        };
        match self.start_practice(console, position, &white_key, &black_key) {
            Ok(turn_loop) => Selection::Game(Box::new(turn_loop)),
            Err(err) => {
                self.report(console, &format!("Could not start practice: {err}"));
                Selection::Back
            }
        }
    }

    /// Ask the expert and print the answer
    pub fn ask_expert(&self, console: &mut dyn Console, question: &str) {
        console.print(&self.palette.prompt("Consulting the chess expert..."));
        match self.expert.ask(question) {
            Ok(answer) => console.print(&answer),
            Err(err) => self.report(console, &format!("Sorry, I couldn't get an answer. {err}")),
        }
    }
}
