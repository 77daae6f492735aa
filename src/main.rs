use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use chess_arena::core::{init_tracing, startup_subscriber, AppConfig, LoggingOptions, Palette};
use chess_arena::game::log::reconstruct;
use chess_arena::game::players::PlayerRegistry;
use chess_arena::game::position::ChessPosition;
use chess_arena::states::App;
use chess_arena::ui::board;
use chess_arena::ui::menus::render_stats;
use chess_arena::ui::StdConsole;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for game logs, stats and debug.log
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Skip login and disable AI models
    #[arg(long)]
    offline: bool,

    /// Plain output without ANSI colours
    #[arg(long)]
    no_color: bool,

    /// More diagnostics on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Play interactively (default)
    Play,
    /// Rebuild a game from its log and show where it stands
    Replay {
        /// Game log to read
        file: PathBuf,
    },
    /// List saved games
    Games,
    /// Show player statistics
    Stats,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let palette = Palette::detect(args.no_color);

    let startup = startup_subscriber(args.verbose, !palette.is_plain());
    let mut config = tracing::subscriber::with_default(startup, || {
        AppConfig::load(args.config.as_deref())
    })
    .context("loading configuration")?;
    if let Some(dir) = &args.log_dir {
        config.log_dir = dir.clone();
    }

    let _guard = init_tracing(&LoggingOptions {
        log_dir: config.log_dir.clone(),
        verbosity: args.verbose,
        ansi: !palette.is_plain(),
    })
    .with_context(|| format!("creating log directory {:?}", config.log_dir))?;
    info!("[CONFIG] Log directory {:?}", config.log_dir);

    match args.command.clone().unwrap_or(Command::Play) {
        Command::Play => {
            let mut app = App::new(config, palette, args.offline);
            app.run(&mut StdConsole);
        }
        Command::Replay { file } => replay(&config, &palette, &file)?,
        Command::Games => {
            let app = App::new(config, palette, true);
            let games = app.archive.summaries().context("listing saved games")?;
            if games.is_empty() {
                println!("No saved games in {}", app.archive.dir().display());
            }
            for game in games {
                println!(
                    "{} | {} vs {} | {} | {} moves | {}",
                    game.date, game.white, game.black, game.status, game.moves, game.filename
                );
            }
        }
        Command::Stats => {
            let app = App::new(config, palette, true);
            println!("{}", render_stats(&app.stats, &app.palette));
        }
    }
    Ok(())
}

fn replay(config: &AppConfig, palette: &Palette, file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file).with_context(|| format!("reading {file:?}"))?;
    let registry = PlayerRegistry::from_config(config);
    let game = reconstruct(&text, &registry).with_context(|| format!("replaying {file:?}"))?;

    println!("{}", palette.title(&format!("{} - {}", game.header.event, game.header.date)));
    println!(
        "White: {} ({}, {})",
        game.header.white,
        game.header.white_key,
        game.white_kind.describe()
    );
    println!(
        "Black: {} ({}, {})",
        game.header.black,
        game.header.black_key,
        game.black_kind.describe()
    );
    for record in &game.moves {
        println!("{}. {}: {} ({})", record.number, record.player, record.san, record.uci);
    }

    let position = ChessPosition::from_fen(&game.resumed_fen)?;
    let last = game.moves.last().map(|m| m.uci.as_str());
    println!("{}", board::render(&position, last, palette));
    println!("FEN: {}", game.resumed_fen);
    match game.outcome {
        Some(outcome) => println!("{}", palette.highlight(&outcome.message())),
        None => println!("Game in progress."),
    }
    Ok(())
}
