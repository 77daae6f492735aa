//! Networking Integration Tests
//!
//! Tests for everything that talks to a remote model:
//! - Pulling a coordinate move out of free-text replies
//! - AI players turning replies into actions
//! - The expert's numbered answers file
//! - Joke, fun fact and news collections

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use chess_arena::core::config::AiSettings;
use chess_arena::core::error::{GameError, GameResult};
use chess_arena::game::players::{
    extract_uci_move, AiPlayer, MoveContext, Player, PlayerAction,
};
use chess_arena::game::position::ChessPosition;
use chess_arena::networking::completion::{ChatRequest, CompletionClient};
use chess_arena::networking::expert::{Collection, ExpertService, ANSWERS_FILE, NEWS_FILE};
use chess_arena::networking::AuthClient;
use chess_arena::ui::console::ScriptedConsole;
use chrono::{TimeZone, Utc};
use shakmaty::Color;

/// Replays scripted replies and counts requests
struct ScriptedClient {
    replies: RefCell<Vec<GameResult<String>>>,
    calls: RefCell<u32>,
}

impl ScriptedClient {
    fn new(replies: Vec<GameResult<String>>) -> Rc<Self> {
        Rc::new(Self {
            replies: RefCell::new(replies.into_iter().rev().collect()),
            calls: RefCell::new(0),
        })
    }
}

impl CompletionClient for ScriptedClient {
    fn complete(&self, _request: &ChatRequest) -> GameResult<String> {
        *self.calls.borrow_mut() += 1;
        self.replies.borrow_mut().pop().unwrap_or_else(|| {
            Err(GameError::AiRequest {
                message: "script exhausted".to_string(),
            })
        })
    }
}

fn ai_player(client: Rc<ScriptedClient>, attempts: u32) -> AiPlayer {
    let settings = AiSettings {
        max_attempts: attempts,
        ..AiSettings::default()
    };
    AiPlayer::new("m1", "openai/gpt-4o", "openai/gpt-4o".to_string(), settings, client)
}

fn ask(player: &mut AiPlayer, position: &ChessPosition) -> PlayerAction {
    let ctx = MoveContext {
        position,
        strategy: None,
        color: position.turn(),
    };
    player
        .get_move(&ctx, &mut ScriptedConsole::default())
        .expect("ai players report failure as NoMove")
}

// ============================================================================
// Reply Parsing
// ============================================================================

#[test]
fn test_move_found_in_prose() {
    assert_eq!(
        extract_uci_move("I think e2e4 is best"),
        Some("e2e4".to_string())
    );
    assert_eq!(
        extract_uci_move("Promote with E7E8Q!"),
        Some("e7e8q".to_string())
    );
}

#[test]
fn test_reply_without_move() {
    assert_eq!(extract_uci_move("I think the king's pawn is best"), None);
    assert_eq!(extract_uci_move("Nf3"), None);
    assert_eq!(extract_uci_move(""), None);
}

// ============================================================================
// AI Players
// ============================================================================

#[test]
fn test_ai_player_returns_legal_move() {
    let client = ScriptedClient::new(vec![Ok("Let's go with g1f3.".to_string())]);
    let mut player = ai_player(Rc::clone(&client), 1);
    let action = ask(&mut player, &ChessPosition::new());
    assert_eq!(action, PlayerAction::Move("g1f3".to_string()));
    assert_eq!(*client.calls.borrow(), 1);
}

#[test]
fn test_ai_player_retries_within_turn() {
    //! A bad reply uses up one attempt; the next good reply is played
    let client = ScriptedClient::new(vec![
        Ok("e2e5".to_string()),
        Err(GameError::AiRequest {
            message: "timeout".to_string(),
        }),
        Ok("d2d4".to_string()),
    ]);
    let mut player = ai_player(Rc::clone(&client), 3);
    let action = ask(&mut player, &ChessPosition::new());
    assert_eq!(action, PlayerAction::Move("d2d4".to_string()));
    assert_eq!(*client.calls.borrow(), 3);
}

#[test]
fn test_ai_player_gives_no_move() {
    //! No random fallback when every attempt fails
    let client = ScriptedClient::new(vec![
        Ok("resign".to_string()),
        Ok("a1a8".to_string()),
    ]);
    let mut player = ai_player(Rc::clone(&client), 2);
    let position = ChessPosition::new();
    assert_eq!(position.turn(), Color::White);
    assert_eq!(ask(&mut player, &position), PlayerAction::NoMove);
}

// ============================================================================
// Expert Answers
// ============================================================================

#[test]
fn test_expert_answers_are_numbered() {
    let dir = tempfile::tempdir().expect("temp dir");
    let client = ScriptedClient::new(vec![
        Ok("Paul Morphy.".to_string()),
        Ok("1851.".to_string()),
    ]);
    let expert = ExpertService::new(client, "openai/gpt-4o", 0.7, dir.path());

    assert_eq!(expert.ask("Who was the best?").expect("answer"), "Paul Morphy.");
    assert_eq!(expert.ask("When was the first tournament?").expect("answer"), "1851.");

    let text = fs::read_to_string(dir.path().join(ANSWERS_FILE)).expect("answers file");
    assert!(text.contains("#### Question 1\n"));
    assert!(text.contains("#### Question 2\n**Asked:** "));
    assert!(text.contains("**Question:** When was the first tournament?"));
}

#[test]
fn test_expert_numbering_continues_existing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(
        dir.path().join(ANSWERS_FILE),
        "# Answers\n\n#### Question 7\n**Question:** old\n\n---\n\n",
    )
    .expect("seed");
    let expert = ExpertService::new(ScriptedClient::new(Vec::new()), "m", 0.7, dir.path());

    let asked = Utc.with_ymd_and_hms(2026, 5, 1, 12, 30, 0).single().expect("valid time");
    let number = expert.record_answer("new?", "yes", asked).expect("recorded");
    assert_eq!(number, 8);

    let text = fs::read_to_string(expert.answers_path()).expect("answers file");
    assert!(text.contains("**Asked:** 2026-05-01 12:30:00 UTC"));
}

#[test]
fn test_expert_failure_is_not_recorded() {
    let dir = tempfile::tempdir().expect("temp dir");
    let expert = ExpertService::new(ScriptedClient::new(Vec::new()), "m", 0.7, dir.path());
    assert!(expert.ask("anything?").is_err());
    assert!(!expert.answers_path().exists());
}

#[test]
fn test_repeated_joke_is_kept_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    let joke = "Why do chess players hate pizza? Too many checks.";
    let client = ScriptedClient::new(vec![
        Ok(joke.to_string()),
        Ok(format!("  {}  ", joke.to_uppercase())),
    ]);
    let expert = ExpertService::new(client, "m", 0.7, dir.path());

    assert_eq!(expert.chess_joke().expect("first"), joke);
    assert!(expert.chess_joke().is_ok());

    let text = fs::read_to_string(expert.collection_path(Collection::Jokes)).expect("jokes file");
    assert!(text.starts_with("# Chess Jokes"));
    assert_eq!(text.matches("### ").count(), 1);
    assert!(text.contains("### 1. "));
}

#[test]
fn test_fun_facts_are_numbered() {
    let dir = tempfile::tempdir().expect("temp dir");
    let client = ScriptedClient::new(vec![
        Ok("Bishops were once called elephants.".to_string()),
        Ok("The folding board was invented by a priest.".to_string()),
    ]);
    let expert = ExpertService::new(client, "m", 0.7, dir.path());
    expert.fun_fact().expect("first fact");
    expert.fun_fact().expect("second fact");

    let text =
        fs::read_to_string(expert.collection_path(Collection::FunFacts)).expect("facts file");
    assert!(text.contains("### 1. "));
    assert!(text.contains("### 2. "));
    assert!(text.contains("Bishops were once called elephants."));
}

#[test]
fn test_news_goes_to_its_own_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let client = ScriptedClient::new(vec![Ok("The candidates tournament begins.".to_string())]);
    let expert = ExpertService::new(client, "m", 0.7, dir.path());

    assert_eq!(expert.latest_news().expect("news"), "The candidates tournament begins.");
    let text = fs::read_to_string(dir.path().join(NEWS_FILE)).expect("news file");
    assert!(text.contains("The candidates tournament begins.\n\n---"));
    assert!(!expert.answers_path().exists());
}

#[test]
fn test_opening_advice_is_kept_with_answers() {
    let dir = tempfile::tempdir().expect("temp dir");
    let client = ScriptedClient::new(vec![Ok("Control the centre.".to_string())]);
    let expert = ExpertService::new(client, "m", 0.7, dir.path());

    assert_eq!(expert.opening_advice().expect("advice"), "Control the centre.");
    let text = fs::read_to_string(expert.answers_path()).expect("answers file");
    assert!(text.contains("#### Question 1\n"));
    assert!(text.contains("Control the centre."));
}

#[test]
fn test_puzzle_holds_back_its_solution() {
    let dir = tempfile::tempdir().expect("temp dir");
    let client = ScriptedClient::new(vec![Ok(
        "Black to move.\nFEN: 3r2k1/5ppp/8/8/8/8/5PPP/6K1 b - - 0 1\nSolution: Rd1#".to_string(),
    )]);
    let expert = ExpertService::new(client, "m", 0.7, dir.path());

    let puzzle = expert.tactical_puzzle().expect("puzzle");
    assert!(!puzzle.statement.contains("Rd1#"));
    assert_eq!(puzzle.solution.as_deref(), Some("Rd1#"));
    let fen = puzzle.fen.expect("fen line");
    assert!(ChessPosition::from_fen(&fen).is_ok());
}

// ============================================================================
// Auth Client
// ============================================================================

#[test]
fn test_unreachable_auth_service_fails_softly() {
    let client = AuthClient::new("http://127.0.0.1:9/");
    assert_eq!(client.base_url(), "http://127.0.0.1:9");
    assert!(!client.health());
    let outcome = client.login("alice", "password123");
    assert!(!outcome.success);
    assert!(!outcome.message.is_empty());
}
