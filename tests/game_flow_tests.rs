//! Game Flow Integration Tests
//!
//! Tests for full game flows through the turn loop:
//! - Every legal move appends exactly one log line
//! - Rejected input leaves the game untouched
//! - Board-decided endings and the no-move policy

use std::rc::Rc;

use chess_arena::core::config::AiSettings;
use chess_arena::core::error::{GameError, GameResult};
use chess_arena::game::outcome::GameOutcome;
use chess_arena::game::players::{AiPlayer, HumanPlayer, PlayerAction};
use chess_arena::game::position::ChessPosition;
use chess_arena::game::session::{Seat, Session};
use chess_arena::game::turn::{NoMovePolicy, QuitChoice, TurnLoop, TurnState};
use chess_arena::networking::completion::{ChatRequest, CompletionClient};
use chess_arena::ui::console::ScriptedConsole;
use shakmaty::Color;

const DATE: &str = "2026-01-01 10:00:00";

fn human(name: &str) -> Seat {
    Seat::new(Box::new(HumanPlayer::new("hu", name)), None)
}

fn humans_from(fen: Option<&str>) -> TurnLoop {
    let session = match fen {
        Some(fen) => Session::from_fen(human("A"), human("B"), fen).expect("valid fen"),
        None => Session::new(human("A"), human("B")),
    };
    TurnLoop::start(session, DATE, NoMovePolicy::default())
}

/// Completion client that always answers with the same text
struct Parrot(&'static str);

impl CompletionClient for Parrot {
    fn complete(&self, _request: &ChatRequest) -> GameResult<String> {
        Ok(self.0.to_string())
    }
}

fn ai(reply: &'static str) -> Seat {
    Seat::new(
        Box::new(AiPlayer::new(
            "m1",
            "openai/gpt-4o",
            "openai/gpt-4o".to_string(),
            AiSettings::default(),
            Rc::new(Parrot(reply)),
        )),
        None,
    )
}

// ============================================================================
// Move Application
// ============================================================================

#[test]
fn test_every_legal_move_appends_one_line() {
    //! From the start and from a middlegame, each legal move changes the
    //! position and adds exactly one line to the log
    let middlegame = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";
    for fen in [None, Some(middlegame)] {
        let template = humans_from(fen);
        let legal = template.session().position().legal_uci_moves();
        assert!(!legal.is_empty());

        for uci in legal {
            let mut turn_loop = humans_from(fen);
            let before_fen = turn_loop.session().position().fen();
            let before_lines = turn_loop.log().lines().len();

            let state = turn_loop
                .submit(PlayerAction::Move(uci.clone()))
                .expect("legal move accepted");
            assert!(matches!(state, TurnState::MoveApplied(_)), "{uci}");
            assert_ne!(turn_loop.session().position().fen(), before_fen, "{uci}");
            assert_eq!(turn_loop.log().lines().len(), before_lines + 1, "{uci}");
        }
    }
}

#[test]
fn test_rejected_moves_leave_game_untouched() {
    let mut turn_loop = humans_from(None);
    let before = turn_loop.log().clone();

    let err = turn_loop
        .submit(PlayerAction::Move("e2e5".to_string()))
        .unwrap_err();
    assert!(matches!(err, GameError::IllegalMove { .. }));

    let err = turn_loop
        .submit(PlayerAction::Move("castle!".to_string()))
        .unwrap_err();
    assert!(matches!(err, GameError::InvalidMoveFormat { .. }));

    assert_eq!(turn_loop.state(), &TurnState::AwaitingMove);
    assert_eq!(turn_loop.log(), &before);
}

#[test]
fn test_turns_alternate() {
    let mut turn_loop = humans_from(None);
    let mut console = ScriptedConsole::new(["e2e4", "e7e5", "Nf3"]);
    for expected in [Color::Black, Color::White, Color::Black] {
        turn_loop.step(&mut console).expect("legal");
        assert_eq!(turn_loop.side_to_move(), expected);
    }
    assert_eq!(turn_loop.session().history().len(), 3);
    assert_eq!(turn_loop.session().history()[2].san, "Nf3");
}

// ============================================================================
// Game Over
// ============================================================================

#[test]
fn test_scholars_mate_ends_game() {
    let mut turn_loop = humans_from(None);
    let mut console =
        ScriptedConsole::new(["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"]);
    while !turn_loop.state().is_terminal() {
        turn_loop.step(&mut console).expect("legal");
    }

    assert_eq!(
        turn_loop.state(),
        &TurnState::GameOver(GameOutcome::Checkmate {
            winner: Color::White
        })
    );
    let lines = turn_loop.log().lines();
    assert_eq!(lines[lines.len() - 2], "[Result \"1-0\"]");
    assert_eq!(lines[lines.len() - 1], "[Termination \"checkmate\"]");
}

#[test]
fn test_stalemate_from_position() {
    //! Black king on h8 stalemated by Qg6
    let mut turn_loop = humans_from(Some("7k/8/5K2/8/8/8/8/6Q1 w - - 0 1"));
    turn_loop
        .submit(PlayerAction::Move("g1g6".to_string()))
        .expect("legal");
    assert_eq!(
        turn_loop.advance(),
        &TurnState::GameOver(GameOutcome::Stalemate)
    );
}

#[test]
fn test_resignation_from_quit_prompt() {
    let mut turn_loop = humans_from(None);
    turn_loop.submit(PlayerAction::Quit).expect("quit");
    assert_eq!(turn_loop.state(), &TurnState::QuitRequested);
    turn_loop.resolve_quit(QuitChoice::Resign);
    assert_eq!(
        turn_loop.state(),
        &TurnState::GameOver(GameOutcome::Resignation {
            loser: Color::White
        })
    );
}

// ============================================================================
// AI Players
// ============================================================================

#[test]
fn test_ai_reply_with_move_is_played() {
    let session = Session::new(ai("I think e2e4 is best"), human("B"));
    let mut turn_loop = TurnLoop::start(session, DATE, NoMovePolicy::default());
    let mut console = ScriptedConsole::default();

    turn_loop.step(&mut console).expect("ai move");
    assert_eq!(turn_loop.session().history()[0].uci, "e2e4");
    assert_eq!(turn_loop.side_to_move(), Color::Black);
}

#[test]
fn test_ai_without_move_forfeits_under_policy() {
    //! "No move" is retried up to the limit, then the side forfeits
    let session = Session::new(ai("I would rather not say."), human("B"));
    let mut turn_loop = TurnLoop::start(session, DATE, NoMovePolicy::Retry { limit: 2 });
    let mut console = ScriptedConsole::default();

    turn_loop.step(&mut console).expect("no move");
    assert_eq!(turn_loop.state(), &TurnState::AwaitingMove);
    assert_eq!(turn_loop.failures(), 1);

    turn_loop.step(&mut console).expect("no move");
    assert_eq!(
        turn_loop.state(),
        &TurnState::GameOver(GameOutcome::Forfeit {
            loser: Color::White
        })
    );
    assert!(console.printed("produced no move"));
    assert!(turn_loop.session().history().is_empty());
}

#[test]
fn test_ai_illegal_move_counts_as_no_move() {
    let session = Session::new(ai("e2e5"), human("B"));
    let mut turn_loop = TurnLoop::start(session, DATE, NoMovePolicy::Forfeit);
    turn_loop
        .step(&mut ScriptedConsole::default())
        .expect("handled");
    assert!(matches!(
        turn_loop.state(),
        TurnState::GameOver(GameOutcome::Forfeit { .. })
    ));
}

#[test]
fn test_decided_position_starts_over() {
    let mate = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    assert!(ChessPosition::from_fen(mate).is_ok());
    let turn_loop = humans_from(Some(mate));
    assert_eq!(
        turn_loop.state(),
        &TurnState::GameOver(GameOutcome::Checkmate {
            winner: Color::Black
        })
    );
}
