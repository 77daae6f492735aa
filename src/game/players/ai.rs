//! AI player backed by a chat-completion model
//!
//! The model gets the position as FEN plus the legal moves and is asked for a
//! single coordinate move. The reply is free text, so the first token that
//! looks like a coordinate move is taken and checked for legality. Any
//! failure ends as [`PlayerAction::NoMove`]; there is no random fallback.

use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::core::config::AiSettings;
use crate::core::error::{GameError, GameResult};
use crate::game::players::{MoveContext, Player, PlayerAction, PlayerKind};
use crate::game::position::ChessPosition;
use crate::networking::completion::{ChatMessage, ChatRequest, CompletionClient};
use crate::ui::console::Console;

static UCI_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-h][1-8][a-h][1-8][qrbn]?").expect("valid regex"));

const SYSTEM_PROMPT: &str =
    "You are a helpful chess assistant that provides moves in UCI format.";

/// First coordinate-move-like substring of a model reply
///
/// Matching is case-insensitive on input but the result is lowercase.
pub fn extract_uci_move(reply: &str) -> Option<String> {
    let lowered = reply.to_ascii_lowercase();
    UCI_TOKEN.find(&lowered).map(|m| m.as_str().to_string())
}

/// Prompt asking the model for one move
pub fn build_move_prompt(position: &ChessPosition, strategy: Option<&str>) -> String {
    let strategy_line = strategy
        .map(|s| format!(" Your designated strategy is: {s}."))
        .unwrap_or_default();
    format!(
        "You are a deterministic chess move selector.{strategy_line}\n\
         Analyze the position deeply, pick the best move by searching at least 3 moves ahead using minimax principles.\n\
         The current board state in FEN is:\n\
         {fen}\n\n\
         The legal moves are: {moves}.\n\
         Your task is to select the absolute best possible move from the list of legal moves.\n\
         Respond with only the chosen move in UCI notation (e.g., 'e2e4').",
        fen = position.fen(),
        moves = position.legal_uci_moves().join(", "),
    )
}

pub struct AiPlayer {
    key: String,
    name: String,
    kind: PlayerKind,
    model: String,
    settings: AiSettings,
    client: Rc<dyn CompletionClient>,
}

impl AiPlayer {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        model: String,
        settings: AiSettings,
        client: Rc<dyn CompletionClient>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind: PlayerKind::Ai {
                model: model.clone(),
            },
            model,
            settings,
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, ctx: &MoveContext<'_>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_move_prompt(ctx.position, ctx.strategy)),
            ],
            temperature: self.settings.temperature,
            max_tokens: Some(self.settings.max_tokens),
        }
    }

    /// One completion round trip, returning a legal move or the reason there is none
    fn attempt(&self, ctx: &MoveContext<'_>) -> GameResult<String> {
        let reply = self.client.complete(&self.request(ctx))?;
        let candidate = extract_uci_move(&reply)
            .ok_or_else(|| GameError::AiParseFailure {
                reply: reply.clone(),
            })?;
        if ctx.position.is_legal_uci(&candidate) {
            Ok(candidate)
        } else {
            Err(GameError::IllegalMove {
                input: candidate,
                fen: ctx.position.fen(),
            })
        }
    }
}

impl Player for AiPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn kind(&self) -> &PlayerKind {
        &self.kind
    }

    fn get_move(
        &mut self,
        ctx: &MoveContext<'_>,
        _console: &mut dyn Console,
    ) -> GameResult<PlayerAction> {
        let attempts = self.settings.max_attempts.max(1);
        for attempt in 1..=attempts {
            match self.attempt(ctx) {
                Ok(uci) => {
                    info!("[AI] {} chose {}", self.model, uci);
                    return Ok(PlayerAction::Move(uci));
                }
                Err(err) => {
                    warn!(
                        "[AI] {} attempt {}/{} failed: {}",
                        self.model, attempt, attempts, err
                    );
                }
            }
        }
        Ok(PlayerAction::NoMove)
    }
}
