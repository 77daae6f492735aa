//! Engine-backed player speaking UCI to a local process
//!
//! The engine is started on the first move request, configured with the
//! player's UCI options and then asked for one move per turn with a fixed
//! `go movetime`. Its reply is trusted as legal.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::core::config::EngineSettings;
use crate::core::error::{GameError, GameResult};
use crate::game::players::{MoveContext, Player, PlayerAction, PlayerKind};
use crate::ui::console::Console;

/// A running engine that can pick moves
pub trait EngineBackend {
    /// Best move for `fen` in coordinate notation, `None` if the engine has none
    fn best_move(&mut self, fen: &str, movetime_ms: u64) -> GameResult<Option<String>>;
}

/// Starts engine backends
pub trait EngineLauncher {
    fn launch(&self, settings: &EngineSettings) -> GameResult<Box<dyn EngineBackend>>;
}

/// Launches [`UciEngine`] processes from a fixed executable path
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    path: String,
}

impl ProcessLauncher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl EngineLauncher for ProcessLauncher {
    fn launch(&self, settings: &EngineSettings) -> GameResult<Box<dyn EngineBackend>> {
        let engine = UciEngine::spawn(&self.path, settings)?;
        Ok(Box::new(engine))
    }
}

/// UCI engine child process
pub struct UciEngine {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl UciEngine {
    /// Start the engine and run the UCI handshake
    pub fn spawn(path: &str, settings: &EngineSettings) -> GameResult<Self> {
        let unavailable = |reason: String| GameError::EngineUnavailable {
            path: path.to_string(),
            reason,
        };

        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| unavailable(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| unavailable("no stdin handle".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| unavailable("no stdout handle".to_string()))?;

        let mut engine = Self {
            child,
            stdin: BufWriter::new(stdin),
            stdout: BufReader::new(stdout),
        };

        engine.send("uci")?;
        engine.wait_for("uciok")?;
        for (name, value) in settings.uci_options() {
            engine.send(&format!("setoption name {name} value {value}"))?;
        }
        engine.send("isready")?;
        engine.wait_for("readyok")?;

        info!("[ENGINE] {} ready ({})", settings.name, path);
        Ok(engine)
    }

    fn send(&mut self, command: &str) -> GameResult<()> {
        debug!("[ENGINE] > {}", command);
        writeln!(self.stdin, "{command}")
            .and_then(|_| self.stdin.flush())
            .map_err(|e| GameError::Engine {
                message: format!("write failed: {e}"),
            })
    }

    fn read_line(&mut self) -> GameResult<String> {
        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .map_err(|e| GameError::Engine {
                message: format!("read failed: {e}"),
            })?;
        if read == 0 {
            return Err(GameError::Engine {
                message: "engine closed its output".to_string(),
            });
        }
        Ok(line.trim().to_string())
    }

    fn wait_for(&mut self, token: &str) -> GameResult<()> {
        loop {
            if self.read_line()? == token {
                return Ok(());
            }
        }
    }
}

impl EngineBackend for UciEngine {
    fn best_move(&mut self, fen: &str, movetime_ms: u64) -> GameResult<Option<String>> {
        self.send(&format!("position fen {fen}"))?;
        self.send(&format!("go movetime {movetime_ms}"))?;
        loop {
            let line = self.read_line()?;
            if line.starts_with("bestmove") {
                debug!("[ENGINE] < {}", line);
                return Ok(parse_bestmove(&line));
            }
        }
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.send("quit");
        if !stop_child(&mut self.child, QUIT_GRACE) {
            warn!("[ENGINE] Engine ignored quit; killed it");
        }
    }
}

/// How long an engine gets to exit after `quit`
const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Wait up to `grace` for `child` to exit, then kill it
///
/// Returns `true` when the child exited on its own.
fn stop_child(child: &mut Child, grace: Duration) -> bool {
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return true,
            Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
            _ => break,
        }
    }
    let _ = child.kill();
    let _ = child.wait();
    false
}

/// Move from a `bestmove` line; `(none)` and `0000` mean no move
pub fn parse_bestmove(line: &str) -> Option<String> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return None;
    }
    parts
        .next()
        .filter(|mv| *mv != "(none)" && *mv != "0000")
        .map(str::to_string)
}

pub struct EngineBackedPlayer {
    key: String,
    name: String,
    kind: PlayerKind,
    settings: EngineSettings,
    launcher: Rc<dyn EngineLauncher>,
    engine: Option<Box<dyn EngineBackend>>,
}

impl EngineBackedPlayer {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        settings: EngineSettings,
        launcher: Rc<dyn EngineLauncher>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            kind: PlayerKind::Engine(settings.clone()),
            settings,
            launcher,
            engine: None,
        }
    }

    fn engine(&mut self) -> GameResult<&mut Box<dyn EngineBackend>> {
        if self.engine.is_none() {
            self.engine = Some(self.launcher.launch(&self.settings)?);
        }
        self.engine.as_mut().ok_or_else(|| GameError::Engine {
            message: "engine not running".to_string(),
        })
    }
}

impl Player for EngineBackedPlayer {
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
        let movetime = self.settings.movetime_ms;
        let fen = ctx.position.fen();
        let result = self.engine()?.best_move(&fen, movetime);

        match result {
            Ok(Some(uci)) => {
                info!("[ENGINE] {} plays {}", self.name, uci);
                Ok(PlayerAction::Move(uci))
            }
            Ok(None) => Ok(PlayerAction::NoMove),
            Err(err) => {
                // The process is in an unknown state; restart it next turn.
                warn!("[ENGINE] {} failed: {}", self.name, err);
                self.engine = None;
                Err(err)
            }
        }
    }
}
