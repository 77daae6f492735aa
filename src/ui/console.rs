//! Line-oriented console access
//!
//! Everything that talks to the user goes through [`Console`], so the game
//! flow can be driven by a [`ScriptedConsole`] in tests.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Line-based user interaction
pub trait Console {
    /// Show `prompt` and read one line without its terminator
    ///
    /// `None` means input is closed (EOF or a read error).
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Write a line of output
    fn print(&mut self, text: &str);
}

/// Console backed by stdin/stdout
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{prompt}");
        let _ = stdout.flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    fn print(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Console that replays canned input and records output
#[derive(Debug, Default, Clone)]
pub struct ScriptedConsole {
    inputs: VecDeque<String>,
    /// Prompts shown, in order
    pub prompts: Vec<String>,
    /// Lines printed, in order
    pub output: Vec<String>,
}

impl ScriptedConsole {
    pub fn new<I, S>(inputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Input lines not consumed yet
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }

    /// Whether any printed line contains `needle`
    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.inputs.pop_front()
    }

    fn print(&mut self, text: &str) {
        self.output.push(text.to_string());
    }
}
