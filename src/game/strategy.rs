//! Opening and defence strategies offered at game setup
//!
//! White picks one of five openings (`1`-`5`), Black one of three defences
//! (`a`-`c`). The chosen text is passed to AI players during the opening and
//! recorded in the log header.

/// A named strategy with its menu key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub key: char,
    pub name: &'static str,
    /// Instruction handed to the player
    pub instruction: &'static str,
}

pub const WHITE_OPENINGS: [Strategy; 5] = [
    Strategy { key: '1', name: "Ruy Lopez", instruction: "Play the Ruy Lopez." },
    Strategy { key: '2', name: "Italian Game", instruction: "Play the Italian Game." },
    Strategy { key: '3', name: "Queen's Gambit", instruction: "Play the Queen's Gambit." },
    Strategy { key: '4', name: "London System", instruction: "Play the London System." },
    Strategy { key: '5', name: "King's Gambit", instruction: "Play the King's Gambit." },
];

pub const BLACK_DEFENCES: [Strategy; 3] = [
    Strategy { key: 'a', name: "Sicilian Defense", instruction: "Play the Sicilian Defense." },
    Strategy { key: 'b', name: "French Defense", instruction: "Play the French Defense." },
    Strategy { key: 'c', name: "Caro-Kann Defense", instruction: "Play the Caro-Kann Defense." },
];

pub fn white_opening(key: char) -> Option<&'static Strategy> {
    WHITE_OPENINGS.iter().find(|s| s.key == key)
}

pub fn black_defence(key: char) -> Option<&'static Strategy> {
    BLACK_DEFENCES.iter().find(|s| s.key == key.to_ascii_lowercase())
}

/// Strategies chosen for a game; either side may have none
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrategyChoice {
    pub white: Option<&'static Strategy>,
    pub black: Option<&'static Strategy>,
}

impl StrategyChoice {
    pub fn white_instruction(&self) -> Option<String> {
        self.white.map(|s| s.instruction.to_string())
    }

    pub fn black_instruction(&self) -> Option<String> {
        self.black.map(|s| s.instruction.to_string())
    }
}

/// Parse a setup answer such as `1a`, `3`, `c` or an empty line
///
/// Each character must name a strategy and each side may be chosen once.
pub fn parse_choice(input: &str) -> Option<StrategyChoice> {
    let mut choice = StrategyChoice::default();
    for c in input.chars().filter(|c| !c.is_whitespace()) {
        if let Some(opening) = white_opening(c) {
            if choice.white.replace(opening).is_some() {
                return None;
            }
        } else if let Some(defence) = black_defence(c) {
            if choice.black.replace(defence).is_some() {
                return None;
            }
        } else {
            return None;
        }
    }
    Some(choice)
}
