//! Console formatting context
//!
//! Every renderer receives a [`Palette`] explicitly. There are no colour
//! constants elsewhere in the crate.

/// ANSI escape sequences used by the console renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub title: &'static str,
    pub highlight: &'static str,
    pub error: &'static str,
    pub success: &'static str,
    pub prompt: &'static str,
    pub light_square: &'static str,
    pub dark_square: &'static str,
    pub last_move: &'static str,
    pub reset: &'static str,
}

impl Palette {
    /// Colours for a terminal that understands ANSI
    pub fn ansi() -> Self {
        Self {
            title: "\x1b[1;36m",
            highlight: "\x1b[1;33m",
            error: "\x1b[31m",
            success: "\x1b[32m",
            prompt: "\x1b[1;34m",
            light_square: "\x1b[47;30m",
            dark_square: "\x1b[100;30m",
            last_move: "\x1b[43;30m",
            reset: "\x1b[0m",
        }
    }

    /// No escape sequences at all
    pub fn plain() -> Self {
        Self {
            title: "",
            highlight: "",
            error: "",
            success: "",
            prompt: "",
            light_square: "",
            dark_square: "",
            last_move: "",
            reset: "",
        }
    }

    /// Pick a palette from the `--no-color` flag and the `NO_COLOR` convention
    pub fn detect(no_color_flag: bool) -> Self {
        let env_disabled = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        if no_color_flag || env_disabled {
            Self::plain()
        } else {
            Self::ansi()
        }
    }

    pub fn is_plain(&self) -> bool {
        self.reset.is_empty()
    }

    pub fn title(&self, text: &str) -> String {
        self.paint(self.title, text)
    }

    pub fn error(&self, text: &str) -> String {
        self.paint(self.error, text)
    }

    pub fn success(&self, text: &str) -> String {
        self.paint(self.success, text)
    }

    pub fn highlight(&self, text: &str) -> String {
        self.paint(self.highlight, text)
    }

    pub fn prompt(&self, text: &str) -> String {
        self.paint(self.prompt, text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if code.is_empty() {
            text.to_string()
        } else {
            format!("{code}{text}{}", self.reset)
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::ansi()
    }
}
