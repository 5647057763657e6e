//! Colour helpers for terminal output.
//!
//! Colour is decided once, via [`Palette::detect`], and the palette is then passed to whatever writes output.
//! ```
//! use teenycli::term::Palette;
//!
//! let palette = Palette::plain();
//! assert_eq!(palette.red("boom"), "boom");
//! assert_eq!(palette.error_message("it broke"), "Error: it broke");
//! ```
use std::io::IsTerminal;

const RED: u8 = 31;
const GREEN: u8 = 32;
const YELLOW: u8 = 33;
const CYAN: u8 = 36;

/// Whether (and how) to colour text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    color: bool,
}

impl Palette {
    /// Detect colour support from the environment.
    ///
    /// Colour is disabled if `NO_COLOR` is set (to anything, see <https://no-color.org/>),
    /// or if either stdout or stderr is not a terminal.
    pub fn detect() -> Self {
        Self::from_env(
            std::env::var_os("NO_COLOR").is_some(),
            std::io::stdout().is_terminal(),
            std::io::stderr().is_terminal(),
        )
    }

    /// Decide colour support from already gathered facts about the environment.
    pub fn from_env(no_color: bool, stdout_tty: bool, stderr_tty: bool) -> Self {
        Self::new(!no_color && stdout_tty && stderr_tty)
    }

    /// A palette that never colours.
    pub fn plain() -> Self {
        Self::new(false)
    }

    /// A palette that always colours.
    pub fn colored() -> Self {
        Self::new(true)
    }

    fn new(color: bool) -> Self {
        Self { color }
    }

    /// Whether this palette colours text.
    pub fn is_colored(&self) -> bool {
        self.color
    }

    fn paint(&self, text: &str, code: u8) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Paint `text` red.
    pub fn red(&self, text: &str) -> String {
        self.paint(text, RED)
    }

    /// Paint `text` yellow.
    pub fn yellow(&self, text: &str) -> String {
        self.paint(text, YELLOW)
    }

    /// Paint `text` cyan.
    pub fn cyan(&self, text: &str) -> String {
        self.paint(text, CYAN)
    }

    /// Paint `text` green.
    pub fn green(&self, text: &str) -> String {
        self.paint(text, GREEN)
    }

    /// The line printed by [`Palette::error`].
    pub fn error_message(&self, message: &str) -> String {
        format!("{}: {message}", self.red("Error"))
    }

    /// The line printed by [`Palette::warn`].
    pub fn warn_message(&self, message: &str) -> String {
        format!("{}: {message}", self.yellow("Warning"))
    }

    /// Print `Error: {message}` to stderr.
    pub fn error(&self, message: &str) {
        eprintln!("{}", self.error_message(message));
    }

    /// Print `Warning: {message}` to stderr.
    pub fn warn(&self, message: &str) {
        eprintln!("{}", self.warn_message(message));
    }

    /// Print `Error: {message}` to stderr, then exit with `1`.
    pub fn bail(&self, message: &str) -> ! {
        self.error(message);
        std::process::exit(1)
    }
}
