mod base;
mod interface;
mod middleware;
mod printer;

pub(crate) use self::base::*;
pub use self::base::{ConfigError, DispatchError};
pub(crate) use self::interface::*;
pub(crate) use self::middleware::*;
pub(crate) use self::printer::*;

/// The tokens of a failed parse, with a marker under the offending token.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ErrorContext {
    offset: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(offset: usize, tokens: &[&str]) -> Self {
        Self {
            offset,
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The marker lands under the start of token `offset`, or just past the final token.
        let indent: usize = self
            .tokens
            .iter()
            .take(self.offset)
            .map(|token| token.chars().count() + 1)
            .sum();
        writeln!(f, "{}", self.tokens.join(" "))?;
        write!(f, "{:indent$}^", "")
    }
}
