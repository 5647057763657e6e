use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use super::api::*;
use super::model::*;
use crate::constant::LITERAL_SEPARATOR;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TokenMatcherError {
    #[error("Cannot duplicate the option '{0}'.")]
    DuplicateOption(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum MatchError {
    #[error("Not enough tokens provided to parameter '{0}'.")]
    Undercomplete(String),

    #[error("Too many tokens provided to parameter '{0}'.")]
    Overcomplete(String),

    #[error("No more arguments to match against.")]
    ArgumentsExhausted,

    #[error("Option '{0}' does not exist.")]
    InvalidOption(String),

    #[error("Short option '{0}' does not exist.")]
    InvalidShortOption(char),

    #[error("Option '{0}' is required.")]
    MissingOption(String),
}

impl From<CloseError> for MatchError {
    fn from(error: CloseError) -> Self {
        match error {
            CloseError::TooFewValues { name, .. } => MatchError::Undercomplete(name),
            CloseError::TooManyValues { name, .. } => MatchError::Overcomplete(name),
        }
    }
}

/// Aligns raw Cli tokens to the flags & positionals of a single parser node.
///
/// Tokens are fed one at a time; the matcher never looks ahead.
#[derive(Debug)]
pub(crate) struct TokenMatcher {
    option_bounds: HashMap<String, Bound>,
    // Keyed by the alias without its `--` prefix.
    long_options: HashMap<String, String>,
    // Keyed by the alias without its `-` prefix; single characters may also be bundled.
    single_options: HashMap<String, String>,
    required_options: Vec<(String, String)>,
    arguments: VecDeque<ArgumentConfig>,
    literal: bool,
    fed: usize,
    matches: Vec<MatchTokens>,
    buffer: Option<MatchBuffer>,
}

impl TokenMatcher {
    pub(crate) fn new(
        options: Vec<OptionConfig>,
        arguments: VecDeque<ArgumentConfig>,
    ) -> Result<Self, TokenMatcherError> {
        let mut option_bounds = HashMap::default();
        let mut long_options = HashMap::default();
        let mut single_options = HashMap::default();
        let mut required_options = Vec::default();

        for option_config in options.into_iter() {
            if option_bounds
                .insert(option_config.name().to_string(), option_config.bound())
                .is_some()
            {
                return Err(TokenMatcherError::DuplicateOption(
                    option_config.name().to_string(),
                ));
            }

            for alias in option_config.aliases() {
                let previous = if let Some(long) = alias.strip_prefix("--") {
                    long_options.insert(long.to_string(), option_config.name().to_string())
                } else if let Some(single) = alias.strip_prefix('-') {
                    single_options.insert(single.to_string(), option_config.name().to_string())
                } else {
                    unreachable!("internal error - option alias must start with a hyphen");
                };

                if previous.is_some() {
                    return Err(TokenMatcherError::DuplicateOption(alias.clone()));
                }
            }

            if option_config.required() {
                let display = option_config
                    .aliases()
                    .first()
                    .cloned()
                    .unwrap_or_else(|| option_config.name().to_string());
                required_options.push((option_config.name().to_string(), display));
            }
        }

        Ok(Self {
            option_bounds,
            long_options,
            single_options,
            required_options,
            arguments,
            literal: false,
            fed: 0,
            matches: Vec::default(),
            buffer: None,
        })
    }

    /// Whether `token` is free to select a sub-command, when fed next.
    ///
    /// A token is free when it is positional-like and no open flag would take it as a value.
    pub(crate) fn is_branch_point(&self, token: &str) -> bool {
        if let Some(match_buffer) = &self.buffer {
            if match_buffer.is_open() {
                return false;
            }
        }

        self.literal || !self.is_flag_like(token)
    }

    fn is_flag_like(&self, token: &str) -> bool {
        if !token.starts_with('-') || token.len() == 1 {
            return false;
        }

        // Negative numbers are values, unless a flag was declared to look like one.
        !(is_number(&token[1..])
            && !self
                .single_options
                .keys()
                .any(|k| k.starts_with(|c: char| c.is_ascii_digit())))
    }

    pub(crate) fn feed(&mut self, token: &str) -> Result<(), MatchError> {
        // 1. Everything after the literal separator is an argument.
        // 2. Find a 'long' flag, such as:
        //  --message
        //  --message ..
        //  --message=..
        // 3. Find a single-dash flag, matched either in full or as bundled short flags:
        //  -C
        //  -C ..
        //  -C=..
        //  -lv
        //  -lv=..
        // 4. Match against an argument.
        let result = if self.literal {
            self.match_argument(token)
        } else if token == LITERAL_SEPARATOR {
            self.literal = true;
            self.update_buffer(None)
        } else if !self.is_flag_like(token) {
            self.match_argument(token)
        } else if let Some(long) = token.strip_prefix("--") {
            self.match_option(split_equals_delimiter(long))
        } else {
            self.match_option_single(split_equals_delimiter(&token[1..]))
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Fed token {fed} '{token}': {result:?}.", fed = self.fed);
        }

        self.fed += 1;
        result
    }

    fn match_argument(&mut self, token: &str) -> Result<(), MatchError> {
        let mut match_buffer = match self.buffer.take() {
            Some(match_buffer) if match_buffer.is_open() => match_buffer,
            Some(match_buffer) => {
                // Flip to the next argument.
                let match_tokens = match_buffer.close()?;
                self.matches.push(match_tokens);
                self.next_argument()?
            }
            None => self.next_argument()?,
        };

        match_buffer.push(self.fed, token);
        self.buffer.replace(match_buffer);
        Ok(())
    }

    fn next_argument(&mut self) -> Result<MatchBuffer, MatchError> {
        match self.arguments.pop_front() {
            Some(argument_config) => Ok(MatchBuffer::new(
                argument_config.name(),
                argument_config.bound(),
            )),
            None => Err(MatchError::ArgumentsExhausted),
        }
    }

    fn open_option(
        &mut self,
        name: String,
        single_argument: Option<&str>,
    ) -> Result<(), MatchError> {
        let bound = *self
            .option_bounds
            .get(&name)
            .expect("internal error - mis-aligned option.");
        let mut match_buffer = MatchBuffer::new(name, bound);

        match single_argument {
            Some(value) => {
                match_buffer.push(self.fed, value);
                // Options using k=v syntax cannot follow up with more values afterwards.
                let match_tokens = match_buffer.close()?;
                self.update_buffer(None)?;
                self.matches.push(match_tokens);
                Ok(())
            }
            None => self.update_buffer(Some(match_buffer)),
        }
    }

    fn match_option(
        &mut self,
        (option_name, single_argument): (&str, Option<&str>),
    ) -> Result<(), MatchError> {
        match self.long_options.get(option_name) {
            Some(name) => self.open_option(name.clone(), single_argument),
            None => Err(MatchError::InvalidOption(format!("--{option_name}"))),
        }
    }

    fn match_option_single(
        &mut self,
        (option_name, single_argument): (&str, Option<&str>),
    ) -> Result<(), MatchError> {
        // A declared single-dash alias always wins, even when it is more than one character (ex: `-foo`).
        if let Some(name) = self.single_options.get(option_name) {
            return self.open_option(name.clone(), single_argument);
        }

        let characters: Vec<char> = option_name.chars().collect();

        if characters.len() == 1 {
            return Err(MatchError::InvalidShortOption(characters[0]));
        }

        for (index, single) in characters.iter().enumerate() {
            let name = match self.single_options.get(&single.to_string()) {
                Some(name) => name.clone(),
                None => return Err(MatchError::InvalidShortOption(*single)),
            };

            if index + 1 == characters.len() {
                // Only the final option may accept values.
                self.open_option(name, single_argument)?;
            } else {
                // All characters in the head of a bundle must allow no values.
                let bound = *self
                    .option_bounds
                    .get(&name)
                    .expect("internal error - mis-aligned short option.");
                let match_tokens = MatchBuffer::new(name, bound).close()?;
                self.update_buffer(None)?;
                self.matches.push(match_tokens);
            }
        }

        Ok(())
    }

    fn update_buffer(&mut self, next_buffer: Option<MatchBuffer>) -> Result<(), MatchError> {
        let previous_buffer = std::mem::replace(&mut self.buffer, next_buffer);

        if let Some(match_buffer) = previous_buffer {
            let match_tokens = match_buffer.close()?;
            self.matches.push(match_tokens);
        }

        Ok(())
    }

    /// Finish matching.
    ///
    /// On error, the matches gathered so far are returned as well; this lets the caller detect `--help`.
    pub(crate) fn close(mut self) -> Result<Matches, (usize, MatchError, Matches)> {
        let mut close_error: Option<MatchError> = None;

        if let Some(match_buffer) = self.buffer.take() {
            match match_buffer.close() {
                Ok(match_tokens) => {
                    self.matches.push(match_tokens);
                }
                Err(error) => {
                    close_error.replace(MatchError::from(error));
                }
            };
        }

        // Positionals which were never fed must allow zero values; their defaults apply.
        for argument_config in &self.arguments {
            let match_buffer = MatchBuffer::new(argument_config.name(), argument_config.bound());

            if let Err(error) = match_buffer.close() {
                // Only track the first error.
                if close_error.is_none() {
                    close_error.replace(MatchError::from(error));
                }
            }
        }

        let matches = Matches {
            values: self.matches,
        };

        if close_error.is_none() {
            for (name, display) in &self.required_options {
                if !matches.contains(name) {
                    close_error.replace(MatchError::MissingOption(display.clone()));
                    break;
                }
            }
        }

        match close_error {
            Some(error) => Err((self.fed, error, matches)),
            None => Ok(matches),
        }
    }
}

/// Whether `text` reads as a number, such as `5`, `3.14` or `.5` (so not `inf` or `nan`).
fn is_number(text: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit() || c == '.') && text.parse::<f64>().is_ok()
}

fn split_equals_delimiter(token: &str) -> (&str, Option<&str>) {
    match token.split_once('=') {
        Some((n, v)) => (n, Some(v)),
        None => (token, None),
    }
}
