use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::{ArgumentSpec, Datum, InvalidCapture, ParameterClass};
use crate::constant::*;
use crate::matcher::*;
use crate::model::Arity;

/// The ways a parser may be mis-configured.
///
/// These are programming errors: they surface at declaration time (or from `dispatch`), never from user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An argument was declared without any names.
    #[error("An argument must be declared with at least one name.")]
    NoNames,

    /// A positional was declared with `Arity::Zero`.
    #[error("`arity=Zero` is only valid for flags (positional '{0}').")]
    ZeroPositional(String),

    /// A flag was declared with `Arity::Zero` and `required(true)`.
    #[error("`arity=Zero` and `required=true` are incompatible (argument '{0}').")]
    ZeroRequired(String),

    /// An argument was declared with both a default and `required(true)`.
    #[error("A default value and `required=true` are incompatible (argument '{0}').")]
    RequiredDefault(String),

    /// A flag was declared with `Arity::Zero` and a converter.
    #[error("`arity=Zero` takes no values to convert (argument '{0}').")]
    ZeroConvert(String),

    /// A flag was declared with `Arity::Zero` and a default that is not a `bool`.
    #[error("`arity=Zero` requires a `bool` default (argument '{0}').")]
    ZeroDefault(String),

    /// An argument name is malformed.
    #[error("Invalid argument name '{name}': {reason}.")]
    InvalidName {
        /// The offending name.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Two arguments resolve to the same destination.
    #[error("Cannot duplicate the argument '{0}'.")]
    DuplicateArgument(String),

    /// A flag alias is already taken (including the built-in `-h/--help` and `--version`).
    #[error("Cannot duplicate the option '{0}'.")]
    DuplicateOption(String),

    /// A positional was added to a node which already has sub-commands.
    #[error("Cannot add positional '{0}' to a parser with sub-commands.")]
    PositionalWithSubcommands(String),

    /// A sub-command was added to a node which already has positionals.
    #[error("Cannot add sub-command '{command}' to a parser with positionals (positional '{positional}').")]
    SubcommandsWithPositionals {
        /// The rejected sub-command.
        command: String,
        /// The first positional of the node.
        positional: String,
    },

    /// A sibling sub-command already uses this name.
    #[error("Cannot duplicate the sub-command '{0}'.")]
    DuplicateSubcommand(String),

    /// Sibling sub-commands disagree on whether selecting one is required.
    #[error("Sub-command '{0}' is inconsistent with its siblings: all must declare the same `required` setting.")]
    InconsistentRequired(String),

    /// The parse resolved to a parser with no handler, and no fallback was given.
    #[error("You need to either pass a handler to `dispatch()`, or register sub-commands with `subcmd()`.")]
    MissingHandler,
}

/// The outcome of a failed dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The parser is mis-configured.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Parsing stopped early; the process should exit with this code.
    /// Help and version requests exit with `0`, user errors with `1`.
    #[error("Exit with code {0}.")]
    Exit(i32),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Parse error: {0}")]
pub(crate) struct ParseError(pub(crate) String);

impl From<MatchError> for ParseError {
    fn from(error: MatchError) -> Self {
        ParseError(error.to_string())
    }
}

impl From<InvalidCapture> for ParseError {
    fn from(error: InvalidCapture) -> Self {
        ParseError(error.to_string())
    }
}

impl From<TokenMatcherError> for ConfigError {
    fn from(error: TokenMatcherError) -> Self {
        match error {
            TokenMatcherError::DuplicateOption(alias) => ConfigError::DuplicateOption(alias),
        }
    }
}

pub(crate) type Values = Vec<(String, Option<Box<dyn Datum>>)>;

/// Parses the tokens destined to a single node of the command tree.
pub(crate) struct Parser<'a> {
    token_matcher: TokenMatcher,
    specs: HashMap<String, &'a ArgumentSpec>,
    ordered: Vec<&'a ArgumentSpec>,
    branching: bool,
}

impl<'a> std::fmt::Debug for Parser<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser{..}").finish()
    }
}

impl<'a> Parser<'a> {
    /// Build the parser for one node.
    ///
    /// When `branching`, consumption stops at the first free positional-like token, which selects a sub-command.
    pub(crate) fn new(
        specs: impl IntoIterator<Item = &'a ArgumentSpec>,
        branching: bool,
        version: bool,
    ) -> Result<Self, ConfigError> {
        let mut option_configs = vec![OptionConfig::new(
            HELP_DEST,
            vec![format!("-{HELP_SHORT}"), format!("--{HELP_NAME}")],
            Bound::Range(0, 0),
            false,
        )];
        let mut argument_configs = VecDeque::default();
        let mut by_dest: HashMap<String, &'a ArgumentSpec> = HashMap::default();
        let mut ordered = Vec::default();
        let mut claims_version = false;

        for spec in specs.into_iter() {
            if by_dest.insert(spec.dest().to_string(), spec).is_some() {
                return Err(ConfigError::DuplicateArgument(spec.dest().to_string()));
            }

            match spec.class() {
                ParameterClass::Flag => {
                    claims_version |= spec.names().iter().any(|n| n == &format!("--{VERSION_NAME}"));
                    option_configs.push(OptionConfig::from(spec));
                }
                ParameterClass::Positional => {
                    argument_configs.push_back(ArgumentConfig::from(spec));
                }
            }

            ordered.push(spec);
        }

        if version && !claims_version {
            option_configs.push(OptionConfig::new(
                VERSION_DEST,
                vec![format!("--{VERSION_NAME}")],
                Bound::Range(0, 0),
                false,
            ));
        }

        let token_matcher = TokenMatcher::new(option_configs, argument_configs)?;

        Ok(Self {
            token_matcher,
            specs: by_dest,
            ordered,
            branching,
        })
    }

    /// Consume the tokens of this node.
    /// Offsets (including those of errors) are indices into `tokens`.
    pub(crate) fn consume(self, tokens: &[&str]) -> Result<Action, (usize, ParseError)> {
        let Parser {
            mut token_matcher,
            specs,
            ordered,
            branching,
        } = self;

        // 1. Feed the raw tokens to the matcher, stopping at the sub-command selector.
        // Feeding carries on past an error, so that a later `--help` still takes effect.
        let mut selector: Option<OffsetValue> = None;
        let mut feed_error: Option<(usize, ParseError)> = None;

        for (offset, token) in tokens.iter().enumerate() {
            if branching && token_matcher.is_branch_point(token) {
                selector.replace((offset, token.to_string()));
                break;
            }

            if let Err(error) = token_matcher.feed(token) {
                // Only report the first error.
                feed_error.get_or_insert((offset, ParseError::from(error)));
            }
        }

        let matches = match token_matcher.close() {
            Ok(matches) | Err((_, _, matches)) if matches.contains(HELP_DEST) => {
                return Ok(Action::PrintHelp);
            }
            Ok(matches) | Err((_, _, matches)) if matches.contains(VERSION_DEST) => {
                return Ok(Action::PrintVersion);
            }
            Ok(matches) => match feed_error {
                Some(error) => Err(error),
                None => Ok(matches),
            },
            Err((offset, error, _)) => {
                Err(feed_error.unwrap_or_else(|| (offset, ParseError::from(error))))
            }
        }?;

        // 2. Convert the raw values; later occurrences of a flag win over earlier ones.
        let mut captured: HashMap<String, Box<dyn Datum>> = HashMap::default();

        for match_tokens in matches.values {
            let spec = specs
                .get(&match_tokens.name)
                .expect("internal error - mismatch between matches and specs");
            let value = capture(spec, &match_tokens)?;
            captured.insert(match_tokens.name, value);
        }

        // 3. Every declared argument is represented, falling back to its default.
        let values = ordered
            .into_iter()
            .map(|spec| {
                let value = captured
                    .remove(spec.dest())
                    .or_else(|| spec.default_value());
                (spec.dest().to_string(), value)
            })
            .collect();

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Consumed {values:?}, selector {selector:?}.");
        }

        Ok(Action::Continue { values, selector })
    }
}

fn capture(spec: &ArgumentSpec, match_tokens: &MatchTokens) -> Result<Box<dyn Datum>, (usize, ParseError)> {
    let converter = spec.converter();

    match spec.arity() {
        Arity::Zero => Ok(Box::new(true)),
        Arity::One => match &match_tokens.values[..] {
            [(offset, value)] => converter
                .capture(value)
                .map_err(|error| (*offset, ParseError::from(error))),
            _ => unreachable!("internal error - arity One must match precisely 1 token"),
        },
        Arity::Many => {
            let raw: Vec<&str> = match_tokens
                .values
                .iter()
                .map(|(_, value)| value.as_str())
                .collect();
            converter.capture_all(&raw).map_err(|(index, error)| {
                (match_tokens.values[index].0, ParseError::from(error))
            })
        }
    }
}

#[derive(Debug)]
pub(crate) enum Action {
    Continue {
        values: Values,
        selector: Option<OffsetValue>,
    },
    PrintHelp,
    PrintVersion,
}
