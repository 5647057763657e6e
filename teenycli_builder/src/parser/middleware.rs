#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::Bundle;
use crate::parser::base::*;
use crate::parser::interface::UserInterface;
use crate::parser::printer::Printer;
use crate::parser::ErrorContext;

/// A node of the command tree, as seen by the tree walk.
pub(crate) trait ParseNode {
    /// The parser & printer of this node alone.
    fn parse_unit(&self) -> ParseUnit<'_>;

    /// The sub-command `name` of this node.
    fn select(&self, name: &str) -> Option<&Self>;
}

pub(crate) struct ParseUnit<'a> {
    parser: Parser<'a>,
    printer: Printer,
    version: Option<String>,
    commands: Vec<String>,
    selection_required: bool,
}

impl<'a> ParseUnit<'a> {
    pub(crate) fn new(parser: Parser<'a>, printer: Printer) -> Self {
        Self {
            parser,
            printer,
            version: None,
            commands: Vec::default(),
            selection_required: false,
        }
    }

    pub(crate) fn version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn commands(mut self, commands: Vec<String>, required: bool) -> Self {
        self.commands = commands;
        self.selection_required = required;
        self
    }

    fn choices(&self) -> String {
        self.commands
            .iter()
            .map(|name| format!("'{name}'"))
            .collect::<Vec<String>>()
            .join(", ")
    }

    /// Parse the tokens of this node, which start at `tokens[start]`.
    fn invoke(
        self,
        tokens: &[&str],
        start: usize,
        user_interface: &(impl UserInterface + ?Sized),
    ) -> ParseResult {
        let choices = self.choices();
        let ParseUnit {
            parser,
            printer,
            version,
            commands,
            selection_required,
        } = self;

        match parser.consume(&tokens[start..]) {
            Ok(Action::Continue { values, selector }) => match selector {
                Some((offset, variant)) if commands.contains(&variant) => ParseResult::Incomplete {
                    values,
                    variant_offset: start + offset,
                    variant,
                },
                Some((offset, variant)) => {
                    user_interface.print_usage(printer.usage());
                    user_interface.print_error(ParseError(format!(
                        "Unknown sub-command '{variant}' (choose from {choices})."
                    )));
                    user_interface.print_error_context(ErrorContext::new(start + offset, tokens));
                    ParseResult::Exit(1)
                }
                None if selection_required => {
                    user_interface.print_usage(printer.help());
                    user_interface.print_error(ParseError(format!(
                        "A sub-command is required (choose from {choices})."
                    )));
                    ParseResult::Exit(1)
                }
                None => ParseResult::Complete(values),
            },
            Ok(Action::PrintHelp) => {
                printer.print_help(user_interface);
                ParseResult::Exit(0)
            }
            Ok(Action::PrintVersion) => {
                user_interface.print(version.unwrap_or_default());
                ParseResult::Exit(0)
            }
            Err((offset, parse_error)) => {
                user_interface.print_usage(printer.usage());
                user_interface.print_error(parse_error);
                user_interface.print_error_context(ErrorContext::new(start + offset, tokens));
                ParseResult::Exit(1)
            }
        }
    }
}

#[derive(Debug)]
enum ParseResult {
    Complete(Values),
    Incomplete {
        values: Values,
        variant_offset: usize,
        variant: String,
    },
    Exit(i32),
}

/// Walk the command tree from `root`, one node at a time, parsing the tokens destined to each.
///
/// Returns the flat bundle of every visited node (deeper values shadow shallower ones), alongside the deepest node.
/// On help/version requests or user errors, the message has been delivered and the exit status is returned instead.
pub(crate) fn walk<'n, N: ParseNode>(
    root: &'n N,
    tokens: &[&str],
    user_interface: &(impl UserInterface + ?Sized),
) -> Result<(Bundle, &'n N), i32> {
    let mut node = root;
    let mut start = 0;
    let mut bundle = Bundle::default();

    loop {
        match node.parse_unit().invoke(tokens, start, user_interface) {
            ParseResult::Complete(values) => {
                bundle.merge(values);

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Parsed {bundle:?}.");
                }

                return Ok((bundle, node));
            }
            ParseResult::Incomplete {
                values,
                variant_offset,
                variant,
            } => {
                bundle.merge(values);
                node = node
                    .select(&variant)
                    .expect("internal error - selected sub-command must exist");
                start = variant_offset + 1;
            }
            ParseResult::Exit(code) => return Err(code),
        }
    }
}
