use std::env;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::api::{Argument, ArgumentSpec, Bundle, ParameterClass};
use crate::constant::*;
use crate::parser::{
    walk, ArgumentParameter, CommandParameter, ConfigError, ConsoleInterface, DispatchError,
    OptionParameter, ParseNode, ParseUnit, Parser, Printer, UserInterface,
};

/// The function bound to a (sub-)command, invoked by [`ArgP::dispatch`].
pub type Handler<R> = Box<dyn Fn(Bundle) -> R>;

/// A node of the command tree: the root parser, or one of its (nested) sub-commands.
///
/// Arguments are declared with [`ArgP::add`] and sub-commands with [`ArgP::subcmd`].
/// A node may have positionals or sub-commands, but never both.
///
/// ### Example
/// ```
/// # use teenycli_builder as teenycli;
/// use teenycli::{ArgP, Argument, Arity};
///
/// let mut argp: ArgP = ArgP::new("program").about("My program that does awesome stuff.");
/// argp.add(Argument::new(["--long"]))
///     .unwrap()
///     .add(Argument::new(["paths"]).arity(Arity::Many))
///     .unwrap();
///
/// let bundle = argp.parse_tokens(&["--long", "a", "b"]).unwrap();
/// assert!(bundle.flag("long"));
/// assert_eq!(
///     bundle.get::<Vec<String>>("paths"),
///     Some(&vec!["a".to_string(), "b".to_string()])
/// );
/// ```
pub struct ArgP<R = ()> {
    program: String,
    about: Option<String>,
    version: Option<String>,
    specs: Vec<ArgumentSpec>,
    subcommands: Option<SubCommands<R>>,
    handler: Option<Handler<R>>,
}

struct SubCommands<R> {
    declared_required: Option<bool>,
    commands: Vec<SubCommand<R>>,
}

impl<R> SubCommands<R> {
    fn required(&self) -> bool {
        self.declared_required.unwrap_or(true)
    }
}

struct SubCommand<R> {
    name: String,
    help: Option<String>,
    node: ArgP<R>,
}

/// The declaration of a sub-command, to be registered via [`ArgP::subcmd`].
///
/// ### Example
/// ```
/// # use teenycli_builder as teenycli;
/// use teenycli::{ArgP, Bundle, Command};
///
/// let mut argp: ArgP<i64> = ArgP::new("calc");
/// argp.subcmd(Command::new("zero", |_: Bundle| 0).help("Always zero."))
///     .unwrap();
///
/// assert_eq!(argp.dispatch_tokens(&["zero"], None), Ok(0));
/// ```
pub struct Command<R> {
    name: String,
    handler: Handler<R>,
    help: Option<String>,
    required: Option<bool>,
}

impl<R> Command<R> {
    /// Declare a sub-command by its name, bound to the `handler` invoked when it is selected.
    pub fn new(name: impl Into<String>, handler: impl Fn(Bundle) -> R + 'static) -> Self {
        Self {
            name: name.into(),
            handler: Box::new(handler),
            help: None,
            required: None,
        }
    }

    /// Document the sub-command for the help message of its parent.
    pub fn help(mut self, description: impl Into<String>) -> Self {
        self.help.replace(description.into());
        self
    }

    /// Set whether selecting one of the sub-commands of this group is required (the default).
    ///
    /// The setting belongs to the group of siblings: every sibling must declare the same setting (or none).
    pub fn required(mut self, required: bool) -> Self {
        self.required.replace(required);
        self
    }
}

/// The outcome of resolving the handler of a node.
pub(crate) enum Resolution<'a, R> {
    NoHandler,
    Bound(&'a Handler<R>),
}

impl<R> ArgP<R> {
    /// Create the root parser of a program.
    pub fn new(program: impl Into<String>) -> Self {
        Self::node(program.into(), None)
    }

    fn node(program: String, handler: Option<Handler<R>>) -> Self {
        Self {
            program,
            about: None,
            version: None,
            specs: Vec::default(),
            subcommands: None,
            handler,
        }
    }

    /// Document the about message, shown at the top of the help message.
    /// If repeated, only the final message applies.
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.about.replace(description.into());
        self
    }

    /// Add a `--version` flag, which prints `version` and exits with `0`.
    ///
    /// Once set, the alias `--version` is reserved.
    /// A flag declared with the alias beforehand takes precedence over the built-in.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version.replace(version.into());
        self
    }

    /// The program name of this node; sub-commands are named `"{parent} {name}"`.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Declare an argument on this node.
    ///
    /// The declaration is resolved into its parsing rule immediately; see [`Argument`] for the inference rules.
    /// On error, the node is left unchanged.
    ///
    /// ### Example
    /// ```
    /// # use teenycli_builder as teenycli;
    /// use teenycli::{ArgP, Argument, ConfigError};
    ///
    /// let mut argp: ArgP = ArgP::new("program");
    /// argp.add(Argument::new(["-C"]).dest("change")).unwrap();
    ///
    /// let result = argp.add(Argument::new(["--change"]));
    /// assert_eq!(result.err(), Some(ConfigError::DuplicateArgument("change".to_string())));
    /// ```
    pub fn add(&mut self, argument: Argument) -> Result<&mut Self, ConfigError> {
        let spec = ArgumentSpec::resolve(argument)?;

        if spec.class() == ParameterClass::Positional && self.subcommands.is_some() {
            return Err(ConfigError::PositionalWithSubcommands(spec.dest().to_string()));
        }

        if self.specs.iter().any(|s| s.dest() == spec.dest()) {
            return Err(ConfigError::DuplicateArgument(spec.dest().to_string()));
        }

        if spec.class() == ParameterClass::Flag {
            for alias in spec.names() {
                let reserved = alias == &format!("-{HELP_SHORT}")
                    || alias == &format!("--{HELP_NAME}")
                    || (self.version.is_some() && alias == &format!("--{VERSION_NAME}"));
                let taken = self
                    .specs
                    .iter()
                    .filter(|s| s.class() == ParameterClass::Flag)
                    .any(|s| s.names().contains(alias));

                if reserved || taken {
                    return Err(ConfigError::DuplicateOption(alias.clone()));
                }
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Added {spec:?} to '{p}'.", p = self.program);
        }

        self.specs.push(spec);
        Ok(self)
    }

    /// Register a sub-command on this node, returning the new child node.
    ///
    /// Further arguments and sub-commands may be declared on the child.
    /// On error, the node is left unchanged.
    ///
    /// ### Example
    /// ```
    /// # use teenycli_builder as teenycli;
    /// use teenycli::{ArgP, Argument, Bundle, Command};
    ///
    /// fn add(bundle: Bundle) -> i64 {
    ///     bundle.get::<i64>("left").unwrap() + bundle.get::<i64>("right").unwrap()
    /// }
    ///
    /// let mut argp: ArgP<i64> = ArgP::new("calc");
    /// argp.subcmd(Command::new("add", add))
    ///     .unwrap()
    ///     .add(Argument::new(["left"]).convert::<i64>())
    ///     .unwrap()
    ///     .add(Argument::new(["right"]).convert::<i64>())
    ///     .unwrap();
    ///
    /// assert_eq!(argp.dispatch_tokens(&["add", "40", "2"], None), Ok(42));
    /// ```
    pub fn subcmd(&mut self, command: Command<R>) -> Result<&mut ArgP<R>, ConfigError> {
        let Command {
            name,
            handler,
            help,
            required,
        } = command;

        if let Some(positional) = self
            .specs
            .iter()
            .find(|s| s.class() == ParameterClass::Positional)
        {
            return Err(ConfigError::SubcommandsWithPositionals {
                command: name,
                positional: positional.dest().to_string(),
            });
        }

        if name.is_empty() || name.starts_with('-') {
            return Err(ConfigError::InvalidName {
                name,
                reason: "sub-command names must be non-empty and cannot start with a hyphen",
            });
        }

        if let Some(group) = &self.subcommands {
            if group.commands.iter().any(|c| c.name == name) {
                return Err(ConfigError::DuplicateSubcommand(name));
            }

            if group.declared_required != required {
                return Err(ConfigError::InconsistentRequired(name));
            }
        }

        let program = format!("{} {name}", self.program);
        let group = self.subcommands.get_or_insert_with(|| SubCommands {
            declared_required: required,
            commands: Vec::default(),
        });

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Registered sub-command '{program}'.");
        }

        group.commands.push(SubCommand {
            name,
            help,
            node: ArgP::node(program, Some(handler)),
        });

        Ok(&mut group
            .commands
            .last_mut()
            .expect("internal error - sub-command was just pushed")
            .node)
    }

    pub(crate) fn resolve(&self) -> Resolution<'_, R> {
        match &self.handler {
            Some(handler) => Resolution::Bound(handler),
            None => Resolution::NoHandler,
        }
    }

    fn parse_with_interface(
        &self,
        tokens: &[&str],
        user_interface: &(impl UserInterface + ?Sized),
    ) -> Result<(Bundle, &ArgP<R>), i32> {
        walk(self, tokens, user_interface)
    }

    /// Parse the `tokens` against the command tree.
    ///
    /// Returns the flat bundle of the selected command path.
    /// If help or the version is requested, it is printed (to stdout) and the result is `Err(0)`.
    /// On user error, the usage & error are printed (to stderr) and the result is `Err(1)`.
    pub fn parse_tokens(&self, tokens: &[&str]) -> Result<Bundle, i32> {
        self.parse_with_interface(tokens, &ConsoleInterface::default())
            .map(|(bundle, _)| bundle)
    }

    /// Parse the Cli [`env::args`] against the command tree.
    ///
    /// Behaves as [`ArgP::parse_tokens`], except that it exits the process (via `std::process::exit`) instead of returning an `Err`.
    pub fn parse(&self) -> Bundle {
        let command_input: Vec<String> = env::args().skip(1).collect();

        match self.parse_tokens(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
        ) {
            Ok(bundle) => bundle,
            Err(exit_code) => std::process::exit(exit_code),
        }
    }

    fn dispatch_with_interface(
        &self,
        tokens: &[&str],
        fallback: Option<&dyn Fn(Bundle) -> R>,
        user_interface: &(impl UserInterface + ?Sized),
    ) -> Result<R, DispatchError> {
        let (bundle, node) = self
            .parse_with_interface(tokens, user_interface)
            .map_err(DispatchError::Exit)?;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Dispatching '{p}' with {bundle:?}.", p = node.program);
        }

        match (node.resolve(), fallback) {
            (Resolution::Bound(handler), _) => Ok(handler(bundle)),
            (Resolution::NoHandler, Some(fallback)) => Ok(fallback(bundle)),
            (Resolution::NoHandler, None) if node.subcommands.is_some() => {
                user_interface.print_usage(node.printer().help());
                Err(DispatchError::Exit(1))
            }
            (Resolution::NoHandler, None) => Err(DispatchError::Config(ConfigError::MissingHandler)),
        }
    }

    /// Parse the `tokens`, then invoke the handler of the deepest selected command.
    ///
    /// When that command has no handler (ex: the root, or an optional sub-command group left unselected), the `fallback` is invoked instead.
    /// Without a fallback, a node with sub-commands prints its help and the result is `Err(DispatchError::Exit(1))`,
    /// while a node without is a [`ConfigError::MissingHandler`].
    ///
    /// ### Example
    /// ```
    /// # use teenycli_builder as teenycli;
    /// use teenycli::{ArgP, Argument, Bundle, ConfigError, DispatchError};
    ///
    /// let mut argp: ArgP<bool> = ArgP::new("program");
    /// argp.add(Argument::new(["--long"])).unwrap();
    ///
    /// let fallback = |bundle: Bundle| bundle.flag("long");
    /// assert_eq!(argp.dispatch_tokens(&["--long"], Some(&fallback)), Ok(true));
    /// assert_eq!(
    ///     argp.dispatch_tokens(&["--long"], None),
    ///     Err(DispatchError::Config(ConfigError::MissingHandler))
    /// );
    /// ```
    pub fn dispatch_tokens(
        &self,
        tokens: &[&str],
        fallback: Option<&dyn Fn(Bundle) -> R>,
    ) -> Result<R, DispatchError> {
        self.dispatch_with_interface(tokens, fallback, &ConsoleInterface::default())
    }

    /// Dispatch the Cli [`env::args`].
    ///
    /// Behaves as [`ArgP::dispatch_tokens`], except that it exits the process (via `std::process::exit`) on help, version and user errors.
    pub fn dispatch(&self, fallback: Option<&dyn Fn(Bundle) -> R>) -> Result<R, ConfigError> {
        let command_input: Vec<String> = env::args().skip(1).collect();

        match self.dispatch_tokens(
            command_input
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .as_slice(),
            fallback,
        ) {
            Ok(value) => Ok(value),
            Err(DispatchError::Config(error)) => Err(error),
            Err(DispatchError::Exit(exit_code)) => std::process::exit(exit_code),
        }
    }

    fn printer(&self) -> Printer {
        let options = self
            .specs
            .iter()
            .filter(|s| s.class() == ParameterClass::Flag)
            .map(OptionParameter::from)
            .collect();
        let arguments = self
            .specs
            .iter()
            .filter(|s| s.class() == ParameterClass::Positional)
            .map(ArgumentParameter::from)
            .collect();
        let printer = Printer::terminal(&self.program, options, arguments)
            .about(self.about.clone())
            .version(self.version.is_some() && !self.claims_version());

        match &self.subcommands {
            Some(group) => printer.commands(
                group
                    .commands
                    .iter()
                    .map(|c| CommandParameter::new(&c.name, c.help.clone()))
                    .collect(),
                group.required(),
            ),
            None => printer,
        }
    }

    fn claims_version(&self) -> bool {
        let alias = format!("--{VERSION_NAME}");
        self.specs.iter().any(|s| s.names().contains(&alias))
    }
}

impl<R> ParseNode for ArgP<R> {
    fn parse_unit(&self) -> ParseUnit<'_> {
        let parser = Parser::new(
            &self.specs,
            self.subcommands.is_some(),
            self.version.is_some(),
        )
        .expect("internal error - specs are validated by `add`");
        let unit = ParseUnit::new(parser, self.printer()).version(self.version.clone());

        match &self.subcommands {
            Some(group) => unit.commands(
                group.commands.iter().map(|c| c.name.clone()).collect(),
                group.required(),
            ),
            None => unit,
        }
    }

    fn select(&self, name: &str) -> Option<&Self> {
        self.subcommands.as_ref().and_then(|group| {
            group
                .commands
                .iter()
                .find(|c| c.name == name)
                .map(|c| &c.node)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Arity;
    use crate::parser::util::InMemoryInterface;
    use crate::test::assert_contains;
    use rstest::rstest;
    use std::cell::Cell;
    use std::rc::Rc;

    fn calculator() -> ArgP<i64> {
        let mut argp: ArgP<i64> = ArgP::new("calc").about("A tiny calculator.");
        argp.subcmd(
            Command::new("add", |bundle: Bundle| {
                bundle.get::<i64>("left").unwrap() + bundle.get::<i64>("right").unwrap()
            })
            .help("Add two integers."),
        )
        .unwrap()
        .add(Argument::new(["left"]).convert::<i64>())
        .unwrap()
        .add(Argument::new(["right"]).convert::<i64>())
        .unwrap();
        argp.subcmd(
            Command::new("sub", |bundle: Bundle| {
                bundle.get::<i64>("left").unwrap() - bundle.get::<i64>("right").unwrap()
            })
            .help("Subtract two integers."),
        )
        .unwrap()
        .add(Argument::new(["left"]).convert::<i64>())
        .unwrap()
        .add(Argument::new(["right"]).convert::<i64>())
        .unwrap();
        argp
    }

    fn parse(argp: &ArgP<impl Sized>, tokens: &[&str]) -> Result<Bundle, i32> {
        let interface = InMemoryInterface::default();
        argp.parse_with_interface(tokens, &interface)
            .map(|(bundle, _)| bundle)
    }

    #[test]
    fn empty() {
        // Setup
        let argp: ArgP = ArgP::new("program");

        // Execute
        let bundle = parse(&argp, &[]).unwrap();

        // Verify
        assert!(bundle.is_empty());
    }

    #[test]
    fn add_returns_self() {
        // Setup
        let mut argp: ArgP = ArgP::new("program");

        // Execute
        argp.add(Argument::new(["--long"]))
            .unwrap()
            .add(Argument::new(["paths"]).arity(Arity::Many))
            .unwrap();
        let bundle = parse(&argp, &["--long", "a", "b"]).unwrap();

        // Verify
        assert!(bundle.flag("long"));
        assert_eq!(
            bundle.get::<Vec<String>>("paths"),
            Some(&vec!["a".to_string(), "b".to_string()])
        );
    }

    #[rstest]
    #[case(Argument::new(["-h"]), ConfigError::DuplicateOption("-h".to_string()))]
    #[case(Argument::new(["-x", "--help"]), ConfigError::DuplicateOption("--help".to_string()))]
    #[case(Argument::new(["-v", "--version"]), ConfigError::DuplicateOption("--version".to_string()))]
    #[case(Argument::new(["-l"]), ConfigError::DuplicateOption("-l".to_string()))]
    #[case(Argument::new(["--long"]).dest("x"), ConfigError::DuplicateOption("--long".to_string()))]
    #[case(Argument::new(["path"]), ConfigError::DuplicateArgument("path".to_string()))]
    #[case(Argument::new(["paths"]).arity(Arity::Zero), ConfigError::ZeroPositional("paths".to_string()))]
    #[case(Argument::new(["--color"]).required(true).default("auto"), ConfigError::RequiredDefault("--color".to_string()))]
    fn add_invalid(#[case] argument: Argument, #[case] expected: ConfigError) {
        // Setup
        let mut argp: ArgP = ArgP::new("program").version("1.0.0");
        argp.add(Argument::new(["-l", "--long"]))
            .unwrap()
            .add(Argument::new(["path"]))
            .unwrap();

        // Execute
        let result = argp.add(argument).map(|_| ());

        // Verify
        assert_eq!(result, Err(expected));
        // The registries are unchanged.
        assert_eq!(argp.specs.len(), 2);
        let bundle = parse(&argp, &["-l", "abc"]).unwrap();
        assert_eq!(bundle.len(), 2);
    }

    #[test]
    fn add_positional_after_subcmd() {
        // Setup
        let mut argp = calculator();

        // Execute
        let result = argp.add(Argument::new(["extra"])).map(|_| ());

        // Verify
        assert_eq!(
            result,
            Err(ConfigError::PositionalWithSubcommands("extra".to_string()))
        );
        assert_eq!(argp.specs.len(), 0);
        // Flags are still allowed on a branching node.
        argp.add(Argument::new(["--verbose"])).unwrap();
    }

    #[test]
    fn subcmd_after_positional() {
        // Setup
        let mut argp: ArgP = ArgP::new("program");
        argp.add(Argument::new(["path"])).unwrap();

        // Execute
        let result = argp.subcmd(Command::new("sub", |_| ())).map(|_| ());

        // Verify
        assert_eq!(
            result,
            Err(ConfigError::SubcommandsWithPositionals {
                command: "sub".to_string(),
                positional: "path".to_string(),
            })
        );
        assert!(argp.subcommands.is_none());
        let bundle = parse(&argp, &["sub"]).unwrap();
        assert_eq!(bundle.get::<String>("path"), Some(&"sub".to_string()));
    }

    #[rstest]
    #[case("")]
    #[case("-x")]
    fn subcmd_invalid_name(#[case] name: &str) {
        let mut argp: ArgP = ArgP::new("program");
        let result = argp.subcmd(Command::new(name, |_| ())).map(|_| ());
        assert_matches!(result, Err(ConfigError::InvalidName { .. }));
    }

    #[test]
    fn subcmd_duplicate() {
        // Setup
        let mut argp = calculator();

        // Execute
        let result = argp.subcmd(Command::new("add", |_| 0)).map(|_| ());

        // Verify
        assert_eq!(
            result,
            Err(ConfigError::DuplicateSubcommand("add".to_string()))
        );
        assert_eq!(argp.subcommands.as_ref().unwrap().commands.len(), 2);
    }

    #[rstest]
    #[case(Command::new("add", |_| 0), ConfigError::DuplicateSubcommand("add".to_string()))]
    #[case(Command::new("mul", |_| 0).required(false), ConfigError::InconsistentRequired("mul".to_string()))]
    #[case(Command::new("-mul", |_| 0), ConfigError::InvalidName {
        name: "-mul".to_string(),
        reason: "sub-command names must be non-empty and cannot start with a hyphen",
    })]
    fn subcmd_invalid_keeps_tree(#[case] command: Command<i64>, #[case] expected: ConfigError) {
        // Setup
        let mut argp = calculator();

        // Execute
        let result = argp.subcmd(command).map(|_| ());

        // Verify
        assert_eq!(result, Err(expected));
        let interface = InMemoryInterface::default();
        assert_eq!(
            argp.dispatch_with_interface(&["add", "80", "38"], None, &interface),
            Ok(118)
        );
        assert_eq!(
            argp.dispatch_with_interface(&["sub", "80", "38"], None, &interface),
            Ok(42)
        );
        assert_eq!(
            argp.dispatch_with_interface(&["--help"], None, &interface),
            Err(DispatchError::Exit(0))
        );
        let message = interface.consume_message();
        assert_contains!(message, "usage: calc [-h] {add,sub} ...");
        assert_eq!(message.matches(" add ").count(), 1);
        assert!(!message.contains("mul"));
    }

    #[rstest]
    #[case(None, Some(true))]
    #[case(None, Some(false))]
    #[case(Some(true), None)]
    #[case(Some(false), None)]
    #[case(Some(true), Some(false))]
    fn subcmd_inconsistent_required(#[case] first: Option<bool>, #[case] second: Option<bool>) {
        // Setup
        let command = |name: &str, required: Option<bool>| {
            let command = Command::new(name, |_: Bundle| ());
            match required {
                Some(required) => command.required(required),
                None => command,
            }
        };
        let mut argp: ArgP = ArgP::new("program");
        argp.subcmd(command("a", first)).unwrap();

        // Execute
        let result = argp.subcmd(command("b", second)).map(|_| ());

        // Verify
        assert_eq!(
            result,
            Err(ConfigError::InconsistentRequired("b".to_string()))
        );
        assert_eq!(argp.subcommands.as_ref().unwrap().commands.len(), 1);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(true))]
    #[case(Some(false))]
    fn subcmd_consistent_required(#[case] required: Option<bool>) {
        let mut argp: ArgP = ArgP::new("program");

        for name in ["a", "b", "c"] {
            let command = Command::new(name, |_: Bundle| ());
            let command = match required {
                Some(required) => command.required(required),
                None => command,
            };
            argp.subcmd(command).unwrap();
        }

        let group = argp.subcommands.as_ref().unwrap();
        assert_eq!(group.required(), required.unwrap_or(true));
    }

    #[test]
    fn subcmd_program() {
        // Setup
        let mut argp: ArgP = ArgP::new("git");

        // Execute
        let child = argp.subcmd(Command::new("remote", |_| ())).unwrap();
        let grandchild = child.subcmd(Command::new("add", |_| ())).unwrap();

        // Verify
        assert_eq!(grandchild.program(), "git remote add");
    }

    #[rstest]
    #[case(vec!["add", "80", "38"], 118)]
    #[case(vec!["sub", "80", "38"], 42)]
    #[case(vec!["sub", "--", "-8", "-50"], 42)]
    #[case(vec!["sub", "-8", "-50"], 42)]
    fn dispatch(#[case] tokens: Vec<&str>, #[case] expected: i64) {
        // Setup
        let argp = calculator();
        let interface = InMemoryInterface::default();

        // Execute
        let result = argp.dispatch_with_interface(tokens.as_slice(), None, &interface);

        // Verify
        assert_eq!(result, Ok(expected));
    }

    #[test]
    fn dispatch_missing_selection() {
        // Setup
        let argp = calculator();
        let interface = InMemoryInterface::default();

        // Execute
        let result = argp.dispatch_with_interface(&[], None, &interface);

        // Verify
        assert_eq!(result, Err(DispatchError::Exit(1)));
        let (usage, error) = interface.consume_error();
        assert_contains!(usage, "usage: calc [-h] {add,sub} ...");
        assert_contains!(usage, "A tiny calculator.");
        assert_contains!(error, "A sub-command is required");
    }

    #[test]
    fn dispatch_handler_once() {
        // Setup
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let mut argp: ArgP<&'static str> = ArgP::new("program");
        argp.subcmd(Command::new("run", move |_| {
            counter.set(counter.get() + 1);
            "ran"
        }))
        .unwrap();
        let interface = InMemoryInterface::default();

        // Execute
        let result = argp.dispatch_with_interface(&["run"], None, &interface);

        // Verify
        assert_eq!(result, Ok("ran"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn dispatch_fallback() {
        // Setup
        let mut argp: ArgP<String> = ArgP::new("program");
        argp.add(Argument::new(["--name"]).default("world")).unwrap();
        let interface = InMemoryInterface::default();
        let fallback = |bundle: Bundle| format!("hello {}", bundle.get::<String>("name").unwrap());

        // Execute
        let result = argp.dispatch_with_interface(&[], Some(&fallback), &interface);

        // Verify
        assert_eq!(result, Ok("hello world".to_string()));
    }

    #[test]
    fn dispatch_bound_over_fallback() {
        let argp = calculator();
        let interface = InMemoryInterface::default();
        let fallback = |_: Bundle| -> i64 { -1 };
        let result = argp.dispatch_with_interface(&["add", "1", "2"], Some(&fallback), &interface);
        assert_eq!(result, Ok(3));
    }

    #[test]
    fn dispatch_missing_handler() {
        // Setup
        let argp: ArgP = ArgP::new("program");
        let interface = InMemoryInterface::default();

        // Execute
        let result = argp.dispatch_with_interface(&[], None, &interface);

        // Verify
        assert_eq!(
            result,
            Err(DispatchError::Config(ConfigError::MissingHandler))
        );
    }

    #[test]
    fn dispatch_optional_group_unselected() {
        // Setup
        let mut argp: ArgP = ArgP::new("program");
        argp.subcmd(Command::new("inner", |_| ()).required(false))
            .unwrap();
        let interface = InMemoryInterface::default();

        // Execute
        let result = argp.dispatch_with_interface(&[], None, &interface);

        // Verify
        assert_eq!(result, Err(DispatchError::Exit(1)));
        let output = interface.consume();
        let usage = output.usage.unwrap();
        assert_contains!(usage, "usage: program [-h] [{inner} ...]");
        assert_eq!(output.error, None);
    }

    #[test]
    fn dispatch_nested() {
        // Setup
        let mut argp: ArgP<String> = ArgP::new("program");
        argp.subcmd(Command::new("outer", |_| "outer".to_string()))
            .unwrap()
            .subcmd(Command::new("inner", |_| "inner".to_string()).required(false))
            .unwrap();
        let interface = InMemoryInterface::default();

        // Execute
        let outer = argp.dispatch_with_interface(&["outer"], None, &interface);
        let inner = argp.dispatch_with_interface(&["outer", "inner"], None, &interface);

        // Verify
        assert_eq!(outer, Ok("outer".to_string()));
        assert_eq!(inner, Ok("inner".to_string()));
    }

    #[rstest]
    #[case(vec!["--help"], "usage: calc [-h] [--version] {add,sub} ...")]
    #[case(vec!["add", "-h"], "usage: calc add [-h] LEFT RIGHT")]
    #[case(vec!["--version"], "calc 1.2.3")]
    fn dispatch_print(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let argp = calculator().version("calc 1.2.3");
        let interface = InMemoryInterface::default();

        // Execute
        let result = argp.dispatch_with_interface(tokens.as_slice(), None, &interface);

        // Verify
        assert_eq!(result, Err(DispatchError::Exit(0)));
        let message = interface.consume_message();
        assert_contains!(message, expected);
    }

    #[rstest]
    #[case(vec!["mul", "1", "2"], "Parse error: Unknown sub-command 'mul' (choose from 'add', 'sub').")]
    #[case(vec!["add", "1", "x"], "Parse error: 'x' cannot convert to i64.")]
    #[case(vec!["add", "1"], "Parse error: Not enough tokens provided to parameter 'right'.")]
    #[case(vec!["add", "1", "2", "3"], "Parse error: No more arguments to match against.")]
    #[case(vec!["--bogus"], "Parse error: Option '--bogus' does not exist.")]
    fn dispatch_user_error(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        // Setup
        let argp = calculator();
        let interface = InMemoryInterface::default();

        // Execute
        let result = argp.dispatch_with_interface(tokens.as_slice(), None, &interface);

        // Verify
        assert_eq!(result, Err(DispatchError::Exit(1)));
        let (_, error) = interface.consume_error();
        assert_eq!(error, expected);
    }

    #[test]
    fn parse_git_like() {
        // Setup
        let mut argp: ArgP = ArgP::new("git");
        argp.add(Argument::new(["-C"]).arity(Arity::One).dest("change"))
            .unwrap();
        argp.subcmd(Command::new("commit", |_| ()))
            .unwrap()
            .add(Argument::new(["-m", "--message"]).arity(Arity::One))
            .unwrap()
            .add(Argument::new(["paths"]).arity(Arity::Many).required(false))
            .unwrap();

        // Execute
        let bundle = parse(
            &argp,
            &["-C", ".", "commit", "--message", "Lorem ipsum", "a.txt", "b.txt"],
        )
        .unwrap();

        // Verify
        assert_eq!(bundle.get::<String>("change"), Some(&".".to_string()));
        assert_eq!(
            bundle.get::<String>("message"),
            Some(&"Lorem ipsum".to_string())
        );
        assert_eq!(
            bundle.get::<Vec<String>>("paths"),
            Some(&vec!["a.txt".to_string(), "b.txt".to_string()])
        );
    }

    #[test]
    fn parse_fresh_defaults() {
        // Setup
        let mut argp: ArgP = ArgP::new("program");
        argp.add(Argument::new(["--items"]).arity(Arity::Many).default(vec![1u32]))
            .unwrap();

        // Execute
        let mut first = parse(&argp, &[]).unwrap();
        first
            .remove::<Vec<u32>>("items")
            .unwrap()
            .push(2);
        let second = parse(&argp, &[]).unwrap();

        // Verify
        assert_eq!(second.get::<Vec<u32>>("items"), Some(&vec![1]));
    }

    #[test]
    fn version_claimed_by_flag() {
        // Setup
        let mut argp: ArgP = ArgP::new("program");
        argp.add(Argument::new(["--version"])).unwrap();
        let argp = argp.version("1.0.0");

        // Execute
        let bundle = parse(&argp, &["--version"]).unwrap();

        // Verify
        assert!(bundle.flag("version"));
    }
}
