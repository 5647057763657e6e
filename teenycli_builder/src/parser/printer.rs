use terminal_size::{terminal_size, Width};

use crate::constant::*;
use crate::model::Nargs;
use crate::parser::interface::UserInterface;
use crate::parser::{ColumnRenderer, LeftWidth, PaddingWidth, TotalWidth};

#[derive(Debug)]
pub(crate) struct OptionParameter {
    names: Vec<String>,
    dest: String,
    nargs: Nargs,
    required: bool,
    help: Option<String>,
}

impl OptionParameter {
    pub(crate) fn new(
        names: Vec<String>,
        dest: String,
        nargs: Nargs,
        required: bool,
        help: Option<String>,
    ) -> Self {
        Self {
            names,
            dest,
            nargs,
            required,
            help,
        }
    }

    fn grammar(&self) -> String {
        let example = metavar(&self.dest);

        match self.nargs {
            Nargs::Precisely(n) => (0..n).map(|_| format!(" {example}")).collect(),
            Nargs::Optional => format!(" [{example}]"),
            Nargs::Any => format!(" [{example} ...]"),
            Nargs::AtLeastOne => format!(" {example} [...]"),
        }
    }

    fn summary(&self) -> String {
        let alias = self
            .names
            .first()
            .expect("internal error - flags have at least one alias");

        if self.required {
            format!("{alias}{}", self.grammar())
        } else {
            format!("[{alias}{}]", self.grammar())
        }
    }

    fn flags(&self) -> String {
        let grammar = self.grammar();
        self.names
            .iter()
            .map(|alias| format!("{alias}{grammar}"))
            .collect::<Vec<String>>()
            .join(", ")
    }
}

#[derive(Debug)]
pub(crate) struct ArgumentParameter {
    dest: String,
    nargs: Nargs,
    help: Option<String>,
}

impl ArgumentParameter {
    pub(crate) fn new(dest: String, nargs: Nargs, help: Option<String>) -> Self {
        Self { dest, nargs, help }
    }

    fn grammar(&self) -> String {
        let example = metavar(&self.dest);

        match self.nargs {
            Nargs::Precisely(n) => (0..n)
                .map(|_| example.clone())
                .collect::<Vec<String>>()
                .join(" "),
            Nargs::Optional => format!("[{example}]"),
            Nargs::Any => format!("[{example} ...]"),
            Nargs::AtLeastOne => format!("{example} [...]"),
        }
    }
}

#[derive(Debug)]
pub(crate) struct CommandParameter {
    name: String,
    help: Option<String>,
}

impl CommandParameter {
    pub(crate) fn new(name: impl Into<String>, help: Option<String>) -> Self {
        Self {
            name: name.into(),
            help,
        }
    }
}

fn metavar(dest: &str) -> String {
    dest.to_ascii_uppercase().replace('-', "_")
}

/// Renders the usage line & help message of a single node of the command tree.
#[derive(Debug)]
pub(crate) struct Printer {
    program: String,
    about: Option<String>,
    version: bool,
    options: Vec<OptionParameter>,
    arguments: Vec<ArgumentParameter>,
    commands: Vec<CommandParameter>,
    commands_required: bool,
    terminal_width: Option<usize>,
}

const DEFAULT_TOTAL_WIDTH: usize = 80;
const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;

impl Printer {
    pub(crate) fn terminal(
        program: impl Into<String>,
        options: Vec<OptionParameter>,
        arguments: Vec<ArgumentParameter>,
    ) -> Self {
        let terminal_width = if let Some((Width(terminal_width), _)) = terminal_size() {
            Some(terminal_width as usize)
        } else {
            None
        };

        Self::new(program, options, arguments, terminal_width)
    }

    pub(crate) fn new(
        program: impl Into<String>,
        options: Vec<OptionParameter>,
        arguments: Vec<ArgumentParameter>,
        terminal_width: Option<usize>,
    ) -> Self {
        Self {
            program: program.into(),
            about: None,
            version: false,
            options,
            arguments,
            commands: Vec::default(),
            commands_required: false,
            terminal_width,
        }
    }

    pub(crate) fn about(mut self, about: Option<String>) -> Self {
        self.about = about;
        self
    }

    pub(crate) fn version(mut self, version: bool) -> Self {
        self.version = version;
        self
    }

    pub(crate) fn commands(mut self, commands: Vec<CommandParameter>, required: bool) -> Self {
        self.commands = commands;
        self.commands_required = required;
        self
    }

    /// The single line grammar of the node, ex: `usage: program [-h] [--long] PATH {add,sub} ...`.
    pub(crate) fn usage(&self) -> String {
        let mut summary = vec![format!("[-{HELP_SHORT}]")];

        if self.version {
            summary.push(format!("[--{VERSION_NAME}]"));
        }

        summary.extend(self.options.iter().map(OptionParameter::summary));
        summary.extend(
            self.arguments
                .iter()
                .map(ArgumentParameter::grammar)
                .filter(|grammar| !grammar.is_empty()),
        );

        if !self.commands.is_empty() {
            let choices = format!("{{{}}} ...", self.command_names().join(","));

            if self.commands_required {
                summary.push(choices);
            } else {
                summary.push(format!("[{choices}]"));
            }
        }

        format!("usage: {p} {s}", p = self.program, s = summary.join(" "))
    }

    fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }

    /// The full help message of the node.
    pub(crate) fn help(&self) -> String {
        let help_flags = format!("-{HELP_SHORT}, --{HELP_NAME}");
        let version_flags = format!("--{VERSION_NAME}");
        let mut option_rows: Vec<(String, String)> =
            vec![(help_flags, HELP_MESSAGE.to_string())];

        if self.version {
            option_rows.push((version_flags, VERSION_MESSAGE.to_string()));
        }

        option_rows.extend(
            self.options
                .iter()
                .map(|option| (option.flags(), option.help.clone().unwrap_or_default())),
        );

        let argument_rows: Vec<(String, String)> = self
            .arguments
            .iter()
            .map(|argument| (argument.grammar(), argument.help.clone().unwrap_or_default()))
            .collect();

        let command_rows: Vec<(String, String)> = self
            .commands
            .iter()
            .map(|command| (command.name.clone(), command.help.clone().unwrap_or_default()))
            .collect();

        let left_column_width = option_rows
            .iter()
            .chain(argument_rows.iter())
            .chain(command_rows.iter())
            .map(|(left, _)| left.chars().count())
            .max()
            .unwrap_or(1);

        let column_renderer = ColumnRenderer::guided(
            PaddingWidth::new(PADDING_WIDTH).expect("internal error - padding must be positive"),
            LeftWidth::new(std::cmp::max(1, left_column_width))
                .expect("internal error - left must be positive"),
            TotalWidth(self.terminal_width.unwrap_or(DEFAULT_TOTAL_WIDTH)),
        );

        let mut lines = vec![self.usage()];

        if let Some(about) = &self.about {
            lines.push("".to_string());
            lines.push(about.clone());
        }

        for (title, rows) in [
            ("positional arguments:", &argument_rows),
            ("subcommands:", &command_rows),
            ("options:", &option_rows),
        ] {
            if rows.is_empty() {
                continue;
            }

            lines.push("".to_string());
            lines.push(title.to_string());

            for (left, middle) in rows {
                lines.extend(column_renderer.render(MAIN_INDENT, left, middle));
            }
        }

        lines.join("\n")
    }

    pub(crate) fn print_help(&self, user_interface: &(impl UserInterface + ?Sized)) {
        user_interface.print(self.help());
    }
}
