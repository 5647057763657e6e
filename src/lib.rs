//! `teenycli` is a small, declarative command line parser for Rust.
//!
//! It covers the common case of a program with a handful of flags and positionals, optionally split into (nested) sub-commands, each bound to a handler.
//! Specifically, `teenycli` prioritizes the following design concerns:
//! * *Declaration over validation*:
//! An argument is declared once, by its names and a few settings; everything else is inferred.
//! Mis-declarations are rejected at declaration time, not when a user runs the program.
//! * *Flat results*:
//! Parsing produces a single [`Bundle`] of every argument along the selected command path, keyed by name.
//! * *Dispatch*:
//! Each sub-command carries its own handler, so `main` only needs to call [`ArgP::dispatch`].
//! * *Familiar syntax*:
//! The Cli syntax follows the conventions of Python's `argparse`.
//!
//! Beyond parsing, `teenycli` includes a few helpers for small command line programs: colours ([`term`]), yes/no prompts ([`prompt`]) and running external commands ([`shell`]).
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/calc.rs")]
//! ```
//!
//! ```console
//! $ calc -h
//! usage: calc [-h] {add,sub} ...
//!
//! Add or subtract two integers.
//!
//! subcommands:
//!  add          Compute LEFT + RIGHT.
//!  sub          Compute LEFT - RIGHT.
//!
//! options:
//!  -h, --help   Show this help message and exit.
//!
//! $ calc sub 80 38
//! 42
//!
//! $ calc
//! usage: calc [-h] {add,sub} ...
//! <truncated>
//! Parse error: A sub-command is required (choose from 'add', 'sub').
//!
//! $ calc add 1 blah
//! usage: calc add [-h] LEFT RIGHT
//! Parse error: 'blah' cannot convert to i64.
//! add 1 blah
//!       ^
//! ```
//!
//! # Arguments
//! Declare arguments via [`ArgP::add`], which takes an [`Argument`].
//! The first name of the argument decides its kind:
//! * *Flags* start with a hyphen (ex: `-C`, `--message`), and may have several aliases (ex: `["-m", "--message"]`).
//! * *Positionals* have precisely one name (ex: `paths`), and are matched in declaration order.
//!
//! Each argument consumes values according to its [`Arity`]:
//! * `Arity::Zero`: a presence-only flag, resolving to a `bool`.
//! * `Arity::One`: a single value.
//! * `Arity::Many`: a `Vec` of values.
//!
//! When unset, the arity and requiredness are inferred:
//! ```console
//! Kind       | Declared                     | Arity | Required | Syntax              | Absent value
//! -------------------------------------------------------------------------------------------------------
//! Flag       |                              | Zero  | no       | [--NAME]            | false
//! Flag       | required(..) / default(..)   | One   | as given | [--NAME NAME]       | default, or absent
//! Flag       | arity(Many)                  | Many  | no       | [--NAME [NAME ...]] | default, or empty
//! Flag       | arity(Many), required(true)  | Many  | yes      | --NAME NAME [...]   | -
//! Positional |                              | One   | yes      | NAME                | -
//! Positional | required(false)              | One   | no       | [NAME]              | default, or absent
//! Positional | arity(Many)                  | Many  | yes      | NAME [...]          | -
//! Positional | arity(Many), required(false) | Many  | no       | [NAME ...]          | default, or empty
//! ```
//!
//! A default makes the argument optional, and cannot be combined with `required(true)`.
//! Values are `String`s, unless converted via [`Argument::convert`] (any `T: FromStr`).
//!
//! The value is stored in the [`Bundle`] under the argument's *dest*: the first `--long` alias (or else the first name), without leading hyphens and with `-` replaced by `_`.
//! For example, `["-n", "--dry-run"]` is stored as `dry_run`.
//! Use [`Argument::dest`] to choose the dest explicitly.
//!
//! # Sub-commands
//! Register sub-commands via [`ArgP::subcmd`], which takes a [`Command`] and returns the child parser.
//! Sub-commands nest to any depth, and their program names compose (ex: `git remote add`).
//! A parser may have positionals or sub-commands, but not both.
//!
//! By default, selecting one of the sub-commands is required.
//! Use [`Command::required`] to make the selection optional; all siblings must agree on the setting.
//!
//! ```no_run
#![doc = include_str!("../demos/git_like.rs")]
//! ```
//!
//! # Cli Semantics
//! `teenycli` matches the Cli tokens according to the following rules.
//!
//! * Positionals are matched based off positional ordering, switching to the next once the arity is satisfied.
//! * Flags are matched via any of their aliases.
//! The value of a `--key` flag may be given as `--key value` or `--key=value` (only the first `=` separates).
//! * Single-dash flags may be bundled: `-abc` is equivalent to `-a -b -c`, where only the final flag may take values.
//! * `Arity::Many` matches greedily; the run is broken by the next flag.
//! * If a flag is repeated, the last occurrence wins.
//! * `--` ends flag matching: all further tokens are positional values.
//! * Negative numbers (ex: `-5`) are values, unless the parser declares a numeric-looking flag (ex: `-1`).
//! * In a parser with sub-commands, the first positional-like token which isn't a flag value selects the sub-command.
//! Everything after the selection is parsed by the selected sub-command.
//! * `-h`/`--help` is available on every parser; `--version` is added to the root via [`ArgP::version`].
//! These print to stdout and exit with `0`.
//! * User errors print the usage and error message to stderr, then exit with `1`.
//!
//! # Features
//! * `unit_test`: For features that help with unit testing (ex: [`Bundle::test_dummy`](./struct.Bundle.html#method.test_dummy)).
//! * `tracing_debug`: Emit debug events via `tracing` while parsing (ex: the resolved bundle before dispatch).
pub mod prompt;
pub mod shell;
pub mod term;

pub use teenycli_builder::*;
