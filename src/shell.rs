//! Run external commands, capturing their output.
use std::process::Command;
use thiserror::Error;

/// The failure to run a command via [`run`].
#[derive(Debug, Error)]
pub enum ShellError {
    /// No program was given.
    #[error("Cannot run an empty command.")]
    Empty,

    /// The program could not be started (ex: it does not exist).
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        /// The program.
        program: String,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The program ran, but did not exit successfully.
    #[error("Command '{command}' failed (status {status:?}): {stderr}")]
    Failed {
        /// The command line, joined by spaces.
        command: String,
        /// The exit status, if the program exited (rather than being terminated by a signal).
        status: Option<i32>,
        /// The captured stderr.
        stderr: String,
    },

    /// The program wrote output which is not valid UTF-8.
    #[error("Command '{0}' produced non UTF-8 output.")]
    Utf8(String),
}

/// Run the program `command[0]` with the arguments `command[1..]`, returning its captured stdout.
///
/// The command is run directly, without a shell; its stdin is inherited.
///
/// ### Example
/// ```
/// # #[cfg(unix)]
/// # {
/// use teenycli::shell::run;
///
/// assert_eq!(run(&["echo", "hello"]).unwrap(), "hello\n");
/// # }
/// ```
pub fn run<S: AsRef<str>>(command: &[S]) -> Result<String, ShellError> {
    let (program, arguments) = match command.split_first() {
        Some((program, arguments)) => (program, arguments),
        None => return Err(ShellError::Empty),
    };
    let program: &str = program.as_ref();
    let arguments: Vec<&str> = arguments.iter().map(|argument| argument.as_ref()).collect();
    let joined = std::iter::once(program)
        .chain(arguments.iter().copied())
        .collect::<Vec<&str>>()
        .join(" ");

    let output = Command::new(program)
        .args(&arguments)
        .output()
        .map_err(|source| ShellError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ShellError::Failed {
            command: joined,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| ShellError::Utf8(joined))
}
