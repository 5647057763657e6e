//! Yes/no confirmation prompts.
use std::io::{self, BufRead, Write};

/// Exit status of [`confirm`] when the answer is "no".
pub const DECLINED_EXIT_CODE: i32 = 2;

/// Ask `message` until a yes/no answer is read from `reader`.
///
/// Accepts `yes`, `y`, `no` and `n` (case insensitive, surrounding whitespace ignored); anything else asks again.
/// Running out of input is an [`io::ErrorKind::UnexpectedEof`].
///
/// ### Example
/// ```
/// use teenycli::prompt::ask;
///
/// let mut output = Vec::new();
/// let answer = ask(&b"maybe\nY\n"[..], &mut output, "Proceed?").unwrap();
///
/// assert!(answer);
/// assert_eq!(String::from_utf8(output).unwrap(), "Proceed? Proceed? ");
/// ```
pub fn ask<R, W>(mut reader: R, mut writer: W, message: &str) -> io::Result<bool>
where
    R: BufRead,
    W: Write,
{
    let message = format!("{} ", message.trim_end());
    let mut line = String::default();

    loop {
        writer.write_all(message.as_bytes())?;
        writer.flush()?;
        line.clear();

        if reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no answer to the confirmation prompt",
            ));
        }

        match line.trim().to_lowercase().as_str() {
            "yes" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => continue,
        }
    }
}

/// Ask `message` on the terminal, exiting the process with [`DECLINED_EXIT_CODE`] unless the answer is "yes".
pub fn confirm(message: &str) -> io::Result<()> {
    let stdin = io::stdin();

    if ask(stdin.lock(), io::stdout(), message)? {
        Ok(())
    } else {
        std::process::exit(DECLINED_EXIT_CODE)
    }
}
