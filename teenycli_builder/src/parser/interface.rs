use crate::parser::base::ParseError;
use crate::parser::ErrorContext;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub(crate) struct PaddingWidth(usize);

impl PaddingWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // padding must be at least 1
        if width >= 1 {
            Ok(PaddingWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct LeftWidth(usize);

impl LeftWidth {
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // left must be at least 1
        if width >= 1 {
            Ok(LeftWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct MiddleWidth(usize);

impl MiddleWidth {
    #[cfg(test)]
    pub(crate) fn new(width: usize) -> Result<Self, ()> {
        // middle must be at least 2 (so we can hyphenate)
        if width >= 2 {
            Ok(MiddleWidth(width))
        } else {
            Err(())
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TotalWidth(pub usize);

/// Renders a two column table: the argument grammar on the left, its description on the right.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: PaddingWidth,
    left: LeftWidth,
    middle: MiddleWidth,
}

// Target 95% of the total width, so the renderer never runs flush against the terminal edge.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// With an average word length of 5, this fits precisely 3 words with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

// Left cells are capped so that descriptions stay in view; wider cells push their description onto the next line.
pub(crate) const MAXIMUM_LEFT_WIDTH: usize = 24;

impl ColumnRenderer {
    /// Produce a renderer based off the provided widths.
    /// This renderer will use a heuristic to chose the middle width.
    pub(crate) fn guided(
        padding: PaddingWidth,
        left: LeftWidth,
        total_width: TotalWidth,
    ) -> Self {
        let left = LeftWidth(std::cmp::min(left.0, MAXIMUM_LEFT_WIDTH));
        let non_middle = left.0 + padding.0;
        let target_total_width = (total_width.0 as f64 * TARGET_TOTAL_FACTOR) as usize;

        let middle = if non_middle + MINIMUM_MIDDLE_WIDTH <= target_total_width {
            target_total_width - non_middle
        } else {
            MINIMUM_MIDDLE_WIDTH
        };

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Columns {non_middle} within the total {total_width:?}.  Selecting middle: {middle}.");
        }

        Self::new(padding, left, MiddleWidth(middle))
    }

    /// Produce a renderer based off the provided widths.
    pub(crate) fn new(padding: PaddingWidth, left: LeftWidth, middle: MiddleWidth) -> Self {
        Self {
            padding,
            left,
            middle,
        }
    }

    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let padding = format!("{:width$}", "", width = self.padding.0);
        let left_column_width = self.left.0;
        let middle_parts = chunk(middle, self.middle.0);
        let mut out = Vec::default();
        let mut parts = middle_parts.iter();

        if left.chars().count() > left_column_width {
            out.push(format!("{:indent$}{left}", ""));
        } else if let Some(part) = parts.next() {
            out.push(format!(
                "{:indent$}{left:left_column_width$}{padding}{part}",
                ""
            ));
        } else {
            out.push(format!("{:indent$}{left}", ""));
        }

        for part in parts {
            out.push(format!(
                "{:indent$}{:left_column_width$}{padding}{part}",
                "", ""
            ));
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ').filter(|word| !word.is_empty()) {
        let current_length = current.chars().count();

        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if current_length + word.chars().count() + 1 <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut left = 0;

    while characters.len() - left > width {
        let piece: String = characters[left..left + increment].iter().collect();
        lines.push(format!("{piece}-"));
        left += increment;
    }

    current.extend(&characters[left..]);
}

/// Where the parser writes its messages.
pub(crate) trait UserInterface {
    /// Informational output (help, version), destined to stdout.
    fn print(&self, message: String);
    /// Usage or help preceding an error, destined to stderr.
    fn print_usage(&self, message: String);
    fn print_error(&self, error: ParseError);
    fn print_error_context(&self, error_context: ErrorContext);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_usage(&self, message: String) {
        eprintln!("{message}");
    }

    fn print_error(&self, error: ParseError) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }
}
