pub(crate) const HELP_NAME: &str = "help";
pub(crate) const HELP_SHORT: char = 'h';
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";
pub(crate) const VERSION_NAME: &str = "version";
pub(crate) const VERSION_MESSAGE: &str = "Show program's version number and exit.";
pub(crate) const LITERAL_SEPARATOR: &str = "--";
// Normalized destinations never contain '<', so the built-ins cannot collide with declared arguments.
pub(crate) const HELP_DEST: &str = "<help>";
pub(crate) const VERSION_DEST: &str = "<version>";
