pub(crate) const HELP_NAMES: &str = "-h, --help";
pub(crate) const HELP_MESSAGE: &str = "Show this help message and exit.";

pub(crate) const OPTION_PREFIX: char = '-';
pub(crate) const LONG_PREFIX: &str = "--";
pub(crate) const END_OF_OPTIONS: &str = "--";
pub(crate) const INCLUDE_PREFIX: char = '@';
pub(crate) const INLINE_DELIMITER: char = '=';
pub(crate) const FORWARD_DELIMITER: char = ',';

/// The default limit on nested `@file` inclusion.
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 8;
