/// The cardinality of inputs to match for an argument/option.
///
/// Inspired by argparse: <https://docs.python.org/3/library/argparse.html#nargs>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nargs {
    /// `N`: Precisely `N` values.
    Precisely(usize),
    /// `*`: May be any number of values, including `0`.
    Any,
    /// `+`: At least one value must be specified.
    AtLeastOne,
    /// `N..`: At least `N` values must be specified.
    AtLeast(usize),
    /// `N..=M`: Between `N` and `M` values (inclusive).
    Range(usize, usize),
}

impl Nargs {
    /// The minimum number of values.
    pub fn min(&self) -> usize {
        match self {
            Nargs::Precisely(n) => *n,
            Nargs::Any => 0,
            Nargs::AtLeastOne => 1,
            Nargs::AtLeast(n) => *n,
            Nargs::Range(n, _) => *n,
        }
    }

    /// The maximum number of values, or `None` when unbounded.
    pub fn max(&self) -> Option<usize> {
        match self {
            Nargs::Precisely(n) => Some(*n),
            Nargs::Any | Nargs::AtLeastOne | Nargs::AtLeast(_) => None,
            Nargs::Range(_, m) => Some(*m),
        }
    }
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The kind of problem recorded in a [`ParseError`](./struct.ParseError.html).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// An option name was not recognized.
    UnknownOption,
    /// More than one option of an exclusive group was used.
    ExclusiveOption,
    /// A required option was not specified.
    MissingOption,
    /// No option of a required group was specified.
    MissingOptionGroup,
    /// Fewer values than the minimum were provided.
    MissingArgument,
    /// A value could not be converted to the target type.
    ConversionError,
    /// A value is not amongst the configured choices.
    InvalidChoice,
    /// A value was provided (via `=`) to an option that takes no values.
    FlagParameter,
    /// An action requested the parser to exit with an error.
    ExitRequested,
    /// An action reported an error through its `Environment`.
    ActionError,
    /// The raw input could not be read as tokens.
    InvalidArgv,
    /// `@file` inclusion nested deeper than the configured maximum.
    IncludeTooDeep,
    /// `@file` inclusion named a file which could not be opened.
    IncludeNotFound,
    /// A lazily constructed sub-command declared an invalid configuration.
    InvalidCommand,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            ErrorCode::UnknownOption => "UNKNOWN_OPTION",
            ErrorCode::ExclusiveOption => "EXCLUSIVE_OPTION",
            ErrorCode::MissingOption => "MISSING_OPTION",
            ErrorCode::MissingOptionGroup => "MISSING_OPTION_GROUP",
            ErrorCode::MissingArgument => "MISSING_ARGUMENT",
            ErrorCode::ConversionError => "CONVERSION_ERROR",
            ErrorCode::InvalidChoice => "INVALID_CHOICE",
            ErrorCode::FlagParameter => "FLAG_PARAMETER",
            ErrorCode::ExitRequested => "EXIT_REQUESTED",
            ErrorCode::ActionError => "ACTION_ERROR",
            ErrorCode::InvalidArgv => "INVALID_ARGV",
            ErrorCode::IncludeTooDeep => "INCLUDE_TOO_DEEP",
            ErrorCode::IncludeNotFound => "INCLUDE_NOT_FOUND",
            ErrorCode::InvalidCommand => "INVALID_COMMAND",
        };
        write!(f, "{code}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Nargs::Precisely(0), 0, Some(0))]
    #[case(Nargs::Precisely(3), 3, Some(3))]
    #[case(Nargs::Any, 0, None)]
    #[case(Nargs::AtLeastOne, 1, None)]
    #[case(Nargs::AtLeast(2), 2, None)]
    #[case(Nargs::Range(1, 4), 1, Some(4))]
    fn nargs_bounds(#[case] nargs: Nargs, #[case] min: usize, #[case] max: Option<usize>) {
        assert_eq!(nargs.min(), min);
        assert_eq!(nargs.max(), max);
    }

    #[test]
    fn error_code_display() {
        assert_eq!(ErrorCode::UnknownOption.to_string(), "UNKNOWN_OPTION");
        assert_eq!(ErrorCode::IncludeTooDeep.to_string(), "INCLUDE_TOO_DEEP");
    }
}
