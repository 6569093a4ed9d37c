use std::cell::Cell;
use thiserror::Error;

use crate::api::{CommandOptions, InvalidCapture};
use crate::model::ErrorCode;
use crate::parser::interface::UserInterface;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A problem encountered while parsing.
///
/// Identified by the `name` of the offending option, group, token or command, and its [`ErrorCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", describe(.name, .code, .detail))]
pub struct ParseError {
    name: String,
    code: ErrorCode,
    detail: Option<String>,
}

fn describe(name: &str, code: &ErrorCode, detail: &Option<String>) -> String {
    let message = match code {
        ErrorCode::UnknownOption => format!("Unknown option '{name}'."),
        ErrorCode::ExclusiveOption => {
            format!("Only one option of the exclusive group '{name}' may be used.")
        }
        ErrorCode::MissingOption => format!("Option '{name}' is required."),
        ErrorCode::MissingOptionGroup => {
            format!("One option of the group '{name}' is required.")
        }
        ErrorCode::MissingArgument => {
            format!("Not enough tokens provided to parameter '{name}'.")
        }
        ErrorCode::ConversionError => format!("Invalid value for '{name}'."),
        ErrorCode::InvalidChoice => format!("Invalid choice for '{name}'."),
        ErrorCode::FlagParameter => format!("Option '{name}' does not take a value."),
        ErrorCode::ExitRequested => format!("'{name}' requested an exit."),
        ErrorCode::ActionError => format!("The action of '{name}' failed."),
        ErrorCode::InvalidArgv => format!("Token '{name}' is not valid unicode."),
        ErrorCode::IncludeTooDeep => format!("Include '{name}' is nested too deeply."),
        ErrorCode::IncludeNotFound => format!("Include '{name}' cannot be opened."),
        ErrorCode::InvalidCommand => format!("Command '{name}' is misconfigured."),
    };

    match detail {
        Some(detail) => format!("{message} {detail}"),
        None => message,
    }
}

impl ParseError {
    pub(crate) fn new(name: impl Into<String>, code: ErrorCode, detail: Option<String>) -> Self {
        Self {
            name: name.into(),
            code,
            detail,
        }
    }

    /// The name of the option, group, token or command this error concerns.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The kind of error.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Further detail, when available.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// The outcome of one parse.
///
/// A `ParseResult` holding errors must be inspected (via [`ParseResult::is_ok`], [`ParseResult::errors`],
/// or [`ParseResult::into_result`]) before it is dropped.
/// Debug builds panic when an unchecked failed result is dropped.
#[must_use = "a ParseResult may hold errors which must be checked"]
pub struct ParseResult {
    errors: Vec<ParseError>,
    ignored: Vec<String>,
    commands: Vec<String>,
    instances: Vec<Box<dyn CommandOptions>>,
    exit_requested: bool,
    help_was_shown: bool,
    errors_were_shown: bool,
    checked: Cell<bool>,
}

impl ParseResult {
    /// `true` when there are no errors and no exit was requested.
    pub fn is_ok(&self) -> bool {
        self.checked.set(true);
        self.errors.is_empty() && !self.exit_requested
    }

    /// The errors, in the order they were encountered.
    pub fn errors(&self) -> &[ParseError] {
        self.checked.set(true);
        &self.errors
    }

    /// Free arguments that no positional parameter accepted.
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// The names of the sub-commands entered, outermost first.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Whether an action (ex: help) requested the program to exit.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Whether the help message was printed.
    pub fn help_was_shown(&self) -> bool {
        self.help_was_shown
    }

    /// Whether the errors were already printed to the user interface.
    pub fn errors_were_shown(&self) -> bool {
        self.errors_were_shown
    }

    /// The conventional exit code for this outcome: `None` to continue, `Some(0)` for a clean exit,
    /// and `Some(1)` for errors.
    pub fn exit_code(&self) -> Option<i32> {
        self.checked.set(true);

        if !self.errors.is_empty() {
            Some(1)
        } else if self.exit_requested {
            Some(0)
        } else {
            None
        }
    }

    /// Take the lazily constructed [`CommandOptions`] of the sub-commands entered, outermost first.
    pub fn take_command_options(&mut self) -> Vec<Box<dyn CommandOptions>> {
        std::mem::take(&mut self.instances)
    }

    /// Convert into a `Result`, where `Err` carries the exit code.
    pub fn into_result(self) -> Result<(), i32> {
        match self.exit_code() {
            None => Ok(()),
            Some(code) => Err(code),
        }
    }
}

impl std::fmt::Debug for ParseResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseResult")
            .field("errors", &self.errors)
            .field("ignored", &self.ignored)
            .field("commands", &self.commands)
            .field("instances", &self.instances.len())
            .field("exit_requested", &self.exit_requested)
            .field("help_was_shown", &self.help_was_shown)
            .field("errors_were_shown", &self.errors_were_shown)
            .finish()
    }
}

impl Drop for ParseResult {
    fn drop(&mut self) {
        if cfg!(debug_assertions)
            && !self.checked.get()
            && !self.errors.is_empty()
            && !std::thread::panicking()
        {
            panic!(
                "a ParseResult with errors was dropped without being checked: {:?}",
                self.errors
            );
        }
    }
}

/// Accumulates the outcome of one (sub-)parse.
#[derive(Default)]
pub(crate) struct ResultBuilder {
    errors: Vec<ParseError>,
    ignored: Vec<String>,
    commands: Vec<String>,
    instances: Vec<Box<dyn CommandOptions>>,
    exit_requested: bool,
    help_was_shown: bool,
    errors_were_shown: bool,
}

impl ResultBuilder {
    pub(crate) fn error(&mut self, name: impl Into<String>, code: ErrorCode, detail: Option<String>) {
        let error = ParseError::new(name, code, detail);
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Parse error: {error:?}.");
        }
        self.errors.push(error);
    }

    pub(crate) fn capture_error(&mut self, name: impl Into<String>, error: InvalidCapture) {
        let code = match &error {
            InvalidCapture::InvalidChoice { .. } => ErrorCode::InvalidChoice,
            InvalidCapture::NoValues { .. } => ErrorCode::FlagParameter,
            InvalidCapture::InvalidConversion { .. } => ErrorCode::ConversionError,
        };
        self.error(name, code, Some(capitalize(error.to_string())));
    }

    pub(crate) fn ignore(&mut self, token: impl Into<String>) {
        self.ignored.push(token.into());
    }

    pub(crate) fn command(&mut self, name: impl Into<String>) {
        self.commands.push(name.into());
    }

    pub(crate) fn instance(&mut self, instance: Box<dyn CommandOptions>) {
        self.instances.push(instance);
    }

    pub(crate) fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    pub(crate) fn help_shown(&mut self) {
        self.help_was_shown = true;
        self.exit_requested = true;
    }

    pub(crate) fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Absorb the outcome of a sub-parse.
    pub(crate) fn merge(&mut self, other: ResultBuilder) {
        self.errors.extend(other.errors);
        self.ignored.extend(other.ignored);
        self.commands.extend(other.commands);
        self.instances.extend(other.instances);
        self.exit_requested |= other.exit_requested;
        self.help_was_shown |= other.help_was_shown;
        self.errors_were_shown |= other.errors_were_shown;
    }

    /// Print the errors, if any.
    pub(crate) fn render(&mut self, user_interface: &dyn UserInterface) {
        if !self.errors.is_empty() && !self.errors_were_shown {
            for error in &self.errors {
                user_interface.print_error(error);
            }

            self.errors_were_shown = true;
        }
    }

    pub(crate) fn build(self) -> ParseResult {
        ParseResult {
            errors: self.errors,
            ignored: self.ignored,
            commands: self.commands,
            instances: self.instances,
            exit_requested: self.exit_requested,
            help_was_shown: self.help_was_shown,
            errors_were_shown: self.errors_were_shown,
            checked: Cell::new(false),
        }
    }
}

fn capitalize(message: String) -> String {
    let mut characters = message.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::interface::InMemoryInterface;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::UnknownOption, None, "Unknown option '--x'.")]
    #[case(ErrorCode::MissingOption, None, "Option '--x' is required.")]
    #[case(
        ErrorCode::MissingArgument,
        Some("Expected 2."),
        "Not enough tokens provided to parameter '--x'. Expected 2."
    )]
    fn parse_error_display(
        #[case] code: ErrorCode,
        #[case] detail: Option<&str>,
        #[case] expected: &str,
    ) {
        let error = ParseError::new("--x", code, detail.map(str::to_string));
        assert_eq!(error.to_string(), expected);
        assert_eq!(error.name(), "--x");
        assert_eq!(error.code(), code);
        assert_eq!(error.detail(), detail);
    }

    #[test]
    fn capture_error_codes() {
        let mut builder = ResultBuilder::default();
        builder.capture_error(
            "--x",
            InvalidCapture::InvalidChoice {
                token: "a".to_string(),
            },
        );
        builder.capture_error(
            "--y",
            InvalidCapture::InvalidConversion {
                token: "a".to_string(),
                type_name: "u32",
                message: "invalid digit found in string".to_string(),
            },
        );

        let result = builder.build();
        let codes: Vec<ErrorCode> = result.errors().iter().map(|e| e.code()).collect();
        assert_eq!(codes, vec![ErrorCode::InvalidChoice, ErrorCode::ConversionError]);
        assert_eq!(
            result.errors()[1].detail(),
            Some("Cannot convert 'a' to u32: invalid digit found in string.")
        );
    }

    #[test]
    fn empty_result() {
        let result = ResultBuilder::default().build();
        assert!(result.is_ok());
        assert_eq!(result.exit_code(), None);
        assert!(result.ignored().is_empty());
        assert!(result.commands().is_empty());
    }

    #[test]
    fn exit_result() {
        let mut builder = ResultBuilder::default();
        builder.help_shown();
        let result = builder.build();
        assert!(!result.is_ok());
        assert!(result.help_was_shown());
        assert_eq!(result.into_result(), Err(0));
    }

    #[test]
    fn merge() {
        let mut parent = ResultBuilder::default();
        parent.command("sub");
        parent.ignore("a");
        let mut child = ResultBuilder::default();
        child.ignore("b");
        child.request_exit();
        child.error("--x", ErrorCode::UnknownOption, None);

        parent.merge(child);
        assert!(parent.exit_requested());

        let result = parent.build();
        assert_eq!(result.commands(), &["sub".to_string()]);
        assert_eq!(result.ignored(), &["a".to_string(), "b".to_string()]);
        assert_eq!(result.into_result(), Err(1));
    }

    #[test]
    fn render_once() {
        let interface = InMemoryInterface::default();
        let mut builder = ResultBuilder::default();
        builder.error("--x", ErrorCode::UnknownOption, None);
        builder.render(&interface);
        builder.render(&interface);

        let result = builder.build();
        assert!(result.errors_were_shown());
        assert_eq!(interface.errors(), vec!["Parse error: Unknown option '--x'."]);
        assert!(!result.is_ok());
    }

    #[test]
    #[should_panic]
    fn unchecked_errors_panic() {
        let mut builder = ResultBuilder::default();
        builder.error("--x", ErrorCode::UnknownOption, None);
        let _result = builder.build();
    }
}
