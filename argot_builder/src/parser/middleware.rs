use std::env;
use std::ffi::OsString;

use crate::constant::*;
use crate::model::ErrorCode;
use crate::parser::base::Walker;
use crate::parser::definition::ParserDefinition;
use crate::parser::interface::{ConsoleInterface, UserInterface};
use crate::parser::printer::{DefaultFormatter, HelpFormatter};
use crate::parser::result::{ParseResult, ResultBuilder};
use crate::parser::tokens::{DiskFileSystem, FileSystem, IterTokens, TokenStream};

/// The collaborators and switches which drive a parse.
pub(crate) struct Settings {
    pub(crate) max_include_depth: usize,
    pub(crate) help_on_empty: bool,
    pub(crate) formatter: Box<dyn HelpFormatter>,
    pub(crate) file_system: Box<dyn FileSystem>,
    pub(crate) user_interface: Box<dyn UserInterface>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            help_on_empty: false,
            formatter: Box::new(DefaultFormatter::default()),
            file_system: Box::new(DiskFileSystem::default()),
            user_interface: Box::new(ConsoleInterface::default()),
        }
    }
}

/// The configured command line parser.
/// Built via [`CommandLineParser::build`](./struct.CommandLineParser.html#method.build) or
/// [`CommandLineParser::build_parser`](./struct.CommandLineParser.html#method.build_parser).
///
/// A parser may be run any number of times: every bound variable is reset to its default at the start of each parse.
pub struct GeneralParser<'a> {
    program: String,
    definition: ParserDefinition<'a>,
    settings: Settings,
}

impl<'a> GeneralParser<'a> {
    pub(crate) fn new(
        program: impl Into<String>,
        definition: ParserDefinition<'a>,
        settings: Settings,
    ) -> Self {
        Self {
            program: program.into(),
            definition,
            settings,
        }
    }

    /// The program name, as shown in usage.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The definition of everything this parser accepts.
    pub fn definition(&self) -> &ParserDefinition<'a> {
        &self.definition
    }

    /// Print the help message of the top level parser.
    pub fn print_help(&self) {
        self.settings.formatter.format(
            &self.program,
            &self.definition,
            &*self.settings.user_interface,
        );
    }

    /// Run the command line parser against the input tokens.
    ///
    /// Every bound variable is first reset to its default.
    /// Tokens are then matched and captured in a single pass; errors accumulate in the returned [`ParseResult`].
    /// Any errors are rendered to the user interface before returning.
    pub fn parse_tokens(&mut self, tokens: &[&str]) -> ParseResult {
        self.parse_stream(IterTokens::new(tokens.iter().copied()))
    }

    /// Run the command line parser against an arbitrary token stream.
    pub fn parse_stream(&mut self, stream: impl TokenStream) -> ParseResult {
        self.definition.reset();
        let outcome = Walker::new(
            self.program.clone(),
            &mut self.definition,
            &self.settings,
            vec![Box::new(stream)],
        )
        .walk();
        let mut builder = outcome.builder;
        builder.render(&*self.settings.user_interface);
        builder.build()
    }

    /// Run the command line parser against OS strings (ex: `std::env::args_os`, without the program name).
    ///
    /// Any argument which isn't valid unicode fails the parse with `INVALID_ARGV`, before anything is captured.
    pub fn parse_args_os<I>(&mut self, args: I) -> ParseResult
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut tokens = Vec::default();

        for arg in args {
            match arg.into_string() {
                Ok(token) => tokens.push(token),
                Err(arg) => {
                    let mut builder = ResultBuilder::default();
                    builder.error(
                        arg.to_string_lossy(),
                        ErrorCode::InvalidArgv,
                        Some("The argument is not valid unicode.".to_string()),
                    );
                    builder.render(&*self.settings.user_interface);
                    return builder.build();
                }
            }
        }

        self.parse_stream(IterTokens::new(tokens))
    }

    /// Run the command line parser against the Cli [`env::args_os`].
    ///
    /// If at any point the parser encounters an error (ex: un-matched token, un-capturable token, etc), it will exit with error code `1` (via `std::process::exit`).
    ///
    /// If help is shown or an action requests to exit, the parser will exit with error code `0`.
    ///
    /// Any instances built by command factories are returned, for the program to execute.
    pub fn parse(mut self) -> ParseResult {
        let result = self.parse_args_os(env::args_os().skip(1));

        if let Some(exit_code) = result.exit_code() {
            std::process::exit(exit_code);
        }

        result
    }
}

impl std::fmt::Debug for GeneralParser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralParser")
            .field("program", &self.program)
            .field("definition", &self.definition)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommandLineParser, Parameter, Scalar, Switch};
    use crate::parser::interface::InMemoryInterface;
    use crate::parser::tokens::LineTokens;
    use crate::test::assert_contains;
    use rstest::rstest;

    #[test]
    fn parse_tokens_empty() {
        // Setup
        let interface = InMemoryInterface::default();
        let mut parser = CommandLineParser::new("program")
            .interface(interface.clone())
            .build_parser()
            .unwrap();

        // Execute
        let result = parser.parse_tokens(empty::slice());

        // Verify
        assert!(result.is_ok());
        assert_eq!(result.exit_code(), None);
        assert!(interface.messages().is_empty());
        assert!(interface.errors().is_empty());
    }

    #[rstest]
    #[case(vec!["1"], false, 1)]
    #[case(vec!["--flag", "1"], true, 1)]
    #[case(vec!["1", "--flag"], true, 1)]
    fn parse_tokens(#[case] tokens: Vec<&str>, #[case] flag: bool, #[case] value: u32) {
        // Setup
        let interface = InMemoryInterface::default();
        let mut variable: u32 = 0;
        let mut switch = false;
        let mut parser = CommandLineParser::new("program")
            .add(Parameter::option(Switch::new(&mut switch, true), "--flag"))
            .add(Parameter::argument(Scalar::new(&mut variable), "variable"))
            .interface(interface.clone())
            .build_parser()
            .unwrap();

        // Execute
        let result = parser.parse_tokens(tokens.as_slice());

        // Verify
        assert!(result.is_ok());
        drop(parser);
        assert_eq!(switch, flag);
        assert_eq!(variable, value);
        assert!(interface.errors().is_empty());
    }

    #[rstest]
    #[case(vec!["--help"])]
    #[case(vec!["-h"])]
    #[case(vec!["-h", "--unknown"])]
    fn parse_tokens_help(#[case] tokens: Vec<&str>) {
        // Setup
        let interface = InMemoryInterface::default();
        let mut parser = CommandLineParser::new("program")
            .interface(interface.clone())
            .build_parser()
            .unwrap();

        // Execute
        let result = parser.parse_tokens(tokens.as_slice());

        // Verify
        assert!(result.errors().is_empty());
        assert!(result.help_was_shown());
        assert_eq!(result.exit_code(), Some(0));

        let message = interface.message();
        assert_contains!(message, "usage: program [-h]");
        assert_contains!(message, "-h, --help");
    }

    #[rstest]
    #[case(vec!["not-u32"])]
    #[case(vec!["--flag", "not-u32"])]
    fn parse_tokens_inconvertible(#[case] tokens: Vec<&str>) {
        // Setup
        let interface = InMemoryInterface::default();
        let mut variable: u32 = 0;
        let mut switch = false;
        let mut parser = CommandLineParser::new("program")
            .add(Parameter::option(Switch::new(&mut switch, true), "--flag"))
            .add(Parameter::argument(Scalar::new(&mut variable), "variable"))
            .interface(interface.clone())
            .build_parser()
            .unwrap();

        // Execute
        let result = parser.parse_tokens(tokens.as_slice());

        // Verify
        assert_eq!(result.exit_code(), Some(1));
        assert_eq!(result.errors()[0].code(), ErrorCode::ConversionError);
        assert!(result.errors_were_shown());

        let errors = interface.errors();
        assert_eq!(errors.len(), 1);
        assert_contains!(errors[0], "Parse error");
        assert_contains!(errors[0], "variable");
    }

    #[test]
    fn parse_repeatedly() {
        // Setup
        let interface = InMemoryInterface::default();
        let mut variable: u32 = 0;
        let mut parser = CommandLineParser::new("program")
            .add(Parameter::option(Scalar::new(&mut variable), "--value"))
            .interface(interface.clone())
            .build_parser()
            .unwrap();

        // Execute
        let first = parser.parse_tokens(&["--value", "3"]);
        let second = parser.parse_tokens(empty::slice());

        // Verify
        assert!(first.is_ok());
        assert!(second.is_ok());
        drop(parser);
        // The second parse resets the variable.
        assert_eq!(variable, 0);
    }

    #[test]
    fn parse_stream() {
        // Setup
        let interface = InMemoryInterface::default();
        let mut items: Vec<u32> = Vec::default();
        let mut parser = CommandLineParser::new("program")
            .add(Parameter::argument(
                crate::api::Collection::new(&mut items, crate::model::Nargs::Any),
                "item",
            ))
            .interface(interface.clone())
            .build_parser()
            .unwrap();

        // Execute
        let result = parser.parse_stream(LineTokens::new("1\r\n\n2\n3".as_bytes()));

        // Verify
        assert!(result.is_ok());
        drop(parser);
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[cfg(unix)]
    #[test]
    fn parse_args_os_invalid() {
        use std::os::unix::ffi::OsStringExt;

        // Setup
        let interface = InMemoryInterface::default();
        let mut parser = CommandLineParser::new("program")
            .interface(interface.clone())
            .build_parser()
            .unwrap();

        // Execute
        let result = parser.parse_args_os(vec![
            OsString::from("ok"),
            OsString::from_vec(vec![0x66, 0x6f, 0x80]),
        ]);

        // Verify
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].code(), ErrorCode::InvalidArgv);
        assert_eq!(interface.errors().len(), 1);
    }

    #[test]
    fn print_help() {
        // Setup
        let interface = InMemoryInterface::default();
        let parser = CommandLineParser::new("program")
            .about("Does things.")
            .interface(interface.clone())
            .build_parser()
            .unwrap();

        // Execute
        parser.print_help();

        // Verify
        assert_eq!(parser.program(), "program");
        assert_eq!(parser.definition().help_names(), &["--help".to_string()]);
        let message = interface.message();
        assert_contains!(message, "usage: program [-h]");
        assert_contains!(message, "Does things.");
    }
}
