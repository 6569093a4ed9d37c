use crate::api::{CommandLineParser, Group, GroupScope, Parameter};
use crate::parser::{ConfigError, ParserDefinition};

#[cfg(feature = "unit_test")]
use crate::parser::GeneralParser;

/// Behaviour for a type which declares the parameters of a sub-command, binding them to its own fields.
///
/// Registered with [`CommandLineParser::command_options`](./struct.CommandLineParser.html#method.command_options) or
/// [`CommandLineParser::command_factory`](./struct.CommandLineParser.html#method.command_factory).
/// The parameters are declared only once the command is matched on the command line.
///
/// ### Example
/// ```
/// # use argot_builder as argot;
/// use argot::{CommandLineParser, CommandOptions, Parameter, Scalar, SubCommand};
///
/// #[derive(Default)]
/// struct Add {
///     value: u32,
/// }
///
/// impl CommandOptions for Add {
///     fn add_parameters<'b>(&'b mut self, command: SubCommand<'b>) -> SubCommand<'b> {
///         command.add(Parameter::argument(Scalar::new(&mut self.value), "value"))
///     }
/// }
///
/// let mut add = Add::default();
/// let mut parser = CommandLineParser::new("program")
///     .command_options("add", &mut add)
///     .build();
///
/// assert!(parser.parse_tokens(vec!["add", "3"].as_slice()).is_ok());
/// drop(parser);
/// assert_eq!(add.value, 3);
/// ```
pub trait CommandOptions {
    /// Declare the sub-command's parameters onto `command`.
    fn add_parameters<'b>(&'b mut self, command: SubCommand<'b>) -> SubCommand<'b>;

    /// Run the sub-command, once parsed.
    /// An `Err` carries the exit code for the program.
    fn execute(&mut self) -> Result<(), i32> {
        Ok(())
    }
}

/// A sub-command line parser.
///
/// Used with [`CommandLineParser::command`](./struct.CommandLineParser.html#method.command) and [`CommandOptions`].
pub struct SubCommand<'a> {
    inner: CommandLineParser<'a>,
}

impl<'a> SubCommand<'a> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            inner: CommandLineParser::new(name),
        }
    }

    /// Declare the parameters of `options`, as it would be for parsing.
    pub(crate) fn define<'b>(
        name: &str,
        options: &'b mut dyn CommandOptions,
    ) -> Result<ParserDefinition<'b>, ConfigError> {
        options
            .add_parameters(SubCommand::new(name))
            .into_definition()
    }

    pub(crate) fn into_definition(self) -> Result<ParserDefinition<'a>, ConfigError> {
        self.inner.into_definition()
    }

    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Build a [`SubCommand`] for use in testing.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{Parameter, Scalar, SubCommand};
    ///
    /// // Function under test.
    /// // We want to make sure the setup_fn is wired up correctly.
    /// pub fn setup_fn<'a>(value: &'a mut u32) -> impl FnOnce(SubCommand<'a>) -> SubCommand<'a> {
    ///     |sub| sub.add(Parameter::argument(Scalar::new(value), "value"))
    /// }
    ///
    /// let mut x: u32 = 1;
    /// let mut parser = setup_fn(&mut x)(SubCommand::test_dummy()).build_parser().unwrap();
    /// assert!(parser.parse_tokens(vec!["2"].as_slice()).is_ok());
    /// drop(parser);
    /// assert_eq!(x, 2);
    /// ```
    #[cfg(feature = "unit_test")]
    pub fn test_dummy() -> Self {
        SubCommand::new("test-dummy")
    }

    /// *Available using 'unit_test' crate feature only.*</br></br>
    /// Build a [`GeneralParser`] for testing.
    /// See [`SubCommand::test_dummy`] for an example.
    #[cfg(feature = "unit_test")]
    pub fn build_parser(self) -> Result<GeneralParser<'a>, ConfigError> {
        self.inner.build_parser()
    }

    /// Document the about message for this sub-command.
    /// If repeated, only the final message will apply.
    ///
    /// The about message is shown both in the sub-command's own help and in the parent's list of commands.
    pub fn about(self, description: impl Into<String>) -> Self {
        Self {
            inner: self.inner.about(description),
        }
    }

    /// Replace the generated usage line of this sub-command's help.
    pub fn usage(self, usage: impl Into<String>) -> Self {
        Self {
            inner: self.inner.usage(usage),
        }
    }

    /// Document the text shown at the end of this sub-command's help.
    pub fn epilog(self, epilog: impl Into<String>) -> Self {
        Self {
            inner: self.inner.epilog(epilog),
        }
    }

    /// Add an argument/option to the sub-command.
    /// See [`CommandLineParser::add`](./struct.CommandLineParser.html#method.add).
    pub fn add<T: 'a>(self, parameter: Parameter<'a, T>) -> Self {
        Self {
            inner: self.inner.add(parameter),
        }
    }

    /// Add a group of options to the sub-command.
    /// See [`CommandLineParser::group`](./struct.CommandLineParser.html#method.group).
    pub fn group(
        self,
        group: Group,
        setup_fn: impl FnOnce(GroupScope<'a>) -> GroupScope<'a>,
    ) -> Self {
        Self {
            inner: self.inner.group(group, setup_fn),
        }
    }

    /// Nest a sub-command within this sub-command.
    /// See [`CommandLineParser::command`](./struct.CommandLineParser.html#method.command).
    pub fn command(
        self,
        name: impl Into<String>,
        setup_fn: impl FnOnce(SubCommand<'a>) -> SubCommand<'a>,
    ) -> Self {
        Self {
            inner: self.inner.command(name, setup_fn),
        }
    }

    /// Nest a sub-command declared by `options`.
    /// See [`CommandLineParser::command_options`](./struct.CommandLineParser.html#method.command_options).
    pub fn command_options(
        self,
        name: impl Into<String>,
        options: &'a mut dyn CommandOptions,
    ) -> Self {
        Self {
            inner: self.inner.command_options(name, options),
        }
    }

    /// Nest a sub-command declared by an instance built once matched.
    /// See [`CommandLineParser::command_factory`](./struct.CommandLineParser.html#method.command_factory).
    pub fn command_factory(
        self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn CommandOptions> + 'a,
    ) -> Self {
        Self {
            inner: self.inner.command_factory(name, factory),
        }
    }

    /// Rename the help option of this sub-command.
    pub fn help_option(self, names: impl Into<String>) -> Self {
        Self {
            inner: self.inner.help_option(names),
        }
    }

    /// Remove the help option of this sub-command.
    pub fn no_help(self) -> Self {
        Self {
            inner: self.inner.no_help(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Scalar;

    #[derive(Default)]
    struct Pair {
        left: u32,
        right: String,
    }

    impl CommandOptions for Pair {
        fn add_parameters<'b>(&'b mut self, command: SubCommand<'b>) -> SubCommand<'b> {
            command
                .about("A pair.")
                .add(Parameter::argument(Scalar::new(&mut self.left), "left"))
                .add(Parameter::option(Scalar::new(&mut self.right), "-r, --right"))
        }
    }

    #[test]
    fn define() {
        let mut pair = Pair::default();
        let definition = SubCommand::define("pair", &mut pair).unwrap();

        assert_eq!(definition.about(), Some("A pair."));
        assert_eq!(definition.positionals().count(), 1);
        // The help option, followed by --right.
        assert_eq!(
            definition
                .options()
                .map(|option| option.name())
                .collect::<Vec<_>>(),
            vec!["--right", "--help"]
        );
    }

    struct Broken {
        value: u32,
    }

    impl CommandOptions for Broken {
        fn add_parameters<'b>(&'b mut self, command: SubCommand<'b>) -> SubCommand<'b> {
            command.add(Parameter::argument(Scalar::new(&mut self.value), "-value"))
        }
    }

    #[test]
    fn define_invalid() {
        let mut broken = Broken { value: 0 };
        assert_matches!(SubCommand::define("broken", &mut broken), Err(ConfigError(_)));
    }

    #[test]
    fn execute_default() {
        let mut pair = Pair::default();
        assert_eq!(pair.execute(), Ok(()));
        assert_eq!(pair.left, 0);
        assert_eq!(pair.right, "");
    }
}
