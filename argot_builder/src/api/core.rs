use super::parameter::ParameterClass;
use crate::api::{CommandOptions, Group, Parameter, SubCommand, Trigger};
use crate::constant::*;
use crate::parser::{
    CommandEntry, CommandInfo, CommandSource, ConfigError, FileSystem, GeneralParser,
    HelpFormatter, ParserDefinition, Settings, UserInterface,
};

/// The base command line parser.
///
/// ### Example
/// ```
/// # use argot_builder as argot;
/// use argot::CommandLineParser;
///
/// let mut parser = CommandLineParser::new("program")
///     // Configure with CommandLineParser::add, CommandLineParser::group, and CommandLineParser::command.
///     .build();
/// assert!(parser.parse_tokens(empty::slice()).is_ok());
/// ```
pub struct CommandLineParser<'a> {
    program: String,
    definition: ParserDefinition<'a>,
    help: Option<String>,
    settings: Settings,
    deferred_error: Option<ConfigError>,
}

impl<'a> CommandLineParser<'a> {
    /// Create a command line parser.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::CommandLineParser;
    ///
    /// let mut parser = CommandLineParser::new("program")
    ///     .build();
    ///
    /// assert!(parser.parse_tokens(vec![].as_slice()).is_ok());
    /// ```
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            definition: ParserDefinition::default(),
            help: Some(HELP_NAMES.to_string()),
            settings: Settings::default(),
            deferred_error: None,
        }
    }

    /// Document the about message for this command line parser.
    /// If repeated, only the final help message will apply.
    ///
    /// An about message documents the command line parser in full sentence/paragraph format.
    /// We recommend allowing `argot` to format this field (ex: it is not recommended to use line breaks `'\n'`).
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::CommandLineParser;
    ///
    /// let parser = CommandLineParser::new("program")
    ///     .about("--this will get discarded--")
    ///     .about("My program that does awesome stuff.  Check it out!")
    ///     .build();
    ///
    /// assert_eq!(parser.definition().about(), Some("My program that does awesome stuff.  Check it out!"));
    /// ```
    pub fn about(mut self, description: impl Into<String>) -> Self {
        self.definition.set_about(description.into());
        self
    }

    /// Replace the generated usage line of the help message.
    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.definition.set_usage(usage.into());
        self
    }

    /// Document the text shown at the end of the help message.
    pub fn epilog(mut self, epilog: impl Into<String>) -> Self {
        self.definition.set_epilog(epilog.into());
        self
    }

    /// Add an argument/option to the command line parser.
    ///
    /// The order of argument parameters corresponds to their positional order during parsing.
    /// The order of option parameters does not affect the command parser semantics.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{CommandLineParser, Parameter, Scalar};
    ///
    /// let mut a: u32 = 0;
    /// let mut b: u32 = 0;
    /// let mut parser = CommandLineParser::new("program")
    ///     .add(Parameter::argument(Scalar::new(&mut a), "a"))
    ///     .add(Parameter::argument(Scalar::new(&mut b), "b"))
    ///     .build();
    ///
    /// assert!(parser.parse_tokens(vec!["1", "2"].as_slice()).is_ok());
    /// drop(parser);
    ///
    /// assert_eq!(a, 1);
    /// assert_eq!(b, 2);
    /// ```
    pub fn add<T: 'a>(mut self, parameter: Parameter<'a, T>) -> Self {
        self.register(parameter, None);
        self
    }

    /// Add a group of options to the command line parser.
    ///
    /// The group is declared (or, if already declared under the same name, merged) before `setup_fn` adds its members.
    /// An exclusive group allows at most one of its members to be used; a required group demands one of its members be given a value.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{CommandLineParser, Group, Parameter, Switch};
    ///
    /// let mut fast = false;
    /// let mut slow = false;
    /// let mut parser = CommandLineParser::new("program")
    ///     .group(Group::new("speed").exclusive(), |scope| {
    ///         scope
    ///             .add(Parameter::option(Switch::new(&mut fast, true), "--fast"))
    ///             .add(Parameter::option(Switch::new(&mut slow, true), "--slow"))
    ///     })
    ///     .build();
    ///
    /// let result = parser.parse_tokens(vec!["--fast", "--slow"].as_slice());
    /// assert!(!result.is_ok());
    /// ```
    pub fn group(
        mut self,
        group: Group,
        setup_fn: impl FnOnce(GroupScope<'a>) -> GroupScope<'a>,
    ) -> Self {
        let name = group.name().to_string();

        if let Err(error) = self.definition.open_group(group) {
            self.fail(error);
        }

        setup_fn(GroupScope {
            parser: self,
            group: name,
        })
        .parser
    }

    /// Setup a sub-command, declared up front.
    ///
    /// Once the sub-command is matched on the command line, all remaining tokens belong to it.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{CommandLineParser, Parameter, Scalar};
    ///
    /// let mut value_a: u32 = 0;
    /// let mut value_b: u32 = 0;
    /// let mut parser = CommandLineParser::new("program")
    ///     .command("a", |sub| sub.add(Parameter::argument(Scalar::new(&mut value_a), "value_a")))
    ///     .command("b", |sub| {
    ///         sub.about("Description for the sub-command 'b'.")
    ///             .add(Parameter::argument(Scalar::new(&mut value_b), "value_b"))
    ///     })
    ///     .build();
    ///
    /// let result = parser.parse_tokens(vec!["a", "1"].as_slice());
    /// assert!(result.is_ok());
    /// assert_eq!(result.commands(), &["a".to_string()]);
    /// drop(parser);
    ///
    /// assert_eq!(value_a, 1);
    /// assert_eq!(value_b, 0);
    /// ```
    pub fn command(
        mut self,
        name: impl Into<String>,
        setup_fn: impl FnOnce(SubCommand<'a>) -> SubCommand<'a>,
    ) -> Self {
        let name = name.into();

        match setup_fn(SubCommand::new(name.clone())).into_definition() {
            Ok(definition) => {
                let about = definition.about().map(str::to_string);
                self.register_command(
                    CommandInfo::new(name, about),
                    CommandSource::Definition(Box::new(definition)),
                );
            }
            Err(error) => self.fail(error),
        }

        self
    }

    /// Setup a sub-command whose parameters `options` declares, once the sub-command is matched.
    /// See [`CommandOptions`] for an example.
    pub fn command_options(
        mut self,
        name: impl Into<String>,
        options: &'a mut dyn CommandOptions,
    ) -> Self {
        self.register_command(
            CommandInfo::new(name, None),
            CommandSource::Instance(options),
        );
        self
    }

    /// Setup a sub-command whose parameters are declared by an instance built with `factory`, once the sub-command is matched.
    ///
    /// The built instance is returned via [`ParseResult::take_command_options`](./struct.ParseResult.html#method.take_command_options).
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{CommandLineParser, CommandOptions, Parameter, Scalar, SubCommand};
    ///
    /// #[derive(Default)]
    /// struct Greet {
    ///     name: String,
    /// }
    ///
    /// impl CommandOptions for Greet {
    ///     fn add_parameters<'b>(&'b mut self, command: SubCommand<'b>) -> SubCommand<'b> {
    ///         command.add(Parameter::argument(Scalar::new(&mut self.name), "name"))
    ///     }
    ///
    ///     fn execute(&mut self) -> Result<(), i32> {
    ///         println!("Hello, {}!", self.name);
    ///         Ok(())
    ///     }
    /// }
    ///
    /// let mut parser = CommandLineParser::new("program")
    ///     .command_factory("greet", || Box::new(Greet::default()))
    ///     .build();
    ///
    /// let mut result = parser.parse_tokens(vec!["greet", "world"].as_slice());
    /// assert!(result.is_ok());
    ///
    /// for mut command in result.take_command_options() {
    ///     command.execute().unwrap();
    /// }
    /// ```
    pub fn command_factory(
        mut self,
        name: impl Into<String>,
        factory: impl Fn() -> Box<dyn CommandOptions> + 'a,
    ) -> Self {
        self.register_command(
            CommandInfo::new(name, None),
            CommandSource::Factory(Box::new(factory)),
        );
        self
    }

    /// Rename the help option (default `-h, --help`).
    pub fn help_option(mut self, names: impl Into<String>) -> Self {
        self.help = Some(names.into());
        self
    }

    /// Remove the help option.
    pub fn no_help(mut self) -> Self {
        self.help = None;
        self
    }

    /// Limit the nesting of `@file` inclusion (default [`DEFAULT_MAX_INCLUDE_DEPTH`](./constant.DEFAULT_MAX_INCLUDE_DEPTH.html)).
    pub fn max_include_depth(mut self, depth: usize) -> Self {
        self.settings.max_include_depth = depth;
        self
    }

    /// Show the help message, instead of errors, when nothing is given to a parser with requirements.
    pub fn help_on_empty(mut self) -> Self {
        self.settings.help_on_empty = true;
        self
    }

    /// Replace the help formatter (default [`DefaultFormatter`](./struct.DefaultFormatter.html)).
    pub fn formatter(mut self, formatter: impl HelpFormatter + 'static) -> Self {
        self.settings.formatter = Box::new(formatter);
        self
    }

    /// Replace the file system used to open `@file` inclusions (default [`DiskFileSystem`](./struct.DiskFileSystem.html)).
    pub fn file_system(mut self, file_system: impl FileSystem + 'static) -> Self {
        self.settings.file_system = Box::new(file_system);
        self
    }

    /// Replace the user interface (default [`ConsoleInterface`](./struct.ConsoleInterface.html)).
    pub fn interface(mut self, user_interface: impl UserInterface + 'static) -> Self {
        self.settings.user_interface = Box::new(user_interface);
        self
    }

    /// Build the command line parser as a Result.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    pub fn build_parser(mut self) -> Result<GeneralParser<'a>, ConfigError> {
        let settings = std::mem::take(&mut self.settings);
        let program = self.program.clone();
        let definition = self.into_definition()?;
        Ok(GeneralParser::new(program, definition, settings))
    }

    /// Build the command line parser.
    /// This finalizes the configuration and checks for errors (ex: a repeated parameter name).
    /// If an error is encountered, exits with error code `1` (via [`std::process::exit`]).
    pub fn build(self) -> GeneralParser<'a> {
        match self.build_parser() {
            Ok(gp) => gp,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    pub(crate) fn into_definition(mut self) -> Result<ParserDefinition<'a>, ConfigError> {
        if let Some(error) = self.deferred_error {
            return Err(error);
        }

        if let Some(names) = self.help {
            let entry = Parameter::option(Trigger::new(), names)
                .help(HELP_MESSAGE)
                .action(|_, environment| environment.show_help())
                .consume()
                .into_entry()?;
            self.definition.add_help(entry)?;
        }

        Ok(self.definition)
    }

    fn register<T: 'a>(&mut self, parameter: Parameter<'a, T>, group: Option<&str>) {
        if self.deferred_error.is_some() {
            return;
        }

        let inner = parameter.consume();
        let class = inner.class();
        let result = inner.into_entry().and_then(|entry| match class {
            ParameterClass::Opt => self.definition.add_option(entry, group),
            ParameterClass::Arg => self.definition.add_positional(entry, group),
        });

        if let Err(error) = result {
            self.fail(error);
        }
    }

    fn register_command(&mut self, info: CommandInfo, source: CommandSource<'a>) {
        if let Err(error) = self.definition.add_command(CommandEntry { info, source }) {
            self.fail(error);
        }
    }

    fn fail(&mut self, error: ConfigError) {
        // Keep the first error.
        if self.deferred_error.is_none() {
            self.deferred_error = Some(error);
        }
    }
}

/// The scope of a group being declared.
///
/// Used with [`CommandLineParser::group`] and [`SubCommand::group`].
pub struct GroupScope<'a> {
    parser: CommandLineParser<'a>,
    group: String,
}

impl<'a> GroupScope<'a> {
    /// Add an argument/option as a member of the group.
    pub fn add<T: 'a>(mut self, parameter: Parameter<'a, T>) -> Self {
        let group = std::mem::take(&mut self.group);
        self.parser.register(parameter, Some(&group));
        self.group = group;
        self
    }
}
