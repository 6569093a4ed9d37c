use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::api::{CommandOptions, Environment, Group, InvalidCapture, ValueId};
use crate::constant::*;
use crate::matcher::Bound;
use crate::model::Nargs;

/// A mis-configuration of the command line parser.
///
/// Detected while building, and returned from
/// [`CommandLineParser::build_parser`](./struct.CommandLineParser.html#method.build_parser).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

/// Behaviour to capture a token into some type, without the caller knowing the type.
///
/// This is the seam between the type-erased parser and the generic fields.
pub(crate) trait AnonymousCapturable {
    fn value_id(&self) -> ValueId;

    /// Convert and store `token`, or pass it to the action.
    fn capture(&mut self, token: &str, environment: &mut Environment) -> Result<(), InvalidCapture>;

    /// Respond to an activation which received no values.
    fn capture_missing(&mut self, environment: &mut Environment);

    fn has_default(&self) -> bool;

    /// Apply the default value(s), returning whether anything was applied.
    fn apply_default(&mut self) -> bool;

    fn reset(&mut self);

    fn assigned(&self) -> usize;
}

/// The read-only description of an option or positional parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionConfig {
    name: String,
    short: Option<char>,
    long: Option<String>,
    bound: Bound,
    positional: bool,
    required: bool,
    forwards: bool,
    has_default: bool,
    group: Option<String>,
    help: Option<String>,
    metavars: Vec<String>,
    choices: Vec<(String, String)>,
}

impl OptionConfig {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        names: Names,
        nargs: Nargs,
        required: bool,
        forwards: bool,
        has_default: bool,
        help: Option<String>,
        metavars: Vec<String>,
        choices: Vec<(String, String)>,
    ) -> Self {
        let (name, short, long, positional) = match names {
            Names::Option { short, long } => {
                let name = match (&short, &long) {
                    (_, Some(long)) => format!("{LONG_PREFIX}{long}"),
                    (Some(short), None) => format!("{OPTION_PREFIX}{short}"),
                    (None, None) => String::default(),
                };
                (name, short, long, false)
            }
            Names::Positional(name) => (name, None, None, true),
        };

        Self {
            name,
            short,
            long,
            bound: Bound::from(nargs),
            positional,
            required,
            forwards,
            has_default,
            group: None,
            help,
            metavars,
            choices,
        }
    }

    /// The display name: `--long`, `-s`, or the positional's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The short name, without its `-` prefix.
    pub fn short(&self) -> Option<char> {
        self.short
    }

    /// The long name, without its `--` prefix.
    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// The minimum number of values per activation.
    pub fn min(&self) -> usize {
        self.bound.min()
    }

    /// The maximum number of values per activation, or `None` when unbounded.
    pub fn max(&self) -> Option<usize> {
        self.bound.max()
    }

    /// Whether this is a positional parameter.
    pub fn is_positional(&self) -> bool {
        self.positional
    }

    /// Whether the option must be specified.
    pub fn required(&self) -> bool {
        self.required
    }

    /// Whether the option accepts the `--name,a,b` forwarding syntax.
    pub fn forwards(&self) -> bool {
        self.forwards
    }

    /// Whether the option carries default value(s).
    pub fn has_default(&self) -> bool {
        self.has_default
    }

    /// The name of the group the option belongs to.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The help message.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The names of the values, as displayed in help.
    pub fn metavars(&self) -> &[String] {
        &self.metavars
    }

    /// The documented choices, as `(value, description)` pairs.
    pub fn choices(&self) -> &[(String, String)] {
        &self.choices
    }

    pub(crate) fn bound(&self) -> Bound {
        self.bound
    }
}

/// The names of a parameter, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Names {
    Option {
        short: Option<char>,
        long: Option<String>,
    },
    Positional(String),
}

impl Names {
    /// Parse option names, such as `"-v, --verbose"`, `"-v"`, or `"--verbose"`.
    pub(crate) fn option(names: &str) -> Result<Self, ConfigError> {
        let mut short = None;
        let mut long = None;

        for part in names.split(',').map(str::trim) {
            if let Some(name) = part.strip_prefix(LONG_PREFIX) {
                if !valid_long(name) || long.is_some() {
                    return Err(ConfigError(format!(
                        "option names '{names}' contain an invalid or repeated long name."
                    )));
                }

                long = Some(name.to_string());
            } else if let Some(name) = part.strip_prefix(OPTION_PREFIX) {
                let mut characters = name.chars();
                match (characters.next(), characters.next()) {
                    (Some(c), None) if valid_short(c) && short.is_none() => short = Some(c),
                    _ => {
                        return Err(ConfigError(format!(
                            "option names '{names}' contain an invalid or repeated short name."
                        )))
                    }
                }
            } else {
                return Err(ConfigError(format!(
                    "option names '{names}' must be prefixed by '{OPTION_PREFIX}' or '{LONG_PREFIX}'."
                )));
            }
        }

        Ok(Names::Option { short, long })
    }

    pub(crate) fn positional(name: &str) -> Result<Self, ConfigError> {
        if name.is_empty()
            || name.starts_with(OPTION_PREFIX)
            || name.starts_with(INCLUDE_PREFIX)
            || name.chars().any(char::is_whitespace)
        {
            return Err(ConfigError(format!(
                "positional name '{name}' must be non-empty, without whitespace, and must not start with '{OPTION_PREFIX}' or '{INCLUDE_PREFIX}'."
            )));
        }

        Ok(Names::Positional(name.to_string()))
    }
}

fn valid_long(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with(OPTION_PREFIX)
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c == INLINE_DELIMITER || c == FORWARD_DELIMITER)
}

fn valid_short(c: char) -> bool {
    !(c.is_whitespace() || c == OPTION_PREFIX || c == INLINE_DELIMITER || c == FORWARD_DELIMITER)
}

/// An option/positional together with its capture and per-parse counters.
pub(crate) struct OptionEntry<'a> {
    pub(crate) config: OptionConfig,
    pub(crate) capture: Box<dyn AnonymousCapturable + 'a>,
    pub(crate) activations: usize,
    pub(crate) received: usize,
    pub(crate) defaulted: bool,
}

impl std::fmt::Debug for OptionEntry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionEntry")
            .field("config", &self.config)
            .field("activations", &self.activations)
            .field("received", &self.received)
            .finish()
    }
}

impl<'a> OptionEntry<'a> {
    pub(crate) fn new(config: OptionConfig, capture: Box<dyn AnonymousCapturable + 'a>) -> Self {
        Self {
            config,
            capture,
            activations: 0,
            received: 0,
            defaulted: false,
        }
    }
}

/// The documented identity of a sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    name: String,
    about: Option<String>,
}

impl CommandInfo {
    pub(crate) fn new(name: impl Into<String>, about: Option<String>) -> Self {
        Self {
            name: name.into(),
            about,
        }
    }

    /// The command's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The command's description.
    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }
}

/// Where a sub-command's parameters come from.
pub(crate) enum CommandSource<'a> {
    /// Declared up front.
    Definition(Box<ParserDefinition<'a>>),
    /// Declared by a caller owned instance, at the time the command is entered.
    Instance(&'a mut dyn CommandOptions),
    /// Declared by a newly made instance, at the time the command is entered.
    Factory(Box<dyn Fn() -> Box<dyn CommandOptions> + 'a>),
}

pub(crate) struct CommandEntry<'a> {
    pub(crate) info: CommandInfo,
    pub(crate) source: CommandSource<'a>,
}

/// Addresses an entry of a [`ParserDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Named(usize),
    Positional(usize),
}

/// The registry of everything a parser (or sub-command parser) accepts.
#[derive(Default)]
pub struct ParserDefinition<'a> {
    about: Option<String>,
    usage: Option<String>,
    epilog: Option<String>,
    pub(crate) options: Vec<OptionEntry<'a>>,
    pub(crate) positionals: Vec<OptionEntry<'a>>,
    pub(crate) commands: Vec<CommandEntry<'a>>,
    groups: Vec<Group>,
    help_names: Vec<String>,
    long_index: HashMap<String, usize>,
    short_index: HashMap<char, usize>,
}

impl std::fmt::Debug for ParserDefinition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserDefinition")
            .field("options", &self.options)
            .field("positionals", &self.positionals)
            .field("commands", &self.commands().collect::<Vec<_>>())
            .field("groups", &self.groups)
            .finish()
    }
}

impl<'a> ParserDefinition<'a> {
    /// The program description.
    pub fn about(&self) -> Option<&str> {
        self.about.as_deref()
    }

    /// The custom usage line, replacing the generated one.
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// The text shown after everything else in help.
    pub fn epilog(&self) -> Option<&str> {
        self.epilog.as_deref()
    }

    /// The options, in declaration order.
    pub fn options(&self) -> impl Iterator<Item = &OptionConfig> + use<'_, 'a> {
        self.options.iter().map(|entry| &entry.config)
    }

    /// The positional parameters, in declaration order.
    pub fn positionals(&self) -> impl Iterator<Item = &OptionConfig> + use<'_, 'a> {
        self.positionals.iter().map(|entry| &entry.config)
    }

    /// The sub-commands, in declaration order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandInfo> + use<'_, 'a> {
        self.commands.iter().map(|entry| &entry.info)
    }

    /// The groups, in declaration order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// The names (ex: `--help`) of the help option.
    pub fn help_names(&self) -> &[String] {
        &self.help_names
    }

    /// Whether `config` is the help option.
    pub fn is_help(&self, config: &OptionConfig) -> bool {
        self.help_names.iter().any(|name| name == config.name())
    }

    /// Find an option by its long name (without `--`).
    pub fn find_long(&self, name: &str) -> Option<&OptionConfig> {
        self.position_long(name)
            .map(|index| &self.options[index].config)
    }

    /// Find an option by its short name (without `-`).
    pub fn find_short(&self, name: char) -> Option<&OptionConfig> {
        self.position_short(name)
            .map(|index| &self.options[index].config)
    }

    /// Find a sub-command by name.
    pub fn find_command(&self, name: &str) -> Option<&CommandInfo> {
        self.position_command(name)
            .map(|index| &self.commands[index].info)
    }

    /// Whether an invocation without any tokens is certain to fail.
    pub fn has_requirements(&self) -> bool {
        self.options
            .iter()
            .any(|entry| entry.config.required && !entry.config.has_default)
            || self
                .positionals
                .iter()
                .any(|entry| entry.config.min() > 0 && !entry.config.has_default)
            || self.groups.iter().any(Group::is_required)
    }

    pub(crate) fn set_about(&mut self, about: String) {
        self.about = Some(about);
    }

    pub(crate) fn set_usage(&mut self, usage: String) {
        self.usage = Some(usage);
    }

    pub(crate) fn set_epilog(&mut self, epilog: String) {
        self.epilog = Some(epilog);
    }

    pub(crate) fn position_long(&self, name: &str) -> Option<usize> {
        self.long_index.get(name).copied()
    }

    pub(crate) fn position_short(&self, name: char) -> Option<usize> {
        self.short_index.get(&name).copied()
    }

    pub(crate) fn position_command(&self, name: &str) -> Option<usize> {
        self.commands
            .iter()
            .position(|entry| entry.info.name() == name)
    }

    pub(crate) fn entry_mut(&mut self, slot: Slot) -> &mut OptionEntry<'a> {
        match slot {
            Slot::Named(index) => &mut self.options[index],
            Slot::Positional(index) => &mut self.positionals[index],
        }
    }

    pub(crate) fn add_option(
        &mut self,
        mut entry: OptionEntry<'a>,
        group: Option<&str>,
    ) -> Result<(), ConfigError> {
        self.join_group(&mut entry, group)?;
        let index = self.options.len();

        if let Some(long) = entry.config.long() {
            if self.long_index.contains_key(long) {
                return Err(ConfigError(format!("option '--{long}' is repeated.")));
            }
        }

        if let Some(short) = entry.config.short() {
            if self.short_index.contains_key(&short) {
                return Err(ConfigError(format!("option '-{short}' is repeated.")));
            }
        }

        if entry.config.forwards() && entry.config.long().is_none() {
            return Err(ConfigError(format!(
                "option '{}' forwards values, and so requires a long name.",
                entry.config.name()
            )));
        }

        if entry.config.forwards() && entry.config.max() == Some(0) {
            return Err(ConfigError(format!(
                "option '{}' forwards values, and so must accept at least one value.",
                entry.config.name()
            )));
        }

        if let Some(long) = entry.config.long() {
            self.long_index.insert(long.to_string(), index);
        }

        if let Some(short) = entry.config.short() {
            self.short_index.insert(short, index);
        }

        self.options.push(entry);
        Ok(())
    }

    pub(crate) fn add_positional(
        &mut self,
        mut entry: OptionEntry<'a>,
        group: Option<&str>,
    ) -> Result<(), ConfigError> {
        self.join_group(&mut entry, group)?;

        if self
            .positionals
            .iter()
            .any(|existing| existing.config.name() == entry.config.name())
        {
            return Err(ConfigError(format!(
                "positional '{}' is repeated.",
                entry.config.name()
            )));
        }

        self.positionals.push(entry);
        Ok(())
    }

    pub(crate) fn add_help(&mut self, entry: OptionEntry<'a>) -> Result<(), ConfigError> {
        let name = entry.config.name().to_string();
        self.add_option(entry, None)?;
        self.help_names.push(name);
        Ok(())
    }

    pub(crate) fn add_command(&mut self, entry: CommandEntry<'a>) -> Result<(), ConfigError> {
        let name = entry.info.name();

        if name.is_empty() || name.starts_with(OPTION_PREFIX) || name.starts_with(INCLUDE_PREFIX)
        {
            return Err(ConfigError(format!(
                "command name '{name}' must be non-empty and must not start with '{OPTION_PREFIX}' or '{INCLUDE_PREFIX}'."
            )));
        }

        if self.position_command(name).is_some() {
            return Err(ConfigError(format!("command '{name}' is repeated.")));
        }

        self.commands.push(entry);
        Ok(())
    }

    /// Declare `group`, or merge it into the existing group of the same name.
    pub(crate) fn open_group(&mut self, group: Group) -> Result<(), ConfigError> {
        match self
            .groups
            .iter_mut()
            .find(|existing| existing.name() == group.name())
        {
            Some(existing) => existing.merge(group),
            None => {
                self.groups.push(group);
                Ok(())
            }
        }
    }

    fn join_group(
        &self,
        entry: &mut OptionEntry<'a>,
        group: Option<&str>,
    ) -> Result<(), ConfigError> {
        if let Some(name) = group {
            let exclusive = self
                .groups
                .iter()
                .find(|existing| existing.name() == name)
                .map(Group::is_exclusive)
                .ok_or_else(|| ConfigError(format!("group '{name}' is not declared.")))?;

            if exclusive && entry.config.required() {
                return Err(ConfigError(format!(
                    "option '{}' cannot be required within the exclusive group '{name}'.",
                    entry.config.name()
                )));
            }

            entry.config.group = Some(name.to_string());
        }

        Ok(())
    }

    /// Restore every bound variable (including those of declared sub-commands) and every counter.
    pub(crate) fn reset(&mut self) {
        let mut seen = HashSet::default();
        self.reset_with(&mut seen);
    }

    fn reset_with(&mut self, seen: &mut HashSet<ValueId>) {
        for entry in self.options.iter_mut().chain(self.positionals.iter_mut()) {
            entry.activations = 0;
            entry.received = 0;
            entry.defaulted = false;

            if seen.insert(entry.capture.value_id()) {
                entry.capture.reset();
            }
        }

        for command in self.commands.iter_mut() {
            if let CommandSource::Definition(definition) = &mut command.source {
                definition.reset_with(seen);
            }
        }
    }
}
