use crate::api::{Environment, Signals, SubCommand};
use crate::constant::*;
use crate::matcher::{classify, split_forwarded, split_inline, MatchBuffer, Token};
use crate::model::ErrorCode;
use crate::parser::definition::{CommandSource, ConfigError, ParserDefinition, Slot};
use crate::parser::middleware::Settings;
use crate::parser::result::ResultBuilder;
use crate::parser::tokens::TokenStream;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The stack of token streams; the top is the innermost `@file` include.
pub(crate) type Streams<'t> = Vec<Box<dyn TokenStream + 't>>;

enum Flow {
    Continue,
    /// A sub-command consumed the rest of the input.
    Delegated,
    /// Parsing cannot continue (ex: includes nested too deeply).
    Abort,
}

pub(crate) struct Outcome {
    pub(crate) builder: ResultBuilder,
    pub(crate) aborted: bool,
}

impl Outcome {
    fn invalid_command(name: &str, error: ConfigError) -> Self {
        let mut builder = ResultBuilder::default();
        builder.error(name, ErrorCode::InvalidCommand, Some(error.to_string()));
        Self {
            builder,
            aborted: false,
        }
    }
}

/// Walks the tokens for one parser level, binding them against its definition.
pub(crate) struct Walker<'p, 'a, 't> {
    program: String,
    definition: &'p mut ParserDefinition<'a>,
    settings: &'p Settings,
    streams: Streams<'t>,
    builder: ResultBuilder,
    active: Option<(usize, MatchBuffer)>,
    positional: usize,
    end_of_options: bool,
    consumed: usize,
}

impl<'p, 'a, 't> Walker<'p, 'a, 't> {
    pub(crate) fn new(
        program: impl Into<String>,
        definition: &'p mut ParserDefinition<'a>,
        settings: &'p Settings,
        streams: Streams<'t>,
    ) -> Self {
        Self {
            program: program.into(),
            definition,
            settings,
            streams,
            builder: ResultBuilder::default(),
            active: None,
            positional: 0,
            end_of_options: false,
            consumed: 0,
        }
    }

    pub(crate) fn walk(mut self) -> Outcome {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Walking '{}'.", self.program);
        }

        let mut aborted = false;

        while !self.builder.exit_requested() {
            let token = match self.next_token() {
                Some(token) => token,
                None => break,
            };
            self.consumed += 1;

            match self.feed(&token) {
                Flow::Continue => {}
                Flow::Delegated => break,
                Flow::Abort => {
                    aborted = true;
                    break;
                }
            }
        }

        if !aborted && !self.builder.exit_requested() {
            self.close_active();

            if self.consumed == 0
                && self.settings.help_on_empty
                && self.definition.has_requirements()
            {
                self.show_help();
            } else {
                self.apply_defaults();
                self.validate();
            }
        }

        Outcome {
            builder: self.builder,
            aborted,
        }
    }

    fn next_token(&mut self) -> Option<String> {
        while let Some(stream) = self.streams.last_mut() {
            match stream.next_token() {
                Some(token) => return Some(token),
                None => {
                    self.streams.pop();
                }
            }
        }

        None
    }

    fn feed(&mut self, token: &str) -> Flow {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Feeding '{token}' (active={:?}).", self.active);
        }

        if self.end_of_options {
            self.free_argument(token);
            return Flow::Continue;
        }

        let definition = &*self.definition;
        let classified = classify(token, self.active.is_some(), |name| {
            definition.position_short(name).is_some()
        });

        match classified {
            Token::Include(name) => return self.include(name),
            Token::EndOfOptions => {
                self.close_active();
                self.end_of_options = true;
            }
            Token::Long(body) => self.long_option(body),
            Token::Short(name, inline) => self.short_option(name, inline),
            Token::Cluster(names, inline) => self.cluster(names, inline),
            Token::Value(value) => {
                if self.active.is_some() {
                    self.option_value(value);
                } else if let Some(index) = self.definition.position_command(value) {
                    return self.command(index);
                } else {
                    self.free_argument(value);
                }
            }
        }

        Flow::Continue
    }

    fn include(&mut self, name: &str) -> Flow {
        // The outermost stream is the command line itself.
        if self.streams.len() > self.settings.max_include_depth {
            self.builder.error(
                format!("{INCLUDE_PREFIX}{name}"),
                ErrorCode::IncludeTooDeep,
                Some(format!(
                    "The maximum depth is {}.",
                    self.settings.max_include_depth
                )),
            );
            return Flow::Abort;
        }

        match self.settings.file_system.open(name) {
            Some(stream) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Including '{name}' at depth {}.", self.streams.len());
                }
                self.streams.push(stream);
            }
            None => {
                self.builder.error(
                    format!("{INCLUDE_PREFIX}{name}"),
                    ErrorCode::IncludeNotFound,
                    None,
                );
            }
        }

        Flow::Continue
    }

    fn long_option(&mut self, body: &str) {
        self.close_active();

        if let Some((name, rest)) = body.split_once(FORWARD_DELIMITER) {
            if let Some(index) = self.definition.position_long(name) {
                if self.definition.options[index].config.forwards() {
                    self.forward(index, rest);
                    return;
                }
            }
        }

        let (name, inline) = split_inline(body);

        match self.definition.position_long(name) {
            Some(index) => self.start(index, inline),
            None => self.builder.error(
                format!("{LONG_PREFIX}{name}"),
                ErrorCode::UnknownOption,
                None,
            ),
        }
    }

    fn short_option(&mut self, name: char, inline: Option<&str>) {
        self.close_active();

        match self.definition.position_short(name) {
            Some(index) => self.start(index, inline),
            None => self.builder.error(
                format!("{OPTION_PREFIX}{name}"),
                ErrorCode::UnknownOption,
                None,
            ),
        }
    }

    fn cluster(&mut self, names: &str, inline: Option<&str>) {
        let mut characters = names.chars().peekable();

        while let Some(name) = characters.next() {
            if self.builder.exit_requested() {
                return;
            }

            match characters.peek() {
                // Only the final option of the cluster may go on to consume values.
                Some(_) => {
                    self.short_option(name, None);
                    self.close_active();
                }
                None => self.short_option(name, inline),
            }
        }
    }

    fn start(&mut self, index: usize, inline: Option<&str>) {
        self.close_active();
        let entry = &mut self.definition.options[index];
        entry.activations += 1;
        let buffer = MatchBuffer::new(entry.config.bound());

        match inline {
            Some(value) if !buffer.is_open() => {
                let name = entry.config.name().to_string();
                self.builder.error(
                    name,
                    ErrorCode::FlagParameter,
                    Some(format!("Received '{value}'.")),
                );
            }
            Some(value) => {
                self.active = Some((index, buffer));
                self.option_value(value);
                self.close_active();
            }
            None => {
                let open = buffer.is_open();
                self.active = Some((index, buffer));

                if !open {
                    self.close_active();
                }
            }
        }
    }

    fn option_value(&mut self, value: &str) {
        if let Some((index, mut buffer)) = self.active.take() {
            buffer.push();
            self.capture(Slot::Named(index), value);

            if buffer.is_open() && !self.builder.exit_requested() {
                self.active = Some((index, buffer));
            }
        }
    }

    fn close_active(&mut self) {
        if let Some((index, buffer)) = self.active.take() {
            match buffer.close() {
                Ok(0) => self.capture_missing(index),
                Ok(_) => {}
                Err(error) => {
                    let name = self.definition.options[index].config.name().to_string();
                    self.builder
                        .error(name, ErrorCode::MissingArgument, Some(error.to_string()));
                }
            }
        }
    }

    fn forward(&mut self, index: usize, rest: &str) {
        let entry = &mut self.definition.options[index];
        entry.activations += 1;
        let name = entry.config.name().to_string();
        let mut buffer = MatchBuffer::new(entry.config.bound());
        let values = split_forwarded(rest);

        if values.is_empty() {
            self.builder.error(
                name,
                ErrorCode::MissingArgument,
                Some("The forwarded list is empty.".to_string()),
            );
            return;
        }

        for value in values {
            if buffer.is_open() && !self.builder.exit_requested() {
                buffer.push();
                self.capture(Slot::Named(index), &value);
            } else {
                self.builder.ignore(value);
            }
        }

        if let Err(error) = buffer.close() {
            self.builder
                .error(name, ErrorCode::MissingArgument, Some(error.to_string()));
        }
    }

    fn free_argument(&mut self, token: &str) {
        let positionals = &self.definition.positionals;
        let found = (self.positional..positionals.len())
            .find(|&i| positionals[i].config.bound().accepts(positionals[i].received));

        match found {
            Some(index) => {
                self.positional = index;
                let entry = &mut self.definition.positionals[index];
                entry.received += 1;
                entry.activations = 1;
                self.capture(Slot::Positional(index), token);
            }
            None => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Ignoring '{token}'.");
                }
                self.builder.ignore(token);
            }
        }
    }

    fn command(&mut self, index: usize) -> Flow {
        let settings = self.settings;
        let streams = std::mem::take(&mut self.streams);
        let entry = &mut self.definition.commands[index];
        let name = entry.info.name().to_string();
        let program = format!("{} {name}", self.program);
        self.builder.command(name.clone());

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Entering command '{program}'.");
        }

        let outcome = match &mut entry.source {
            CommandSource::Definition(definition) => {
                Walker::new(program, &mut **definition, settings, streams).walk()
            }
            CommandSource::Instance(instance) => match SubCommand::define(&name, &mut **instance)
            {
                Ok(mut definition) => {
                    definition.reset();
                    Walker::new(program, &mut definition, settings, streams).walk()
                }
                Err(error) => Outcome::invalid_command(&name, error),
            },
            CommandSource::Factory(factory) => {
                let mut instance = (*factory)();
                let outcome = match SubCommand::define(&name, instance.as_mut()) {
                    Ok(mut definition) => {
                        definition.reset();
                        Walker::new(program, &mut definition, settings, streams).walk()
                    }
                    Err(error) => Outcome::invalid_command(&name, error),
                };
                self.builder.instance(instance);
                outcome
            }
        };

        self.builder.merge(outcome.builder);

        if outcome.aborted {
            Flow::Abort
        } else {
            Flow::Delegated
        }
    }

    fn capture(&mut self, slot: Slot, token: &str) {
        let settings = self.settings;
        let entry = self.definition.entry_mut(slot);
        let name = entry.config.name().to_string();
        let mut environment = Environment::new(&name, &*settings.user_interface);
        let result = entry.capture.capture(token, &mut environment);
        let signals = environment.into_signals();

        if let Err(error) = result {
            self.builder.capture_error(name.as_str(), error);
        }

        self.signal(&name, signals);
    }

    fn capture_missing(&mut self, index: usize) {
        let settings = self.settings;
        let entry = &mut self.definition.options[index];
        let name = entry.config.name().to_string();
        let mut environment = Environment::new(&name, &*settings.user_interface);
        entry.capture.capture_missing(&mut environment);
        let signals = environment.into_signals();
        self.signal(&name, signals);
    }

    fn signal(&mut self, name: &str, signals: Signals) {
        for message in signals.errors {
            self.builder
                .error(name, ErrorCode::ActionError, Some(message));
        }

        if let Some(message) = signals.exit_error {
            self.builder
                .error(name, ErrorCode::ExitRequested, Some(message));
        }

        if signals.exit {
            self.builder.request_exit();
        }

        if signals.help {
            self.show_help();
        }
    }

    fn show_help(&mut self) {
        let settings = self.settings;
        settings
            .formatter
            .format(&self.program, &*self.definition, &*settings.user_interface);
        self.builder.help_shown();
    }

    fn apply_defaults(&mut self) {
        let definition = &mut *self.definition;

        for entry in definition
            .options
            .iter_mut()
            .chain(definition.positionals.iter_mut())
        {
            // Aliased entries share their assignment count, so only the first default applies.
            if entry.capture.assigned() == 0 && entry.capture.apply_default() {
                entry.defaulted = true;
            }
        }
    }

    fn validate(&mut self) {
        let definition = &*self.definition;

        for entry in &definition.options {
            if entry.config.required() && entry.capture.assigned() == 0 {
                self.builder
                    .error(entry.config.name(), ErrorCode::MissingOption, None);
            }
        }

        for entry in &definition.positionals {
            if entry.received < entry.config.min() && !entry.defaulted {
                self.builder.error(
                    entry.config.name(),
                    ErrorCode::MissingArgument,
                    Some(format!(
                        "Expected at least {} value(s), received {}.",
                        entry.config.min(),
                        entry.received
                    )),
                );
            }
        }

        for group in definition.groups() {
            let members: Vec<_> = definition
                .options
                .iter()
                .chain(definition.positionals.iter())
                .filter(|entry| entry.config.group() == Some(group.name()))
                .collect();

            if group.is_exclusive() {
                let used: Vec<&str> = members
                    .iter()
                    .filter(|entry| entry.activations > 0)
                    .map(|entry| entry.config.name())
                    .collect();

                if used.len() > 1 {
                    self.builder.error(
                        group.name(),
                        ErrorCode::ExclusiveOption,
                        Some(format!("Received {}.", used.join(", "))),
                    );
                }
            }

            if group.is_required() && !members.iter().any(|entry| entry.capture.assigned() > 0) {
                let names: Vec<&str> = members.iter().map(|entry| entry.config.name()).collect();
                self.builder.error(
                    group.name(),
                    ErrorCode::MissingOptionGroup,
                    Some(format!("Expected one of {}.", names.join(", "))),
                );
            }
        }
    }
}
