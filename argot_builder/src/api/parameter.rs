use crate::api::{CliArgument, CliOption, Environment, GenericCapturable, InvalidCapture, ValueId};
use crate::model::Nargs;
use crate::parser::{AnonymousCapturable, ConfigError, Names, OptionConfig, OptionEntry};
use crate::prelude::Choices;

type Action<'a, T> = Box<dyn FnMut(T, &mut Environment) + 'a>;
type RawAction<'a> = Box<dyn FnMut(&str, &mut Environment) + 'a>;
type Converter<'a, T> = Box<dyn Fn(&str) -> Result<T, String> + 'a>;

/// A typed field behind its type-erased face: conversion, choices, flag/default values and action.
pub(crate) struct AnonymousCapture<'a, T: 'a> {
    field: Box<dyn GenericCapturable<'a, T> + 'a>,
    converter: Option<Converter<'a, T>>,
    flag: Option<Box<dyn Fn() -> T + 'a>>,
    absent: Option<Box<dyn Fn() -> Vec<T> + 'a>>,
    choices: Vec<T>,
    matches: Option<fn(&T, &T) -> bool>,
    action: Option<Action<'a, T>>,
    raw_action: Option<RawAction<'a>>,
}

impl<'a, T> AnonymousCapture<'a, T> {
    pub(crate) fn bind(field: impl GenericCapturable<'a, T> + 'a) -> Self {
        Self {
            field: Box::new(field),
            converter: None,
            flag: None,
            absent: None,
            choices: Vec::default(),
            matches: None,
            action: None,
            raw_action: None,
        }
    }

    fn convert(&self, token: &str) -> Result<T, InvalidCapture> {
        let value = match &self.converter {
            Some(converter) => {
                converter(token).map_err(|message| InvalidCapture::InvalidConversion {
                    token: token.to_string(),
                    type_name: std::any::type_name::<T>(),
                    message,
                })?
            }
            None => self.field.convert(token)?,
        };

        match self.matches {
            Some(matches) if !self.choices.iter().any(|choice| matches(choice, &value)) => {
                Err(InvalidCapture::InvalidChoice {
                    token: token.to_string(),
                })
            }
            _ => Ok(value),
        }
    }

    fn deliver(&mut self, value: T, environment: &mut Environment) {
        match self.action.as_mut() {
            Some(action) => action(value, environment),
            None => self.field.capture(value),
        }
    }
}

impl<'a, T> AnonymousCapturable for AnonymousCapture<'a, T> {
    fn value_id(&self) -> ValueId {
        self.field.value_id()
    }

    fn capture(&mut self, token: &str, environment: &mut Environment) -> Result<(), InvalidCapture> {
        self.field.note_assigned();

        if let Some(action) = self.raw_action.as_mut() {
            action(token, environment);
            return Ok(());
        }

        match self.convert(token) {
            Ok(value) => {
                self.deliver(value, environment);
                Ok(())
            }
            Err(error) => {
                self.field.note_error();
                Err(error)
            }
        }
    }

    fn capture_missing(&mut self, environment: &mut Environment) {
        self.field.note_assigned();

        if self.raw_action.is_some() {
            return;
        }

        let flag = match &self.flag {
            Some(flag) => Some(flag()),
            None => self.field.flag(),
        };

        match (self.action.as_mut(), flag) {
            (Some(action), Some(value)) => action(value, environment),
            (Some(_), None) => {}
            (None, flag) => self.field.capture_missing(flag),
        }
    }

    fn has_default(&self) -> bool {
        self.absent.is_some()
    }

    fn apply_default(&mut self) -> bool {
        match &self.absent {
            Some(absent) => {
                let values = absent();
                self.field.note_assigned();

                for value in values {
                    self.field.capture(value);
                }

                true
            }
            None => false,
        }
    }

    fn reset(&mut self) {
        self.field.reset();
    }

    fn assigned(&self) -> usize {
        self.field.assigned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ParameterClass {
    Opt,
    Arg,
}

pub(super) struct ParameterInner<'a, T> {
    class: ParameterClass,
    capture: AnonymousCapture<'a, T>,
    names: String,
    nargs: Nargs,
    required: bool,
    forwards: bool,
    help: Option<String>,
    metavars: Vec<String>,
    choices: Vec<(String, String)>,
}

impl<'a, T> ParameterInner<'a, T> {
    pub(super) fn class(&self) -> ParameterClass {
        self.class
    }
}

impl<'a, T: 'a> ParameterInner<'a, T> {
    /// Validate and lower into a definition entry.
    pub(super) fn into_entry(self) -> Result<OptionEntry<'a>, ConfigError> {
        let names = match self.class {
            ParameterClass::Opt => Names::option(&self.names)?,
            ParameterClass::Arg => Names::positional(&self.names)?,
        };

        if let Nargs::Range(min, max) = self.nargs {
            if min > max {
                return Err(ConfigError(format!(
                    "'{n}' declares the impossible {nargs}.",
                    n = self.names,
                    nargs = self.nargs
                )));
            }
        }

        if self.class == ParameterClass::Arg && self.nargs.max() == Some(0) {
            return Err(ConfigError(format!(
                "positional '{n}' must accept at least one value.",
                n = self.names
            )));
        }

        if self.class == ParameterClass::Arg && (self.required || self.forwards) {
            return Err(ConfigError(format!(
                "positional '{n}' cannot be required or forwarding; use its nargs instead.",
                n = self.names
            )));
        }

        let config = OptionConfig::new(
            names,
            self.nargs,
            self.required,
            self.forwards,
            self.capture.has_default(),
            self.help,
            self.metavars,
            self.choices,
        );
        Ok(OptionEntry::new(config, Box::new(self.capture)))
    }
}

/// An option/positional parameter for the command parser.
/// Used with [`CommandLineParser::add`](./struct.CommandLineParser.html#method.add) and [`SubCommand::add`](./struct.SubCommand.html#method.add).
///
/// Mis-configurations (ex: an impossible [`Nargs`]) are reported when the parser is built.
pub struct Parameter<'a, T>(ParameterInner<'a, T>);

impl<'a, T> Parameter<'a, T> {
    /// Create an option parameter, named by a comma separated list of one short and/or one long name.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{Parameter, Switch};
    ///
    /// let mut verbose: bool = false;
    /// Parameter::option(Switch::new(&mut verbose, true), "-v, --verbose");
    /// ```
    pub fn option(
        field: impl GenericCapturable<'a, T> + CliOption + 'a,
        names: impl Into<String>,
    ) -> Self {
        let nargs = field.nargs();
        Self(ParameterInner {
            class: ParameterClass::Opt,
            capture: AnonymousCapture::bind(field),
            names: names.into(),
            nargs,
            required: false,
            forwards: false,
            help: None,
            metavars: Vec::default(),
            choices: Vec::default(),
        })
    }

    /// Create a positional parameter.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{Parameter, Scalar};
    ///
    /// let mut file: String = String::default();
    /// Parameter::argument(Scalar::new(&mut file), "file");
    /// ```
    pub fn argument(
        field: impl GenericCapturable<'a, T> + CliArgument + 'a,
        name: impl Into<String>,
    ) -> Self {
        let nargs = field.nargs();
        Self(ParameterInner {
            class: ParameterClass::Arg,
            capture: AnonymousCapture::bind(field),
            names: name.into(),
            nargs,
            required: false,
            forwards: false,
            help: None,
            metavars: Vec::default(),
            choices: Vec::default(),
        })
    }

    /// Document the help message for this parameter.
    /// If repeated, only the final message will apply to the parameter.
    ///
    /// A help message describes the parameter in full sentence/paragraph format.
    /// We recommend allowing `argot` to format this field (ex: it is not recommended to use line breaks `'\n'`).
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{Parameter, Scalar};
    ///
    /// let mut verbose: bool = false;
    /// Parameter::argument(Scalar::new(&mut verbose), "verbose")
    ///     .help("--this will get discarded--")
    ///     .help("Make the program output verbose.  Description may include multiple sentences.");
    /// ```
    pub fn help(self, description: impl Into<String>) -> Self {
        let mut inner = self.0;
        inner.help = Some(description.into());
        Self(inner)
    }

    /// Name the value(s) of this parameter in help.
    /// If repeated, only the final names will apply to the parameter.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{Nargs, Parameter, Collection};
    ///
    /// let mut point: Vec<f64> = Vec::default();
    /// Parameter::option(Collection::new(&mut point, Nargs::Precisely(2)), "--point")
    ///     .meta(vec!["X", "Y"]);
    /// ```
    pub fn meta(self, names: Vec<impl Into<String>>) -> Self {
        let mut inner = self.0;
        inner.metavars = names.into_iter().map(|s| s.into()).collect();
        Self(inner)
    }

    /// Override the number of values per activation.
    pub fn nargs(self, nargs: Nargs) -> Self {
        let mut inner = self.0;
        inner.nargs = nargs;
        Self(inner)
    }

    /// Demand the option be given a value (directly, or via an aliased option).
    pub fn required(self) -> Self {
        let mut inner = self.0;
        inner.required = true;
        Self(inner)
    }

    /// Accept the `--name,a,b,c` syntax, forwarding each comma separated value to this option.
    ///
    /// A literal `,` is written as `,,`.
    pub fn forward(self) -> Self {
        let mut inner = self.0;
        inner.forwards = true;
        Self(inner)
    }

    /// Convert tokens with `converter` instead of `FromStr`.
    /// The `Err` message is reported as a conversion error.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{Parameter, Scalar};
    ///
    /// let mut level: u8 = 0;
    /// Parameter::option(Scalar::new(&mut level), "--level")
    ///     .converter(|token| match token {
    ///         "low" => Ok(1),
    ///         "high" => Ok(9),
    ///         _ => Err(format!("unknown level '{token}'")),
    ///     });
    /// ```
    pub fn converter(self, converter: impl Fn(&str) -> Result<T, String> + 'a) -> Self {
        let mut inner = self.0;
        inner.capture.converter = Some(Box::new(converter));
        Self(inner)
    }

    /// Deliver converted values to `action` instead of the bound variable.
    ///
    /// An activation without values delivers the flag value (if any).
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{Parameter, Trigger};
    ///
    /// Parameter::option(Trigger::new(), "--version")
    ///     .action(|_, environment| {
    ///         environment.print("1.0.0");
    ///         environment.exit();
    ///     });
    /// ```
    pub fn action(self, action: impl FnMut(T, &mut Environment) + 'a) -> Self {
        let mut inner = self.0;
        inner.capture.action = Some(Box::new(action));
        Self(inner)
    }

    /// Deliver the raw tokens to `action`, instead of converting them for the bound variable.
    /// Neither the converter nor the choices are consulted, so the action sees every token as written.
    ///
    /// An activation without values does not call the action.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{Parameter, Scalar};
    ///
    /// let mut port: u16 = 0;
    /// Parameter::option(Scalar::new(&mut port), "--port")
    ///     .action_raw(|token, environment| {
    ///         if token != "auto" && token.parse::<u16>().is_err() {
    ///             environment.error(format!("'{token}' is neither a port nor 'auto'."));
    ///         }
    ///     });
    /// ```
    pub fn action_raw(self, action: impl FnMut(&str, &mut Environment) + 'a) -> Self {
        let mut inner = self.0;
        inner.capture.raw_action = Some(Box::new(action));
        Self(inner)
    }

    pub(super) fn consume(self) -> ParameterInner<'a, T> {
        self.0
    }
}

impl<'a, T: Clone + 'a> Parameter<'a, T> {
    /// The value stored when the option is activated without values.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{Nargs, Parameter, Scalar};
    ///
    /// // `--color` means "always", while `--color=never` is explicit.
    /// let mut color: String = String::default();
    /// Parameter::option(Scalar::new(&mut color), "--color")
    ///     .nargs(Nargs::Range(0, 1))
    ///     .flag("always".to_string());
    /// ```
    pub fn flag(self, value: T) -> Self {
        let mut inner = self.0;
        inner.capture.flag = Some(Box::new(move || value.clone()));
        Self(inner)
    }

    /// The value stored when nothing assigns the parameter during a parse.
    pub fn absent(self, value: T) -> Self {
        self.absent_values(vec![value])
    }

    /// The values stored when nothing assigns the parameter during a parse.
    pub fn absent_values(self, values: impl IntoIterator<Item = T>) -> Self {
        let mut inner = self.0;
        let values: Vec<T> = values.into_iter().collect();
        inner.capture.absent = Some(Box::new(move || values.clone()));
        Self(inner)
    }
}

impl<'a, T: std::fmt::Display + PartialEq> Choices<T> for Parameter<'a, T> {
    /// Restrict the parameter to (and document) a choice.
    /// Once any choice is declared, values outside of the choices are rejected.
    /// If repeated for the same `variant` of `T`, only the final message will apply to the parameter.
    ///
    /// ### Example
    /// ```
    /// # use argot_builder as argot;
    /// use argot::{prelude::*, Parameter, Scalar};
    ///
    /// let mut door: u32 = 0;
    /// Parameter::argument(Scalar::new(&mut door), "door")
    ///     .choice(1, "--this will get discarded--")
    ///     .choice(1, "Enter door #1.")
    ///     .choice(2, "Enter door #2.  Description may include multiple sentences.");
    /// ```
    fn choice(self, variant: T, description: impl Into<String>) -> Self {
        let mut inner = self.0;
        let key = variant.to_string();
        let description = description.into();

        match inner.choices.iter_mut().find(|(k, _)| k == &key) {
            Some((_, existing)) => *existing = description,
            None => {
                inner.choices.push((key, description));
                inner.capture.choices.push(variant);
            }
        }

        inner.capture.matches = Some(<T as PartialEq>::eq);
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Collection, Optional, OptionalCollection, Scalar, Switch, Trigger};
    use crate::parser::InMemoryInterface;

    fn capture_all<'a>(entry: &mut OptionEntry<'a>, tokens: &[&str]) -> Vec<InvalidCapture> {
        let interface = InMemoryInterface::default();
        let mut errors = Vec::default();

        for token in tokens {
            let mut environment = Environment::new("test", &interface);
            if let Err(error) = entry.capture.capture(token, &mut environment) {
                errors.push(error);
            }
        }

        errors
    }

    #[test]
    fn option() {
        let mut flag: bool = false;
        let option = Parameter::option(Switch::new(&mut flag, true), "-f, --flag").consume();

        assert_eq!(option.class(), ParameterClass::Opt);
        assert_eq!(option.names, "-f, --flag");
        assert_eq!(option.nargs, Nargs::Precisely(0));
        assert_eq!(option.help, None);
        assert!(option.metavars.is_empty());
        assert!(option.choices.is_empty());

        let entry = option.into_entry().unwrap();
        assert_eq!(entry.config.name(), "--flag");
        assert_eq!(entry.config.short(), Some('f'));
    }

    #[test]
    fn option_builder() {
        let mut value: u32 = 0;
        let option = Parameter::option(Scalar::new(&mut value), "--value")
            .help("--this will get discarded--")
            .help("help message")
            .meta(vec!["V"])
            .nargs(Nargs::Range(0, 1))
            .required()
            .forward()
            .consume();

        assert_eq!(option.help, Some("help message".to_string()));
        assert_eq!(option.metavars, vec!["V".to_string()]);
        assert_eq!(option.nargs, Nargs::Range(0, 1));
        assert!(option.required);
        assert!(option.forwards);
    }

    #[test]
    fn option_invalid_nargs() {
        let mut value: Vec<u32> = Vec::default();
        let option = Parameter::option(Collection::new(&mut value, Nargs::Any), "--value")
            .nargs(Nargs::Range(3, 1))
            .consume();
        assert_matches!(option.into_entry(), Err(ConfigError(_)));

        // The field's own nargs are held to the same check.
        let mut value: Vec<u32> = Vec::default();
        let option =
            Parameter::option(Collection::new(&mut value, Nargs::Range(3, 1)), "--value").consume();
        assert_matches!(option.into_entry(), Err(ConfigError(_)));

        let mut value: Option<Vec<u32>> = None;
        let option = Parameter::option(
            OptionalCollection::new(&mut value, Nargs::Range(2, 0)),
            "--value",
        )
        .consume();
        assert_matches!(option.into_entry(), Err(ConfigError(_)));
    }

    #[test]
    fn option_invalid_names() {
        let mut value: u32 = 0;
        let option = Parameter::option(Scalar::new(&mut value), "value").consume();
        assert_matches!(option.into_entry(), Err(ConfigError(_)));
    }

    #[test]
    fn argument() {
        let mut item: u32 = 0;
        let argument = Parameter::argument(Scalar::new(&mut item), "item").consume();
        assert_eq!(argument.class(), ParameterClass::Arg);

        let entry = argument.into_entry().unwrap();
        assert!(entry.config.is_positional());
        assert_eq!(entry.config.name(), "item");
    }

    #[test]
    fn argument_invalid() {
        let mut item: u32 = 0;
        let argument = Parameter::argument(Scalar::new(&mut item), "item")
            .nargs(Nargs::Precisely(0))
            .consume();
        assert_matches!(argument.into_entry(), Err(ConfigError(_)));

        let mut item: u32 = 0;
        let argument = Parameter::argument(Scalar::new(&mut item), "--item").consume();
        assert_matches!(argument.into_entry(), Err(ConfigError(_)));

        let mut item: u32 = 0;
        let argument = Parameter::argument(Scalar::new(&mut item), "item")
            .required()
            .consume();
        assert_matches!(argument.into_entry(), Err(ConfigError(_)));
    }

    #[test]
    fn choices() {
        let mut item: u32 = 0;
        let argument = Parameter::argument(Scalar::new(&mut item), "item")
            .choice(1, "b")
            .choice(2, "d")
            .choice(1, "e")
            .consume();
        assert_eq!(
            argument.choices,
            vec![
                ("1".to_string(), "e".to_string()),
                ("2".to_string(), "d".to_string())
            ]
        );

        let mut entry = argument.into_entry().unwrap();
        let errors = capture_all(&mut entry, &["2", "3", "x"]);
        assert_matches!(
            errors.as_slice(),
            [
                InvalidCapture::InvalidChoice { .. },
                InvalidCapture::InvalidConversion { .. }
            ]
        );
        assert_eq!(entry.capture.assigned(), 3);
        drop(entry);
        assert_eq!(item, 2);
    }

    #[test]
    fn converter() {
        let mut level: u8 = 0;
        let mut entry = Parameter::option(Scalar::new(&mut level), "--level")
            .converter(|token| match token {
                "low" => Ok(1),
                "high" => Ok(9),
                _ => Err(format!("unknown level '{token}'")),
            })
            .consume()
            .into_entry()
            .unwrap();

        let errors = capture_all(&mut entry, &["high", "medium"]);
        assert_eq!(
            errors,
            vec![InvalidCapture::InvalidConversion {
                token: "medium".to_string(),
                type_name: "u8",
                message: "unknown level 'medium'".to_string(),
            }]
        );
        drop(entry);
        assert_eq!(level, 9);
    }

    #[test]
    fn action() {
        let mut seen: Vec<u32> = Vec::default();
        let mut value: u32 = 0;
        let mut entry = Parameter::option(Scalar::new(&mut value), "--value")
            .action(|v, _| seen.push(v))
            .consume()
            .into_entry()
            .unwrap();

        let errors = capture_all(&mut entry, &["1", "2"]);
        assert!(errors.is_empty());
        drop(entry);
        // The action replaces the store.
        assert_eq!(value, 0);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn action_raw() {
        let interface = InMemoryInterface::default();
        let mut seen: Vec<String> = Vec::default();
        let mut value: u32 = 0;
        let mut entry = Parameter::option(Scalar::new(&mut value), "--value")
            .choice(1, "One.")
            .action_raw(|token, _| seen.push(token.to_string()))
            .consume()
            .into_entry()
            .unwrap();

        // Neither 'abc' nor '2' would survive conversion and choices.
        let errors = capture_all(&mut entry, &["abc", "2", "1"]);
        assert!(errors.is_empty());
        assert_eq!(entry.capture.assigned(), 3);

        let mut environment = Environment::new("--value", &interface);
        entry.capture.capture_missing(&mut environment);
        drop(entry);
        assert_eq!(value, 0);
        assert_eq!(seen, vec!["abc", "2", "1"]);
    }

    #[test]
    fn flag() {
        let interface = InMemoryInterface::default();
        let mut value: Option<u32> = None;
        let mut entry = Parameter::option(Optional::new(&mut value), "--value")
            .nargs(Nargs::Range(0, 1))
            .flag(7)
            .consume()
            .into_entry()
            .unwrap();

        let mut environment = Environment::new("--value", &interface);
        entry.capture.capture_missing(&mut environment);
        assert_eq!(entry.capture.assigned(), 1);
        drop(entry);
        assert_eq!(value, Some(7));
    }

    #[test]
    fn trigger_action() {
        let interface = InMemoryInterface::default();
        let mut count = 0;
        let mut entry = Parameter::option(Trigger::new(), "--ping")
            .action(|_, environment| {
                count += 1;
                environment.print("pong");
            })
            .consume()
            .into_entry()
            .unwrap();

        let mut environment = Environment::new("--ping", &interface);
        entry.capture.capture_missing(&mut environment);
        entry.capture.capture_missing(&mut environment);
        drop(entry);
        assert_eq!(count, 2);
        assert_eq!(interface.messages(), vec!["pong", "pong"]);
    }

    #[test]
    fn absent() {
        let mut value: Vec<u32> = Vec::default();
        let mut entry = Parameter::option(Collection::new(&mut value, Nargs::Any), "--value")
            .absent_values(vec![1, 2])
            .consume()
            .into_entry()
            .unwrap();

        assert!(entry.config.has_default());
        assert!(entry.capture.apply_default());
        assert_eq!(entry.capture.assigned(), 1);
        drop(entry);
        assert_eq!(value, vec![1, 2]);
    }
}
