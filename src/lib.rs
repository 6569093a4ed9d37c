//! `argot` is a variable-binding command line parser for Rust.
//!
//! A program declares its parameters by binding them to its own variables.
//! Parsing walks the command line once, converting and storing values straight into those variables.
//! `argot` prioritizes the following design concerns:
//! * *Type safe argument parsing*:
//! The user should not call any `&str -> T` conversion functions directly.
//! * *Options and positionals*:
//! Options are named (`--level`, `-l`) and may be repeated, clustered (`-abc`) or given inline (`--level=3`).
//! Positionals are matched by order.
//! * *Groups and sub-commands*:
//! Options may be organized into (possibly exclusive, possibly required) groups, and programs into sub-commands.
//! Sub-commands may be declared lazily, so that their parameters are only built when matched.
//! * *Argument files*:
//! A token `@path` splices in the tokens of the file at `path`, one per line.
//! * *Errors as values*:
//! Problems on the command line never stop the parse.
//! They are accumulated into a [`ParseResult`], rendered once, and mapped to an exit code.
//!
//! # Usage
//! This page includes a few demos on using `argot`.
//! More are outlined in [the source](https://github.com/argot-rs/argot/tree/main/demos).
//!
//! ```no_run
#![doc = include_str!("../demos/summer.rs")]
//! ```
//!
//! ```console
//! $ summer -h
//! usage: summer [-h] item [...]
//!
//! Sum some integers (negative numbers welcome).
//!
//! positional arguments:
//!  item [...]  The items to sum.
//!
//! options:
//!  -h, --help  Show this help message and exit.
//!
//! $ summer 1 2 -3
//! Sum: 0
//!
//! $ summer
//! Parse error: Not enough tokens provided to parameter 'item'. Expected at least 1 value(s), received 0.
//!
//! $ summer 1 blah
//! Parse error: Invalid value for 'item'. cannot convert 'blah' to i64: invalid digit found in string.
//! ```
//!
//! # Builder Api
//! Configure `argot` by starting with a [`CommandLineParser`] and `add`ing parameters.
//! There are two classes of parameters: [`Parameter::argument`] and [`Parameter::option`].
//!
//! Each parameter takes a *field* which specifies:
//! * The underlying type `T` of the parameter (ex: `u32`), parsed via [`std::str::FromStr`] unless a [`Parameter::converter`] is given.
//! * Whether `T` is wrapped in a container type (ex: `Vec<T>` or `Option<T>`).
//! * The cardinality ([`Nargs`]) of the parameter.
//!
//! ### Fields
//! * [`Scalar`]: a single-value parameter.
//! * [`Collection`]: a multi-value parameter, for any collection that implements [Collectable](./prelude/trait.Collectable.html) (`Vec<T>` and `HashSet<T>`).
//! * [`Switch`]: a no-value option which stores its target when activated (ex: `--verbose`).
//! * [`Optional`]: an `Option<T>` option.
//! * [`OptionalCollection`]: an `Option<C>` multi-value option.
//! * [`Trigger`]: a no-value option with nothing bound, used alongside [`Parameter::action`].
//!
//! ### Defaults
//! Every bound variable is reset to its `Default` at the start of each parse.
//! Use [`Parameter::absent`] to store a different value when nothing on the command line assigns the parameter.
//! A parser may therefore be run repeatedly, with each run independent from the last.
//!
//! ### Groups
//! Options may be placed into a [`Group`] via [`CommandLineParser::group`].
//! Groups present their options under a common heading in help.
//! An exclusive group rejects more than one of its options on the command line, while a required group demands at least one.
//!
//! ### Sub-commands
//! A sub-command is declared either directly, via [`CommandLineParser::command`], or through the [`CommandOptions`] trait.
//! The latter may be registered by reference ([`CommandLineParser::command_options`]) or as a factory ([`CommandLineParser::command_factory`]) whose instances are handed back on the [`ParseResult`].
//! In both cases, the parameters are declared only once the sub-command's name is matched.
//!
//! ```no_run
#![doc = include_str!("../demos/archiver.rs")]
//! ```
//!
//! ### Forwarding & actions
//! A forwarding option (see [`Parameter::forward`]) accepts `--name,a,b,c`, as commonly used to pass flags through to another tool.
//! An action (see [`Parameter::action`]) receives each converted value instead of the bound variable, along with an [`Environment`] through which it may print, show help, report an error or exit.
//! Use [`Parameter::action_raw`] instead when the action should see each token as written, before any conversion.
//!
//! ```no_run
#![doc = include_str!("../demos/forwarder.rs")]
//! ```
//!
//! # Cli Semantics
//! `argot` classifies each token as it arrives, according to the following rules.
//!
//! * `--` ends option processing: every following token is a positional value.
//! * `@path` is replaced by the tokens of the file at `path` (nested up to a configurable depth).
//! * `--name` activates an option, and `--name=value` gives it exactly one inline value.
//! * `-abc` activates each of `-a`, `-b` and `-c`.
//! Only the final option of a cluster may go on to consume values, so `-abc=v` is equivalent to `-a -b -c v`.
//! * A token which looks like a negative number (ex: `-1`, `-2.5`) is a value, unless a short option of that name exists.
//! * An active option consumes values up to its maximum cardinality.
//! Once it is satisfied, the next value rolls over to the positionals.
//! * Positionals are filled in order, and the first token matching a sub-command's name hands the rest of the command line to that sub-command.
//! * Tokens beyond every positional are ignored, and reported via [`ParseResult::ignored`].
//!
//! Required options, minimum cardinalities and group constraints are validated once the tokens are exhausted.
//! Every problem found is reported; see [`ErrorCode`] for the full list.
//!
//! # Features
//! * `unit_test`: For features that help with unit testing (ex: `InMemoryInterface`).
//! * `tracing_debug`: Emit `tracing` debug events as tokens are classified and captured.
pub use argot_builder::*;
