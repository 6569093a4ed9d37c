use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

use crate::model::Nargs;

/// Marker trait for capturable types that can formulate an option in the Cli
pub trait CliOption {}

/// Marker trait for capturable types that can formulate an argument in the Cli.
pub trait CliArgument {}

static NEXT_VALUE_ID: AtomicUsize = AtomicUsize::new(0);

/// Identifies the caller variable behind a field.
///
/// Fields cloned from one another share their `ValueId`, and so share their value state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(usize);

impl ValueId {
    pub(crate) fn mint() -> Self {
        Self(NEXT_VALUE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Behaviour to capture an explicit generic type T into a caller variable.
///
/// We use this at the bottom of the command line parser object graph so the compiler can maintain each field's type.
#[doc(hidden)]
pub trait GenericCapturable<'a, T> {
    /// The identity of the bound variable.
    fn value_id(&self) -> ValueId;

    /// Get the default `Nargs` for this implementation.
    fn nargs(&self) -> Nargs;

    /// The value implied by this field when it is activated without values.
    fn flag(&self) -> Option<T> {
        None
    }

    /// Convert a token into the generic type T.
    fn convert(&self, token: &str) -> Result<T, InvalidCapture>;

    /// Store a converted value.
    fn capture(&mut self, value: T);

    /// Respond to an activation which received no values.
    fn capture_missing(&mut self, flag: Option<T>);

    /// Restore the variable to its default-constructed state, at most once per parse.
    fn reset(&mut self);

    /// How many times the bound variable has been assigned during this parse.
    fn assigned(&self) -> usize;

    /// Record one assignment to the bound variable.
    fn note_assigned(&mut self);

    /// Record a failed assignment to the bound variable.
    fn note_error(&mut self);
}

#[derive(Debug, Error, PartialEq, Eq)]
#[doc(hidden)]
pub enum InvalidCapture {
    #[error("cannot convert '{token}' to {type_name}: {message}.")]
    InvalidConversion {
        token: String,
        type_name: &'static str,
        message: String,
    },
    #[error("'{token}' is not one of the available choices.")]
    InvalidChoice { token: String },
    #[error("cannot capture '{token}': the parameter takes no values.")]
    NoValues { token: String },
}
