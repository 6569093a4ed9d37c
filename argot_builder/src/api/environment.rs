use crate::parser::UserInterface;

/// The view of the parser available to a [`Parameter::action`](./struct.Parameter.html#method.action).
///
/// Actions use the environment to report errors, request an exit, or request the help message.
/// Requests take effect once the action returns.
pub struct Environment<'e> {
    name: &'e str,
    user_interface: &'e dyn UserInterface,
    errors: Vec<String>,
    exit: bool,
    exit_error: Option<String>,
    help: bool,
}

/// What an action asked of the parser.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Signals {
    pub(crate) errors: Vec<String>,
    pub(crate) exit: bool,
    pub(crate) exit_error: Option<String>,
    pub(crate) help: bool,
}

impl<'e> Environment<'e> {
    pub(crate) fn new(name: &'e str, user_interface: &'e dyn UserInterface) -> Self {
        Self {
            name,
            user_interface,
            errors: Vec::default(),
            exit: false,
            exit_error: None,
            help: false,
        }
    }

    /// The name of the parameter whose action is running.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Report an error; parsing continues.
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Request the parser to stop and the program to exit successfully.
    pub fn exit(&mut self) {
        self.exit = true;
    }

    /// Request the parser to stop and the program to exit with an error.
    pub fn fail_exit(&mut self, message: impl Into<String>) {
        self.exit = true;
        self.exit_error = Some(message.into());
    }

    /// Request the help message to be shown; the parser then stops.
    pub fn show_help(&mut self) {
        self.help = true;
    }

    /// Print a message through the parser's user interface.
    pub fn print(&self, message: impl Into<String>) {
        self.user_interface.print(message.into());
    }

    pub(crate) fn into_signals(self) -> Signals {
        Signals {
            errors: self.errors,
            exit: self.exit,
            exit_error: self.exit_error,
            help: self.help,
        }
    }
}
