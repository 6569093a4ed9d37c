mod capture;
mod command;
mod core;
mod environment;
mod field;
mod group;
mod parameter;

pub use self::core::*;
pub use capture::*;
pub use command::*;
pub use environment::Environment;
pub(crate) use environment::Signals;
pub use field::*;
pub use group::*;
pub use parameter::*;
