//! Builder module for `argot`.
//! See [documentation root](https://docs.rs/argot/latest/argot/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod constant;
mod matcher;
mod model;
mod parser;
#[allow(missing_docs)]
pub mod prelude;

pub use api::*;
pub use constant::DEFAULT_MAX_INCLUDE_DEPTH;
pub use model::*;
#[cfg(any(test, feature = "unit_test"))]
pub use parser::InMemoryInterface;
pub use parser::{
    CommandInfo, ConfigError, ConsoleInterface, DefaultFormatter, DiskFileSystem, FileSystem,
    GeneralParser, HelpFormatter, IterTokens, LineTokens, MemoryFileSystem, OptionConfig,
    ParseError, ParseResult, ParserDefinition, TokenStream, UserInterface,
};

#[cfg(test)]
#[macro_use]
extern crate assert_matches;

#[cfg(test)]
pub(crate) mod test {
    macro_rules! assert_contains {
        ($base:expr, $sub:expr) => {
            assert!(
                $base.contains($sub),
                "'{b}' does not contain '{s}'",
                b = $base,
                s = $sub,
            );
        };
    }

    pub(crate) use assert_contains;
}
