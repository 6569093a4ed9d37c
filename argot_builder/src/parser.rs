mod base;
mod definition;
mod interface;
mod middleware;
mod printer;
mod result;
mod tokens;

pub use definition::{CommandInfo, ConfigError, OptionConfig, ParserDefinition};
pub(crate) use definition::{AnonymousCapturable, CommandEntry, CommandSource, Names, OptionEntry};
#[cfg(any(test, feature = "unit_test"))]
pub use interface::InMemoryInterface;
pub use interface::{ConsoleInterface, UserInterface};
pub(crate) use middleware::Settings;
pub use middleware::GeneralParser;
pub use printer::{DefaultFormatter, HelpFormatter};
pub use result::{ParseError, ParseResult};
pub use tokens::{
    DiskFileSystem, FileSystem, IterTokens, LineTokens, MemoryFileSystem, TokenStream,
};
