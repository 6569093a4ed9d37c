use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// A source of command line tokens.
pub trait TokenStream {
    /// The next token, or `None` when the stream is exhausted.
    fn next_token(&mut self) -> Option<String>;
}

/// Tokens drawn from an iterator (ex: `std::env::args()`).
pub struct IterTokens<I> {
    iter: I,
}

impl<I> IterTokens<I> {
    /// Stream the items of `iter`.
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter(),
        }
    }
}

impl<I, S> TokenStream for IterTokens<I>
where
    I: Iterator<Item = S>,
    S: Into<String>,
{
    fn next_token(&mut self) -> Option<String> {
        self.iter.next().map(Into::into)
    }
}

/// Tokens read one per line, skipping empty lines.
///
/// This is the format of an `@file` include.
/// A read error ends the stream.
pub struct LineTokens<R> {
    reader: R,
}

impl<R: BufRead> LineTokens<R> {
    /// Stream the lines of `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> TokenStream for LineTokens<R> {
    fn next_token(&mut self) -> Option<String> {
        loop {
            let mut line = String::default();

            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    let token = line.trim_end_matches(|c: char| c == '\n' || c == '\r');

                    if !token.is_empty() {
                        return Some(token.to_string());
                    }
                }
                Err(_error) => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Stopping line tokens after read error: {_error}.");
                    }
                    return None;
                }
            }
        }
    }
}

/// Behaviour to resolve the name of an `@file` include into a token stream.
pub trait FileSystem {
    /// Open `name`, or `None` when it cannot be opened.
    fn open(&self, name: &str) -> Option<Box<dyn TokenStream>>;
}

/// Resolves includes against the disk.
#[derive(Debug, Default)]
pub struct DiskFileSystem {}

impl FileSystem for DiskFileSystem {
    fn open(&self, name: &str) -> Option<Box<dyn TokenStream>> {
        match File::open(name) {
            Ok(file) => Some(Box::new(LineTokens::new(BufReader::new(file)))),
            Err(_error) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Cannot open include '{name}': {_error}.");
                }
                None
            }
        }
    }
}

/// Resolves includes against in-memory contents (ex: for tests).
#[derive(Debug, Default, Clone)]
pub struct MemoryFileSystem {
    files: HashMap<String, String>,
}

impl MemoryFileSystem {
    /// Create an empty file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the file `name`, holding `contents`.
    pub fn file(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.insert(name.into(), contents.into());
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, name: &str) -> Option<Box<dyn TokenStream>> {
        self.files.get(name).map(|contents| {
            Box::new(LineTokens::new(Cursor::new(contents.clone().into_bytes())))
                as Box<dyn TokenStream>
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(stream: &mut dyn TokenStream) -> Vec<String> {
        let mut tokens = Vec::default();

        while let Some(token) = stream.next_token() {
            tokens.push(token);
        }

        tokens
    }

    #[test]
    fn iter_tokens() {
        let mut stream = IterTokens::new(vec!["a", "--b", "c"]);
        assert_eq!(drain(&mut stream), vec!["a", "--b", "c"]);
        assert_eq!(stream.next_token(), None);
    }

    #[test]
    fn iter_tokens_empty() {
        let tokens: &[&str] = empty::slice();
        let mut stream = IterTokens::new(tokens.iter().copied());
        assert_eq!(drain(&mut stream), Vec::<String>::default());
    }

    #[test]
    fn line_tokens() {
        let mut stream = LineTokens::new(Cursor::new("--a\n\n1 2\r\n\n@b\n"));
        assert_eq!(drain(&mut stream), vec!["--a", "1 2", "@b"]);
    }

    #[test]
    fn line_tokens_no_trailing_newline() {
        let mut stream = LineTokens::new(Cursor::new("x\ny"));
        assert_eq!(drain(&mut stream), vec!["x", "y"]);
    }

    #[test]
    fn memory_file_system() {
        let file_system = MemoryFileSystem::new()
            .file("args", "--flag\nvalue\n")
            .file("empty", "");

        let mut stream = file_system.open("args").unwrap();
        assert_eq!(drain(stream.as_mut()), vec!["--flag", "value"]);

        let mut stream = file_system.open("empty").unwrap();
        assert_eq!(drain(stream.as_mut()), Vec::<String>::default());

        assert!(file_system.open("missing").is_none());
    }

    #[test]
    fn disk_file_system_missing() {
        let file_system = DiskFileSystem::default();
        assert!(file_system.open("/this/path/does/not/exist/argot").is_none());
    }
}
