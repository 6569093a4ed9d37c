use crate::parser::result::ParseError;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// At least 1.
#[derive(Debug)]
pub(crate) struct PaddingWidth(pub(crate) usize);

/// At least 1.
#[derive(Debug)]
pub(crate) struct LeftWidth(pub(crate) usize);

/// At least 2, so that words may be hyphenated.
#[derive(Debug)]
pub(crate) struct MiddleWidth(pub(crate) usize);

#[derive(Debug)]
pub(crate) struct TotalWidth(pub(crate) usize);

/// Lays out a two column table: a left column of names and a wrapped middle column of text.
#[derive(Debug)]
pub(crate) struct ColumnRenderer {
    padding: PaddingWidth,
    left: LeftWidth,
    middle: MiddleWidth,
}

// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

impl ColumnRenderer {
    /// Produce a renderer based off the provided widths.
    /// This renderer will use a heuristic to chose the middle width.
    pub(crate) fn guided(
        padding: PaddingWidth,
        left: LeftWidth,
        middle: MiddleWidth,
        total_width: TotalWidth,
    ) -> Self {
        let non_middle: usize = left.0 + padding.0;
        let target_total_width = (total_width.0 as f64 * TARGET_TOTAL_FACTOR) as usize;
        let guided_middle = std::cmp::max(middle.0, MINIMUM_MIDDLE_WIDTH);

        if guided_middle + non_middle <= target_total_width {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} and middle fit within the target total {target_total_width}.  Selecting middle: {guided_middle}.");
            }

            Self::new(padding, left, MiddleWidth(guided_middle))
        } else if non_middle < total_width.0 {
            let calculated_middle =
                std::cmp::max(total_width.0 - non_middle, MINIMUM_MIDDLE_WIDTH);
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} fits within the total {total}.  Selecting middle: {calculated_middle}.", total = total_width.0);
            }

            Self::new(padding, left, MiddleWidth(calculated_middle))
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} do not fit within the total {total}.  Selecting middle: {MINIMUM_MIDDLE_WIDTH}.", total = total_width.0);
            }

            Self::new(padding, left, MiddleWidth(MINIMUM_MIDDLE_WIDTH))
        }
    }

    /// Produce a renderer based off the provided widths.
    pub(crate) fn new(padding: PaddingWidth, left: LeftWidth, middle: MiddleWidth) -> Self {
        Self {
            padding,
            left,
            middle,
        }
    }

    /// Render one row, wrapping the middle column into as many lines as needed.
    pub(crate) fn render(&self, indent: usize, left: &str, middle: &str) -> Vec<String> {
        let padding = self.padding.0;
        let padding = format!("{:padding$}", "");
        let left_column_width = self.left.0;
        // Never let the indentation squeeze the middle below what hyphenation needs.
        let middle_column_width = std::cmp::max(self.middle.0.saturating_sub(indent), 2);
        let mut out: Vec<String> = chunk(middle, middle_column_width)
            .into_iter()
            .enumerate()
            .map(|(i, part)| {
                let left = if i == 0 { left } else { "" };
                format!("{:indent$}{:left_column_width$}{padding}{part}", "", left)
            })
            .collect();

        if out.is_empty() {
            out.push(format!("{:indent$}{}", "", left));
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split(' ') {
        if !word.is_empty() {
            if current.is_empty() {
                hyphenate(width, &mut lines, &mut current, word);
            } else if current.chars().count() + word.chars().count() + 1 <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = String::default();
                hyphenate(width, &mut lines, &mut current, word);
            }
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let increment = width - 1;
    let characters: Vec<char> = word.chars().collect();
    let mut left = 0;

    while left + increment + 1 < characters.len() {
        let part: String = characters[left..left + increment].iter().collect();
        lines.push(format!("{part}-"));
        left += increment;
    }

    current.extend(&characters[left..]);
}

/// Behaviour for the output channel of a parser.
///
/// Help is written through `print`, and each rendered [`ParseError`] through `print_error`.
pub trait UserInterface {
    /// Print a message to the user (ex: `stdout`).
    fn print(&self, message: String);

    /// Print an error to the user (ex: `stderr`).
    fn print_error(&self, error: &ParseError);
}

/// The console: messages go to `stdout` and errors to `stderr`.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, error: &ParseError) {
        eprintln!("Parse error: {error}");
    }
}

#[cfg(any(test, feature = "unit_test"))]
mod memory {
    use super::UserInterface;
    use crate::parser::result::ParseError;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A [`UserInterface`] which records its output, for use in tests.
    ///
    /// Clones share the same record, so a clone may be handed to the parser while the original inspects it.
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryInterface {
        messages: Rc<RefCell<Vec<String>>>,
        errors: Rc<RefCell<Vec<String>>>,
    }

    impl InMemoryInterface {
        /// All messages printed so far.
        pub fn messages(&self) -> Vec<String> {
            self.messages.borrow().clone()
        }

        /// All messages printed so far, joined into one text.
        pub fn message(&self) -> String {
            self.messages.borrow().join("\n")
        }

        /// All errors printed so far, formatted as the console would.
        pub fn errors(&self) -> Vec<String> {
            self.errors.borrow().clone()
        }
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            self.messages.borrow_mut().push(message);
        }

        fn print_error(&self, error: &ParseError) {
            self.errors
                .borrow_mut()
                .push(format!("Parse error: {error}"));
        }
    }
}

#[cfg(any(test, feature = "unit_test"))]
pub use memory::InMemoryInterface;
