use terminal_size::{terminal_size, Width};

use crate::parser::definition::{OptionConfig, ParserDefinition};
use crate::parser::interface::{
    ColumnRenderer, LeftWidth, MiddleWidth, PaddingWidth, TotalWidth, UserInterface,
    MINIMUM_MIDDLE_WIDTH,
};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Behaviour to render the help message of a parser level.
pub trait HelpFormatter {
    /// Render the help for `definition`, invoked as `program`, to the user interface.
    fn format(&self, program: &str, definition: &ParserDefinition, user_interface: &dyn UserInterface);
}

/// The default help layout: a usage line, then two column sections for positionals, options, groups, and commands.
///
/// The columns adapt to the terminal width, when there is a terminal.
#[derive(Debug, Default)]
pub struct DefaultFormatter {
    width: Option<usize>,
}

const PADDING_WIDTH: usize = 3;
const MAIN_INDENT: usize = 1;
const CHOICE_INDENT: usize = 2;

impl DefaultFormatter {
    /// Lay out the help for a fixed total width, instead of the terminal's.
    pub fn with_width(width: usize) -> Self {
        Self { width: Some(width) }
    }

    fn total_width(&self) -> Option<usize> {
        self.width.or_else(|| {
            terminal_size().map(|(Width(terminal_width), _)| terminal_width as usize)
        })
    }
}

struct Row {
    indent: usize,
    left: String,
    middle: String,
}

impl Row {
    fn new(indent: usize, left: impl Into<String>, middle: impl Into<String>) -> Self {
        Self {
            indent,
            left: left.into(),
            middle: middle.into(),
        }
    }
}

enum Block {
    Heading(String),
    Text(String),
    Row(Row),
}

impl HelpFormatter for DefaultFormatter {
    fn format(&self, program: &str, definition: &ParserDefinition, user_interface: &dyn UserInterface) {
        let mut blocks: Vec<Block> = Vec::default();

        if let Some(about) = definition.about() {
            blocks.push(Block::Heading(String::default()));
            blocks.push(Block::Text(about.to_string()));
        }

        let ungrouped = definition
            .positionals()
            .filter(|config| config.group().is_none())
            .collect::<Vec<_>>();

        if !ungrouped.is_empty() {
            blocks.push(Block::Heading("positional arguments:".to_string()));

            for config in ungrouped {
                parameter_rows(config, &mut blocks);
            }
        }

        let (help, others): (Vec<&OptionConfig>, Vec<&OptionConfig>) = definition
            .options()
            .filter(|config| config.group().is_none())
            .partition(|config| definition.is_help(config));

        if !help.is_empty() || !others.is_empty() {
            blocks.push(Block::Heading("options:".to_string()));

            for config in help.into_iter().chain(others) {
                parameter_rows(config, &mut blocks);
            }
        }

        for group in definition.groups() {
            blocks.push(Block::Heading(format!("{}:", group.heading())));

            if let Some(about) = group.about() {
                blocks.push(Block::Text(about.to_string()));
            }

            for config in definition
                .positionals()
                .chain(definition.options())
                .filter(|config| config.group() == Some(group.name()))
            {
                parameter_rows(config, &mut blocks);
            }
        }

        if definition.commands().next().is_some() {
            blocks.push(Block::Heading("commands:".to_string()));

            for command in definition.commands() {
                blocks.push(Block::Row(Row::new(
                    MAIN_INDENT,
                    command.name(),
                    command.about().unwrap_or_default(),
                )));
            }
        }

        if let Some(epilog) = definition.epilog() {
            blocks.push(Block::Heading(String::default()));
            blocks.push(Block::Text(epilog.to_string()));
        }

        let column_renderer = self.renderer(&blocks);

        match definition.usage() {
            Some(usage) => user_interface.print(format!("usage: {usage}")),
            None => user_interface.print(format!("usage: {program}{}", summary(definition))),
        }

        for block in blocks {
            match block {
                Block::Heading(heading) => {
                    user_interface.print(String::default());

                    if !heading.is_empty() {
                        user_interface.print(heading);
                    }
                }
                Block::Text(text) => user_interface.print(text),
                Block::Row(row) => {
                    for line in column_renderer.render(row.indent, &row.left, &row.middle) {
                        user_interface.print(line);
                    }
                }
            }
        }
    }
}

impl DefaultFormatter {
    fn renderer(&self, blocks: &[Block]) -> ColumnRenderer {
        let mut left_column_width = 1;
        let mut middle_column_width = 2;

        for block in blocks {
            if let Block::Row(row) = block {
                left_column_width =
                    std::cmp::max(left_column_width, row.left.chars().count() + row.indent - 1);
                middle_column_width =
                    std::cmp::max(middle_column_width, row.middle.chars().count() + row.indent);
            }
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Help columns: left {left_column_width}, middle {middle_column_width}.");
        }

        let padding = PaddingWidth(PADDING_WIDTH);
        let left = LeftWidth(left_column_width);

        match self.total_width() {
            Some(total) => ColumnRenderer::guided(
                padding,
                left,
                MiddleWidth(middle_column_width),
                TotalWidth(total),
            ),
            None => ColumnRenderer::new(
                padding,
                left,
                MiddleWidth(std::cmp::min(middle_column_width, MINIMUM_MIDDLE_WIDTH)),
            ),
        }
    }
}

fn parameter_rows(config: &OptionConfig, blocks: &mut Vec<Block>) {
    let grammar = grammar(config);
    let left = if config.is_positional() {
        grammar.trim_start().to_string()
    } else {
        let mut names = Vec::default();

        if let Some(short) = config.short() {
            names.push(format!("-{short}{grammar}"));
        }

        if let Some(long) = config.long() {
            names.push(format!("--{long}{grammar}"));
        }

        names.join(", ")
    };

    let choices = config
        .choices()
        .iter()
        .map(|(choice, _)| choice.as_str())
        .collect::<Vec<_>>();
    let mut middle = if choices.is_empty() {
        String::default()
    } else {
        format!("{{{}}} ", choices.join(", "))
    };

    if let Some(help) = config.help() {
        middle.push_str(help);
    }

    if config.required() {
        middle.push_str(" (required)");
    }

    blocks.push(Block::Row(Row::new(MAIN_INDENT, left, middle.trim())));

    for (choice, description) in config.choices() {
        blocks.push(Block::Row(Row::new(
            MAIN_INDENT + CHOICE_INDENT,
            choice,
            description,
        )));
    }
}

/// The words describing the values of `config`, each preceded by a space.
fn grammar(config: &OptionConfig) -> String {
    let example = if config.is_positional() {
        config.name().to_string()
    } else {
        config
            .name()
            .trim_start_matches('-')
            .to_ascii_uppercase()
            .replace('-', "_")
    };
    let metavars = config.metavars();
    let min = config.min();
    let optional;
    let mut words: Vec<&str> = (0..min).map(|i| metavar(metavars, &example, i)).collect();

    match config.max() {
        Some(max) if max == min => {}
        Some(max) if max == min + 1 => {
            optional = format!("[{}]", metavar(metavars, &example, min));
            words.push(&optional);
        }
        _ => {
            optional = format!("[{} ...]", metavar(metavars, &example, min));
            words.push(&optional);
        }
    }

    words.iter().map(|w| format!(" {w}")).collect()
}

fn metavar<'m>(metavars: &'m [String], example: &'m str, i: usize) -> &'m str {
    metavars
        .get(i)
        .or_else(|| metavars.last())
        .map(String::as_str)
        .unwrap_or(example)
}

fn summary(definition: &ParserDefinition) -> String {
    let mut parts = Vec::default();
    let (help, others): (Vec<&OptionConfig>, Vec<&OptionConfig>) = definition
        .options()
        .partition(|config| definition.is_help(config));

    for config in help.into_iter().chain(others) {
        let name = match config.short() {
            Some(short) => format!("-{short}"),
            None => config.name().to_string(),
        };
        let part = format!("{name}{}", grammar(config));

        if config.required() {
            parts.push(part);
        } else {
            parts.push(format!("[{part}]"));
        }
    }

    for config in definition.positionals() {
        parts.push(grammar(config).trim_start().to_string());
    }

    let commands = definition
        .commands()
        .map(|command| command.name())
        .collect::<Vec<_>>();

    if !commands.is_empty() {
        parts.push(format!("{{{}}} ...", commands.join(",")));
    }

    parts.iter().map(|part| format!(" {part}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Collection, CommandLineParser, Group, Parameter, Scalar, Switch};
    use crate::model::Nargs;
    use crate::parser::interface::InMemoryInterface;
    use crate::prelude::*;
    use crate::test::assert_contains;
    use rstest::rstest;

    fn render(definition: &ParserDefinition) -> Vec<String> {
        let interface = InMemoryInterface::default();
        DefaultFormatter::with_width(80).format("program", definition, &interface);
        interface.messages()
    }

    #[test]
    fn format_simple() {
        let mut value: u32 = 0;
        let mut file: String = String::default();
        let parser = CommandLineParser::new("program")
            .add(Parameter::option(Scalar::new(&mut value), "-v, --value").help("The value."))
            .add(Parameter::argument(Scalar::new(&mut file), "file").help("The file."))
            .build_parser()
            .unwrap();

        assert_eq!(
            render(parser.definition()),
            vec![
                "usage: program [-h] [-v VALUE] file",
                "",
                "positional arguments:",
                " file                      The file.",
                "",
                "options:",
                " -h, --help                Show this help message and exit.",
                " -v VALUE, --value VALUE   The value.",
            ]
        );
    }

    #[test]
    fn format_sections() {
        let mut fast = false;
        let mut slow = false;
        let mut level: u32 = 0;
        let parser = CommandLineParser::new("program")
            .about("Does things.")
            .epilog("See the manual.")
            .group(
                Group::new("speed")
                    .title("Speeds")
                    .description("How fast to go.")
                    .exclusive(),
                |scope| {
                    scope
                        .add(Parameter::option(Switch::new(&mut fast, true), "--fast"))
                        .add(Parameter::option(Switch::new(&mut slow, true), "--slow"))
                },
            )
            .add(
                Parameter::option(Scalar::new(&mut level), "--level")
                    .choice(1, "Low.")
                    .choice(2, "High."),
            )
            .command("run", |sub| sub.about("Run it."))
            .build_parser()
            .unwrap();

        let message = render(parser.definition()).join("\n");
        assert_contains!(message, "usage: program [-h] [--fast] [--slow] [--level LEVEL] {run} ...");
        assert_contains!(message, "\nDoes things.\n");
        assert_contains!(message, "\nSpeeds:\nHow fast to go.\n --fast");
        assert_contains!(message, "{1, 2}");
        assert_contains!(message, "   1");
        assert_contains!(message, "Low.");
        assert_contains!(message, "\ncommands:\n run");
        assert_contains!(message, "Run it.");
        assert!(message.ends_with("\n\nSee the manual."), "{message}");
    }

    #[test]
    fn format_usage() {
        let parser = CommandLineParser::new("program")
            .usage("program [anything]")
            .no_help()
            .build_parser()
            .unwrap();

        assert_eq!(render(parser.definition()), vec!["usage: program [anything]"]);
    }

    #[rstest]
    #[case(Nargs::Precisely(0), vec![], "")]
    #[case(Nargs::Precisely(1), vec![], " ITEM")]
    #[case(Nargs::Precisely(2), vec!["A", "B"], " A B")]
    #[case(Nargs::Precisely(3), vec!["A"], " A A A")]
    #[case(Nargs::Any, vec![], " [ITEM ...]")]
    #[case(Nargs::AtLeastOne, vec![], " ITEM [ITEM ...]")]
    #[case(Nargs::Range(0, 1), vec![], " [ITEM]")]
    #[case(Nargs::Range(1, 3), vec!["X", "Y"], " X [Y ...]")]
    fn option_grammar(#[case] nargs: Nargs, #[case] metavars: Vec<&str>, #[case] expected: &str) {
        let mut items: Vec<u32> = Vec::default();
        let parser = CommandLineParser::new("program")
            .add(
                Parameter::option(Collection::new(&mut items, nargs), "--item")
                    .meta(metavars),
            )
            .build_parser()
            .unwrap();
        let config = parser.definition().find_long("item").unwrap();

        assert_eq!(grammar(config), expected);
    }

    #[test]
    fn positional_grammar() {
        let mut items: Vec<u32> = Vec::default();
        let parser = CommandLineParser::new("program")
            .add(Parameter::argument(
                Collection::new(&mut items, Nargs::AtLeastOne),
                "item",
            ))
            .build_parser()
            .unwrap();

        assert_eq!(
            render(parser.definition())[0],
            "usage: program [-h] item [item ...]"
        );
    }
}
