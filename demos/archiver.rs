use argot::{
    Collection, CommandLineParser, CommandOptions, Group, Nargs, Optional, Parameter, Scalar,
    SubCommand, Switch,
};

#[derive(Debug, Default)]
struct Create {
    archive: String,
    files: Vec<String>,
    gzip: bool,
    bzip: bool,
}

impl CommandOptions for Create {
    fn add_parameters<'b>(&'b mut self, command: SubCommand<'b>) -> SubCommand<'b> {
        command
            .about("Create an archive.")
            .add(
                Parameter::option(Scalar::new(&mut self.archive), "-f, --file")
                    .required()
                    .help("The archive to write."),
            )
            .group(
                Group::new("compression")
                    .title("compression")
                    .description("At most one compression may be chosen.")
                    .exclusive(),
                |scope| {
                    scope
                        .add(Parameter::option(Switch::new(&mut self.gzip, true), "-z, --gzip"))
                        .add(Parameter::option(Switch::new(&mut self.bzip, true), "-j, --bzip2"))
                },
            )
            .add(
                Parameter::argument(Collection::new(&mut self.files, Nargs::AtLeastOne), "file")
                    .help("The files to archive."),
            )
    }

    fn execute(&mut self) -> Result<(), i32> {
        let compression = if self.gzip {
            "gzip"
        } else if self.bzip {
            "bzip2"
        } else {
            "none"
        };
        println!(
            "Creating '{}' from {:?} (compression: {compression}).",
            self.archive, self.files
        );
        Ok(())
    }
}

#[derive(Debug, Default)]
struct List {
    archive: Option<String>,
}

impl CommandOptions for List {
    fn add_parameters<'b>(&'b mut self, command: SubCommand<'b>) -> SubCommand<'b> {
        command.add(
            Parameter::option(Optional::new(&mut self.archive), "-f, --file")
                .help("The archive to read (default: stdin)."),
        )
    }

    fn execute(&mut self) -> Result<(), i32> {
        match &self.archive {
            Some(archive) => println!("Listing '{archive}'."),
            None => println!("Listing stdin."),
        }
        Ok(())
    }
}

fn main() {
    let mut verbose = false;

    let parser = CommandLineParser::new("archiver")
        .about("A toy archiver.  Arguments may be read from files, via '@file'.")
        .epilog("Run 'archiver COMMAND -h' for help on a command.")
        .add(Parameter::option(Switch::new(&mut verbose, true), "-v, --verbose"))
        .command_factory("create", || Box::<Create>::default())
        .command_factory("list", || Box::<List>::default())
        .help_on_empty()
        .build();

    let mut result = parser.parse();
    let commands = result.take_command_options();

    if verbose {
        println!("Commands: {:?}", result.commands());
    }

    for mut command in commands {
        if let Err(exit_code) = command.execute() {
            std::process::exit(exit_code);
        }
    }
}
