use argot::prelude::*;
use argot::{Collection, CommandLineParser, Nargs, Parameter, Scalar, Trigger};

fn main() {
    let mut compiler_flags: Vec<String> = Vec::default();
    let mut level: u8 = 0;
    let mut offset: i32 = 0;
    let mut sources: Vec<String> = Vec::default();

    let parser = CommandLineParser::new("forwarder")
        .about("Forward flags to a pretend compiler, as in '--compiler,-O2,-g'.")
        .add(
            Parameter::option(Collection::new(&mut compiler_flags, Nargs::Any), "--compiler")
                .forward()
                .help("Comma separated flags for the compiler.  Double commas escape a comma."),
        )
        .add(
            Parameter::option(Scalar::new(&mut level), "-l, --level")
                .choice(0, "No optimization.")
                .choice(1, "Some optimization.")
                .choice(2, "All the optimization.")
                .absent(1),
        )
        .add(
            Parameter::option(Scalar::new(&mut offset), "--offset")
                .help("A (possibly negative) offset.")
                .meta(vec!["N"]),
        )
        .add(
            Parameter::option(Trigger::new(), "-V, --version")
                .help("Print the version and exit.")
                .action(|_, environment| {
                    environment.print(format!("forwarder {}", env!("CARGO_PKG_VERSION")));
                    environment.exit();
                }),
        )
        .add(
            Parameter::argument(Collection::new(&mut sources, Nargs::AtLeastOne), "source")
                .help("The sources to compile."),
        )
        .build();

    let _ = parser.parse();
    println!("compiler {compiler_flags:?} -O{level} --offset={offset} {sources:?}");
}
