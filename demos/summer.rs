use argot::{Collection, CommandLineParser, Nargs, Parameter};

fn main() {
    let mut items: Vec<i64> = Vec::default();

    let clp = CommandLineParser::new("summer");
    let parser = clp
        .about("Sum some integers (negative numbers welcome).")
        .add(
            Parameter::argument(Collection::new(&mut items, Nargs::AtLeastOne), "item")
                .help("The items to sum."),
        )
        .build();

    let _ = parser.parse();
    let sum: i64 = items.iter().sum();
    println!("Sum: {sum}");
}
