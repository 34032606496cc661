use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{arg, value_parser, ArgAction, ArgMatches, Command};

use yarex::codegen::RustGenerator;

use crate::help;

pub fn gen() -> Command {
    super::command("gen")
        .about("Generate Rust code for precompiled regular expressions")
        .long_about(help::GEN_LONG_HELP)
        .arg(
            arg!(<OUTPUT_PATH>)
                .help("Path to the generated Rust file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(-p --pattern <PATTERN>)
                .help("Regular expression")
                .required(true)
                .action(ArgAction::Append),
        )
        .arg(
            arg!(--prefix <PREFIX>)
                .help("Prefix for the names of the generated functions")
                .default_value("yarex"),
        )
}

pub fn exec_gen(args: &ArgMatches) -> anyhow::Result<()> {
    let output_path = args.get_one::<PathBuf>("OUTPUT_PATH").unwrap();
    let prefix = args.get_one::<String>("prefix").unwrap();

    let mut generator = RustGenerator::new(prefix.as_str());

    for pattern in args.get_many::<String>("pattern").unwrap() {
        generator
            .add(pattern)
            .with_context(|| format!("can not compile `{}`", pattern))?;
    }

    let file = File::create(output_path).with_context(|| {
        format!("can not write `{}`", output_path.display())
    })?;

    let mut output = BufWriter::new(file);

    generator.write_to(&mut output)?;
    output.flush()?;

    Ok(())
}
