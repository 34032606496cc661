use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{arg, value_parser, ArgMatches, Command};
use yansi::Color::{Green, Red};
use yansi::Paint;

use yarex::{Config, Regexp};

use crate::help;

pub fn find() -> Command {
    super::command("find")
        .about("Print the lines that match a regular expression")
        .long_about(help::FIND_LONG_HELP)
        .arg(arg!(<PATTERN>).help("Regular expression"))
        .arg(
            arg!([FILE])
                .help("Input file, the standard input is read if not given")
                .value_parser(value_parser!(PathBuf)),
        )
        // Keep options sorted alphabetically by their long name.
        // For instance, --bar goes before --foo.
        .arg(arg!(-c --count).help("Print only the number of matching lines"))
        .arg(
            arg!(-n --"line-number")
                .help("Print the line number before each matching line"),
        )
        .arg(
            arg!(-o --"only-matching")
                .help("Print only the matching part of each line"),
        )
        .arg(
            arg!(-s --speculative)
                .help("Evaluate alternatives in parallel")
                .long_help(help::SPECULATIVE_LONG_HELP),
        )
}

pub fn exec_find(args: &ArgMatches, mut config: Config) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();
    let count_only = args.get_flag("count");
    let line_number = args.get_flag("line-number");
    let only_matching = args.get_flag("only-matching");

    if args.get_flag("speculative") {
        config.engine.speculative = true;
    }

    let re = Regexp::with_config(pattern, &config)
        .with_context(|| format!("can not compile `{}`", pattern))?;

    let input: Box<dyn BufRead> = match args.get_one::<PathBuf>("FILE") {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("can not open `{}`", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let mut stdout = io::stdout().lock();
    let mut count = 0_usize;

    for (i, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("can not read line {}", i + 1))?;

        let Some(m) = re.find(&line) else {
            continue;
        };

        count += 1;

        if count_only {
            continue;
        }

        if line_number {
            write!(stdout, "{}:", (i + 1).paint(Green))?;
        }

        if only_matching {
            writeln!(stdout, "{}", m.as_str())?;
        } else {
            writeln!(
                stdout,
                "{}{}{}",
                &line[..m.start()],
                m.as_str().paint(Red).bold(),
                &line[m.end()..]
            )?;
        }
    }

    if count_only {
        writeln!(stdout, "{}", count)?;
    }

    Ok(())
}
