use clap::{arg, ArgMatches, Command};
use yansi::Paint;

use yarex::re::optimizer::optimize;
use yarex::re::optree::compiler::Compiler;
use yarex::re::parser::Parser;

/// Creates the `dump` command.
pub fn dump() -> Command {
    super::command("dump")
        .about("Show how a regular expression is compiled")
        .arg(arg!(<PATTERN>).help("Regular expression"))
        // Keep options sorted alphabetically by their long name.
        // For instance, --bar goes before --foo.
        .arg(arg!(--ast).help("Show the optimized syntax tree"))
        .arg(arg!(--optree).help("Show the op tree"))
}

pub fn exec_dump(args: &ArgMatches) -> anyhow::Result<()> {
    let pattern = args.get_one::<String>("PATTERN").unwrap();

    // Show everything unless asked for some specific part.
    let (show_ast, show_optree) =
        match (args.get_flag("ast"), args.get_flag("optree")) {
            (false, false) => (true, true),
            flags => flags,
        };

    let ast = optimize(Parser::new().parse(pattern)?);

    if show_ast {
        let mut output = String::new();
        ascii_tree::write_tree(&mut output, &ast.ascii_tree())?;
        println!("{}", "AST:".bold());
        println!("{ast}");
        println!("{output}");
    }

    if show_optree {
        let tree = Compiler::new().compile(&ast)?;
        println!("{}", "OPTREE:".bold());
        print!("{tree}");
    }

    Ok(())
}
