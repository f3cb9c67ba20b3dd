pub mod circularize;

use clap::{ArgMatches, Command};

pub fn make_subcommand() -> Command {
    Command::new("ref")
        .about("Reference and vector sequence tools")
        .subcommand_required(true)
        .subcommand(circularize::make_subcommand())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    match args.subcommand() {
        Some(("circularize", sub_matches)) => circularize::execute(sub_matches),
        _ => unreachable!(),
    }
}
