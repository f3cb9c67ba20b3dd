pub mod merge;
pub mod sort;

use clap::{ArgMatches, Command};

pub fn make_subcommand() -> Command {
    Command::new("bed")
        .about("BED6 integration site tools")
        .subcommand_required(true)
        .subcommand(merge::make_subcommand())
        .subcommand(sort::make_subcommand())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    match args.subcommand() {
        Some(("merge", sub_matches)) => merge::execute(sub_matches),
        Some(("sort", sub_matches)) => sort::execute(sub_matches),
        _ => unreachable!(),
    }
}
