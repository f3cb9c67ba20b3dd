pub mod count;
pub mod fiveprime_filter;
pub mod mapping_filter;

use clap::{ArgMatches, Command};

pub fn make_subcommand() -> Command {
    Command::new("sam")
        .about("SAM/BAM tools for integration-site reads")
        .subcommand_required(true)
        .subcommand(mapping_filter::make_subcommand())
        .subcommand(fiveprime_filter::make_subcommand())
        .subcommand(count::make_subcommand())
}

pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    match args.subcommand() {
        Some(("mapping-filter", sub_matches)) => mapping_filter::execute(sub_matches),
        Some(("fiveprime-filter", sub_matches)) => fiveprime_filter::execute(sub_matches),
        Some(("count", sub_matches)) => count::execute(sub_matches),
        _ => unreachable!(),
    }
}
