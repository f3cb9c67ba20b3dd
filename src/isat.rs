extern crate clap;
use clap::*;

mod cmd_isat;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = Command::new("isat")
        .version(crate_version!())
        .about("`isat` - Integration Site Analysis Toolkit")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_isat::bed::make_subcommand())
        .subcommand(cmd_isat::sam::make_subcommand())
        .subcommand(cmd_isat::reference::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Integration sites:
    * bed - BED6 site tools: merge, sort

* Alignments:
    * sam - SAM/BAM tools: mapping-filter, fiveprime-filter, count

* Reference:
    * ref - Vector tools: circularize

Log verbosity follows RUST_LOG (default: info).

"###,
        );

    match app.get_matches().subcommand() {
        Some(("bed", sub_matches)) => cmd_isat::bed::execute(sub_matches),
        Some(("sam", sub_matches)) => cmd_isat::sam::execute(sub_matches),
        Some(("ref", sub_matches)) => cmd_isat::reference::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
