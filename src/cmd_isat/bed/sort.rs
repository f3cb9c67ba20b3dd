use clap::*;
use isat::libs::bed::{read_sites, sort_sites, SortBy};
use std::io::Write;
use std::str::FromStr;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("sort")
        .about("Sorts BED6 integration sites")
        .after_help(
            r###"
Sort orders:
* position: natural chromosome order (chr2 < chr10), then start, then strand
* score: descending score, ties keep their input order

Examples:
1. Sort by position:
   isat bed sort sites.bed

2. Most supported sites first:
   isat bed sort merged.bed --by score -o ranked.bed

"###,
        )
        .arg(
            Arg::new("infile")
                .index(1)
                .num_args(1)
                .default_value("stdin")
                .help("Input BED6 file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
        .arg(
            Arg::new("by")
                .long("by")
                .num_args(1)
                .default_value("position")
                .value_parser([
                    builder::PossibleValue::new("position"),
                    builder::PossibleValue::new("score"),
                ])
                .help("Sort key"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let by = SortBy::from_str(args.get_one::<String>("by").unwrap())?;

    let mut sites = read_sites(isat::reader(args.get_one::<String>("infile").unwrap())?)?;
    sort_sites(&mut sites, by);

    let mut writer = isat::writer(args.get_one::<String>("outfile").unwrap())?;
    for site in &sites {
        writer.write_all(site.to_string().as_bytes())?;
    }
    writer.flush()?;

    log::debug!("Sorted {} sites", sites.len());

    Ok(())
}
