use clap::*;
use isat::libs::hts::{describe, open_alignments};
use isat::libs::sam::SiteCounter;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("count")
        .about("Counts reads at each read 1 5' position")
        .after_help(
            r###"
Each mapped read 1 is reduced to the reference position of its 5' end:
the alignment start for forward reads, the last aligned base for reverse
reads. Read 2 and unmapped reads are ignored.

One BED6 line is written per distinct position, in order of first
appearance, with `.` as the name and the read count as the score:

    chr1  103  103  .  2  -

Examples:
1. Count sites, then merge them:
   isat sam count filtered.bam -o sites.bed
   isat bed merge sites.bed -o merged.bed

"###,
        )
        .arg(
            Arg::new("infile")
                .index(1)
                .num_args(1)
                .default_value("stdin")
                .help("Input SAM/BAM file. [stdin] for standard input"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let (header, records) = open_alignments(args.get_one::<String>("infile").unwrap())?;

    let mut counter = SiteCounter::new();
    for result in records {
        let record = result?;
        counter.add(&describe(&header, &record));
    }
    let r1_total = counter.r1_total();
    let sites = counter.into_sites()?;

    let mut writer = isat::writer(args.get_one::<String>("outfile").unwrap())?;
    for site in &sites {
        writer.write_all(site.to_string().as_bytes())?;
    }
    writer.flush()?;

    log::info!("Counted {} read 1 alignments at {} sites", r1_total, sites.len());

    Ok(())
}
