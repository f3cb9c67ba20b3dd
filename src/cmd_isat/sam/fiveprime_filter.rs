use clap::*;
use isat::libs::hts::filter_alignments;
use isat::libs::sam::FivePrimeFilter;

use super::mapping_filter::{filter_args, filter_outputs};

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("fiveprime-filter")
        .about("Removes read 1 alignments softclipped at their 5' end")
        .after_help(
            r###"
The 5' end of read 1 marks the integration site, so it must align closely.
Softclipped bases are counted at the start of forward reads and at the end
of reverse reads.

* read 1 with at most --max-softclip clipped bases: kept
* read 1 with more, or without a CIGAR: rejected
* unmapped read 1: written nowhere
* all other reads: kept

Examples:
1. Allow up to 3 clipped bases:
   isat sam fiveprime-filter in.bam -f bam -m 3 -o pass.bam -d fail.bam

"###,
        )
        .args(filter_args())
        .arg(
            Arg::new("max-softclip")
                .long("max-softclip")
                .short('m')
                .num_args(1)
                .default_value("5")
                .value_parser(value_parser!(usize))
                .help("Maximum softclipped bases at the 5' end, within [1, 100]"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let filter = FivePrimeFilter::new(*args.get_one::<usize>("max-softclip").unwrap())?;
    let outputs = filter_outputs(args)?;

    let counts = filter_alignments(infile, &outputs, |read| filter.classify(read))?;
    log::info!(
        "Five-prime filter (max softclip {}): {}",
        filter.max_softclip(),
        counts
    );

    Ok(())
}
