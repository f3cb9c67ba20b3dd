use clap::*;
use isat::libs::hts::{filter_alignments, FilterOutputs, OutputFormat};
use isat::libs::sam::AltSupFilter;
use std::str::FromStr;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("mapping-filter")
        .about("Removes reads with alternative or supplementary alignments")
        .after_help(
            r###"
A read is rejected when it carries an XA tag (alternative hits) or an SA tag
(supplementary alignment). Either check can be switched off.

The input may be SAM or BAM; BAM is recognized by its BGZF magic bytes.
Output files other than stdout must end in .sam or .bam.

Examples:
1. Keep uniquely placed reads, saving the rejected ones:
   isat sam mapping-filter in.bam -f bam -o pass.bam -d fail.bam

2. Only filter supplementary alignments, writing SAM to screen:
   isat sam mapping-filter in.sam -f sam --no-alt-filtering

"###,
        )
        .args(filter_args())
        .arg(
            Arg::new("no-alt-filtering")
                .long("no-alt-filtering")
                .action(ArgAction::SetTrue)
                .help("Keep reads with alternative hits (XA)"),
        )
        .arg(
            Arg::new("no-sup-filtering")
                .long("no-sup-filtering")
                .action(ArgAction::SetTrue)
                .help("Keep reads with supplementary alignments (SA)"),
        )
}

/// Arguments shared by the read filters.
pub fn filter_args() -> Vec<Arg> {
    vec![
        Arg::new("infile")
            .index(1)
            .num_args(1)
            .default_value("stdin")
            .help("Input SAM/BAM file. [stdin] for standard input"),
        Arg::new("outfile")
            .long("outfile")
            .short('o')
            .num_args(1)
            .default_value("stdout")
            .help("Output filename for passing reads. [stdout] for screen"),
        Arg::new("outfile-format")
            .long("outfile-format")
            .short('f')
            .num_args(1)
            .required(true)
            .value_parser([
                builder::PossibleValue::new("sam"),
                builder::PossibleValue::new("bam"),
            ])
            .help("Output format"),
        Arg::new("uncompressed")
            .long("uncompressed")
            .short('u')
            .action(ArgAction::SetTrue)
            .help("Write uncompressed BAM"),
        Arg::new("discarded-outfile")
            .long("discarded-outfile")
            .short('d')
            .num_args(1)
            .help("Output filename for rejected reads"),
    ]
}

pub fn filter_outputs(args: &ArgMatches) -> anyhow::Result<FilterOutputs> {
    Ok(FilterOutputs {
        outfile: args.get_one::<String>("outfile").unwrap().to_string(),
        discarded: args.get_one::<String>("discarded-outfile").cloned(),
        format: OutputFormat::from_str(args.get_one::<String>("outfile-format").unwrap())?,
        uncompressed: args.get_flag("uncompressed"),
    })
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let infile = args.get_one::<String>("infile").unwrap();
    let outputs = filter_outputs(args)?;

    let filter = AltSupFilter {
        filter_alt: !args.get_flag("no-alt-filtering"),
        filter_sup: !args.get_flag("no-sup-filtering"),
    };

    let counts = filter_alignments(infile, &outputs, |read| filter.classify(read))?;
    log::info!("Mapping filter: {}", counts);

    Ok(())
}
