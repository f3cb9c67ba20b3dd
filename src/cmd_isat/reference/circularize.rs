use anyhow::bail;
use clap::*;
use isat::libs::circular::{circularize, CircularizeOptions};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("circularize")
        .about("Rotates a vector sequence around its FRT sites")
        .after_help(
            r###"
The input holds exactly one FASTA record with two FRT sites, both on the
forward strand or both reverse complemented. The sequence between the sites
is cut in half and re-joined around the first FRT:

    right half + FRT + left half

The FRT search tolerates up to --allowed-errors substitutions, insertions or
deletions (at most 5).

Output is one record named `<id>_circularized` with the description
`FRT_site_orientation: forward|revcomp`.

Examples:
1. Rotate a vector on the FRT core:
   isat ref circularize vector.fa -s GAAGTTCCTATTCTCTAGAAAGTATAGGAACTTC -o circ.fa

2. Allow one mismatch:
   isat ref circularize vector.fa -s GAAGTTCCTATTCTCTAGAAAGTATAGGAACTTC -e 1

"###,
        )
        .arg(
            Arg::new("infile")
                .index(1)
                .num_args(1)
                .default_value("stdin")
                .help("Input FASTA file. [stdin] for standard input"),
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
            Arg::new("frt")
                .long("frt")
                .short('s')
                .num_args(1)
                .required(true)
                .help("FRT site sequence"),
        )
        .arg(
            Arg::new("allowed-errors")
                .long("allowed-errors")
                .short('e')
                .num_args(1)
                .default_value("0")
                .value_parser(value_parser!(usize))
                .help("Edits allowed when matching the FRT, within [0, 5]"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let opts = CircularizeOptions::new(
        args.get_one::<String>("frt").unwrap(),
        *args.get_one::<usize>("allowed-errors").unwrap(),
    )?;

    let reader = isat::reader(args.get_one::<String>("infile").unwrap())?;
    let mut fa_in = noodles::fasta::io::Reader::new(reader);

    //----------------------------
    // Ops
    //----------------------------
    let mut records = Vec::new();
    for result in fa_in.records() {
        records.push(result?);
    }
    if records.len() != 1 {
        bail!("Input file must contain exactly one FASTA record.");
    }

    let record = &records[0];
    let name = String::from_utf8(record.name().into())?;
    let (seq, orientation) = circularize(record.sequence().as_ref(), &opts)?;

    //----------------------------
    // Output
    //----------------------------
    let mut writer = isat::writer(args.get_one::<String>("outfile").unwrap())?;
    writer.write_fmt(format_args!(
        ">{}_circularized FRT_site_orientation: {}\n",
        name, orientation
    ))?;
    writer.write_all(&seq)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    log::info!(
        "Circularized {} ({} bp -> {} bp, {})",
        name,
        record.sequence().len(),
        seq.len(),
        orientation
    );

    Ok(())
}
