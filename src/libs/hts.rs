//! SAM/BAM reading and writing on `noodles`.

use crate::libs::sam::{FilterCounts, ReadDescriptor, Verdict};
use anyhow::{anyhow, bail};
use noodles::bam;
use noodles::bgzf;
use noodles::sam;
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::io::Write as _;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::RecordBuf;
use std::io::BufRead;
use std::str::FromStr;

const ALT_TAG: Tag = Tag::new(b'X', b'A');
const SUP_TAG: Tag = Tag::new(b'S', b'A');

const BGZF_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub type AlignmentWriter = Box<dyn sam::alignment::io::Write>;
pub type RecordBufs = Box<dyn Iterator<Item = std::io::Result<RecordBuf>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Sam,
    Bam,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sam" => Ok(OutputFormat::Sam),
            "bam" => Ok(OutputFormat::Bam),
            _ => Err(anyhow!("unknown alignment format '{}'", s)),
        }
    }
}

/// Output paths must be stdout or carry a `.sam`/`.bam` extension.
pub fn check_alignment_path(path: &str) -> anyhow::Result<()> {
    if path == "-" || path == "stdin" || path == "stdout" {
        return Ok(());
    }

    let ext = std::path::Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
        Some("sam") | Some("bam") => Ok(()),
        _ => bail!("File {} is not a SAM/BAM file", path),
    }
}

/// Opens SAM or BAM input, telling them apart by the BGZF magic bytes.
pub fn open_alignments(input: &str) -> anyhow::Result<(sam::Header, RecordBufs)> {
    let mut inner = crate::reader(input)?;
    let is_bam = inner.fill_buf()?.starts_with(&BGZF_MAGIC);

    if is_bam {
        let mut reader = bam::io::Reader::new(inner);
        let header = reader.read_header()?;
        let record_header = header.clone();
        let records = std::iter::from_fn(move || {
            let mut record = RecordBuf::default();
            match reader.read_record_buf(&record_header, &mut record) {
                Ok(0) => None,
                Ok(_) => Some(Ok(record)),
                Err(e) => Some(Err(e)),
            }
        });
        Ok((header, Box::new(records)))
    } else {
        let mut reader = sam::io::Reader::new(inner);
        let header = reader.read_header()?;
        let record_header = header.clone();
        let records = std::iter::from_fn(move || {
            let mut record = RecordBuf::default();
            match reader.read_record_buf(&record_header, &mut record) {
                Ok(0) => None,
                Ok(_) => Some(Ok(record)),
                Err(e) => Some(Err(e)),
            }
        });
        Ok((header, Box::new(records)))
    }
}

/// Creates a SAM or BAM writer; `uncompressed` stores BAM in level-0 BGZF blocks.
pub fn create_writer(
    output: &str,
    format: OutputFormat,
    uncompressed: bool,
) -> anyhow::Result<AlignmentWriter> {
    let inner = crate::writer(output)?;

    let writer: AlignmentWriter = match format {
        OutputFormat::Sam => Box::new(sam::io::Writer::new(inner)),
        OutputFormat::Bam if uncompressed => {
            let encoder = bgzf::writer::Builder::default()
                .set_compression_level(bgzf::writer::CompressionLevel::NONE)
                .build_from_writer(inner);
            Box::new(bam::io::Writer::from(encoder))
        }
        OutputFormat::Bam => Box::new(bam::io::Writer::new(inner)),
    };

    Ok(writer)
}

/// Extracts the attributes the read rules need from a `noodles` record.
pub fn describe(header: &sam::Header, record: &RecordBuf) -> ReadDescriptor {
    let flags = record.flags();

    let reference_name = record
        .reference_sequence_id()
        .and_then(|id| header.reference_sequences().get_index(id))
        .map(|(name, _)| name.to_string());

    let ops = record.cigar().as_ref();
    let softclips = if ops.is_empty() {
        None
    } else {
        let clip = |kind: Kind, len: usize| if kind == Kind::SoftClip { len } else { 0 };
        let leading = ops.first().map_or(0, |op| clip(op.kind(), op.len()));
        let trailing = ops.last().map_or(0, |op| clip(op.kind(), op.len()));
        Some((leading, trailing))
    };

    ReadDescriptor {
        is_unmapped: flags.is_unmapped(),
        is_read1: flags.is_first_segment(),
        is_read2: flags.is_last_segment(),
        is_reverse: flags.is_reverse_complemented(),
        reference_name,
        reference_start: record.alignment_start().map(|p| p.get() as u64 - 1),
        reference_end: record.alignment_end().map(|p| p.get() as u64),
        has_alt: record.data().get(&ALT_TAG).is_some(),
        has_sup: record.data().get(&SUP_TAG).is_some(),
        softclips,
    }
}

/// Where a filtering run writes its records.
#[derive(Debug, Clone)]
pub struct FilterOutputs {
    pub outfile: String,
    pub discarded: Option<String>,
    pub format: OutputFormat,
    pub uncompressed: bool,
}

/// Streams `input` through `classify`, copying the input header to every
/// output. Discarded reads go to the discard output when there is one.
pub fn filter_alignments<F>(
    input: &str,
    outputs: &FilterOutputs,
    classify: F,
) -> anyhow::Result<FilterCounts>
where
    F: Fn(&ReadDescriptor) -> Verdict,
{
    check_alignment_path(&outputs.outfile)?;
    if let Some(path) = &outputs.discarded {
        check_alignment_path(path)?;
    }

    let (header, records) = open_alignments(input)?;

    let mut writer = create_writer(&outputs.outfile, outputs.format, outputs.uncompressed)?;
    writer.write_alignment_header(&header)?;
    let mut discard_writer = match &outputs.discarded {
        Some(path) => {
            let mut w = create_writer(path, outputs.format, outputs.uncompressed)?;
            w.write_alignment_header(&header)?;
            Some(w)
        }
        None => None,
    };

    let mut counts = FilterCounts::default();
    for result in records {
        let record = result?;
        let verdict = classify(&describe(&header, &record));
        counts.record(verdict);

        match verdict {
            Verdict::Keep => writer.write_alignment_record(&header, &record)?,
            Verdict::Discard => {
                if let Some(w) = discard_writer.as_mut() {
                    w.write_alignment_record(&header, &record)?;
                }
            }
            Verdict::Drop => {}
        }
    }

    writer.finish(&header)?;
    if let Some(mut w) = discard_writer {
        w.finish(&header)?;
    }

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::sam::AltSupFilter;
    use noodles::sam::alignment::io::Write as _;
    use std::io::Write;

    const SAM_HEADER: &str = "@HD\tVN:1.6\tSO:coordinate\n@SQ\tSN:chr1\tLN:1000\n";

    fn read_all(content: &str) -> (sam::Header, Vec<ReadDescriptor>) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let (header, records) = open_alignments(&path).unwrap();
        let reads = records
            .map(|r| describe(&header, &r.unwrap()))
            .collect::<Vec<_>>();
        (header, reads)
    }

    #[test]
    fn test_check_alignment_path() {
        assert!(check_alignment_path("stdout").is_ok());
        assert!(check_alignment_path("-").is_ok());
        assert!(check_alignment_path("out.sam").is_ok());
        assert!(check_alignment_path("out.BAM").is_ok());
        assert!(check_alignment_path("out.bed").is_err());
        assert!(check_alignment_path("out").is_err());
    }

    #[test]
    fn test_output_format() {
        assert_eq!(OutputFormat::from_str("SAM").unwrap(), OutputFormat::Sam);
        assert_eq!(OutputFormat::from_str("bam").unwrap(), OutputFormat::Bam);
        assert!(OutputFormat::from_str("cram").is_err());
    }

    #[test]
    fn test_describe_forward() {
        let content = format!(
            "{}read1\t64\tchr1\t100\t60\t2S5M3S\t*\t0\t0\tAGCTTAGCTT\t*\tXA:Z:*\n",
            SAM_HEADER
        );
        let (_, reads) = read_all(&content);
        assert_eq!(reads.len(), 1);

        let read = &reads[0];
        assert!(read.is_read1);
        assert!(!read.is_read2);
        assert!(!read.is_reverse);
        assert!(!read.is_unmapped);
        assert_eq!(read.reference_name.as_deref(), Some("chr1"));
        assert_eq!(read.reference_start, Some(99));
        assert_eq!(read.reference_end, Some(104));
        assert!(read.has_alt);
        assert!(!read.has_sup);
        assert_eq!(read.softclips, Some((2, 3)));
    }

    #[test]
    fn test_describe_reverse_read2() {
        let content = format!(
            "{}read1\t144\tchr1\t100\t60\t5M\t*\t0\t0\tAGCTT\t*\tSA:Z:*\n",
            SAM_HEADER
        );
        let (_, reads) = read_all(&content);
        let read = &reads[0];
        assert!(!read.is_read1);
        assert!(read.is_read2);
        assert!(read.is_reverse);
        assert!(read.has_sup);
        assert_eq!(read.softclips, Some((0, 0)));
    }

    #[test]
    fn test_describe_unmapped() {
        let content = format!("{}read1\t68\t*\t0\t0\t*\t*\t0\t0\tAGCTT\t*\n", SAM_HEADER);
        let (_, reads) = read_all(&content);
        let read = &reads[0];
        assert!(read.is_unmapped);
        assert_eq!(read.reference_name, None);
        assert_eq!(read.reference_start, None);
        assert_eq!(read.softclips, None);
    }

    #[test]
    fn test_bam_round_trip() {
        let content = format!(
            "{}read1\t64\tchr1\t100\t60\t5M\t*\t0\t0\tAGCTT\t*\n",
            SAM_HEADER
        );
        let mut sam_file = tempfile::NamedTempFile::new().unwrap();
        sam_file.write_all(content.as_bytes()).unwrap();
        sam_file.flush().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let bam_path = dir.path().join("out.bam");
        let bam_path = bam_path.to_str().unwrap();

        let (header, records) = open_alignments(sam_file.path().to_str().unwrap()).unwrap();
        let mut writer = create_writer(bam_path, OutputFormat::Bam, false).unwrap();
        writer.write_alignment_header(&header).unwrap();
        for record in records {
            writer
                .write_alignment_record(&header, &record.unwrap())
                .unwrap();
        }
        writer.finish(&header).unwrap();
        drop(writer);

        let (header, records) = open_alignments(bam_path).unwrap();
        let reads = records
            .map(|r| describe(&header, &r.unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(reads.len(), 1);
        assert_eq!(reads[0].reference_start, Some(99));
    }

    #[test]
    fn test_filter_alignments() {
        let content = format!(
            "{}keep\t64\tchr1\t100\t60\t5M\t*\t0\t0\tAGCTT\t*\n\
             alt\t64\tchr1\t200\t60\t5M\t*\t0\t0\tAGCTT\t*\tXA:Z:*\n",
            SAM_HEADER
        );
        let mut sam_file = tempfile::NamedTempFile::new().unwrap();
        sam_file.write_all(content.as_bytes()).unwrap();
        sam_file.flush().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let outputs = FilterOutputs {
            outfile: dir.path().join("pass.sam").to_str().unwrap().to_string(),
            discarded: Some(dir.path().join("fail.sam").to_str().unwrap().to_string()),
            format: OutputFormat::Sam,
            uncompressed: false,
        };
        let filter = AltSupFilter::default();
        let counts = filter_alignments(
            sam_file.path().to_str().unwrap(),
            &outputs,
            |read| filter.classify(read),
        )
        .unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.passing, 1);
        assert_eq!(counts.discarded, 1);

        let pass = std::fs::read_to_string(&outputs.outfile).unwrap();
        assert!(pass.starts_with("@HD"));
        assert!(pass.contains("keep\t"));
        assert!(!pass.contains("alt\t"));
        let fail = std::fs::read_to_string(outputs.discarded.as_ref().unwrap()).unwrap();
        assert!(fail.contains("alt\t"));
    }

    #[test]
    fn test_filter_rejects_bad_output_path() {
        let outputs = FilterOutputs {
            outfile: "pass.txt".to_string(),
            discarded: None,
            format: OutputFormat::Sam,
            uncompressed: false,
        };
        let err = filter_alignments("stdin", &outputs, |_| Verdict::Keep).unwrap_err();
        assert_eq!(err.to_string(), "File pass.txt is not a SAM/BAM file");
    }
}
