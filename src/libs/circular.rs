//! Rotating an integration vector around its pair of FRT sites.
//!
//! The region between the two sites is split in half and the vector is
//! re-joined as `right half + FRT + left half`, so the FRT lands in the
//! middle of the reported sequence.

use anyhow::bail;
use bio::pattern_matching::myers::long::Myers;
use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

pub const EXPECTED_FRT_SITES: usize = 2;
pub const MAX_ALLOWED_ERRORS: usize = 5;

lazy_static! {
    static ref NUCLEOTIDES: Regex = Regex::new(r"^[ACGTNacgtn]+$").unwrap();
}

/// A motif occurrence, `[start, end)` on the searched sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub start: usize,
    pub end: usize,
    pub edits: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Forward,
    Revcomp,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Forward => write!(f, "forward"),
            Orientation::Revcomp => write!(f, "revcomp"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircularizeOptions {
    frt: Vec<u8>,
    allowed_errors: usize,
}

impl CircularizeOptions {
    pub fn new(frt: &str, allowed_errors: usize) -> anyhow::Result<Self> {
        if !NUCLEOTIDES.is_match(frt) {
            bail!("FRT sequence must only contain A, C, G, T or N: '{}'", frt);
        }
        if allowed_errors > MAX_ALLOWED_ERRORS {
            bail!(
                "Allowed errors must be within [0, {}], got {}",
                MAX_ALLOWED_ERRORS,
                allowed_errors
            );
        }
        if frt.len() <= allowed_errors {
            bail!(
                "FRT sequence of length {} cannot allow {} errors",
                frt.len(),
                allowed_errors
            );
        }

        Ok(Self {
            frt: frt.to_ascii_uppercase().into_bytes(),
            allowed_errors,
        })
    }

    pub fn frt(&self) -> &[u8] {
        &self.frt
    }

    pub fn allowed_errors(&self) -> usize {
        self.allowed_errors
    }
}

/// Non-overlapping occurrences of `pattern` in `seq` with at most
/// `max_edits` substitutions, insertions or deletions, scanned left to right.
///
/// Each hit is the one starting leftmost, even when that pulls a flanking
/// base in as an insertion.
///
/// ```
/// # use isat::libs::circular::find_hits;
/// let hits = find_hits(b"TTTTTTCCTAAAACCTGGGGG", b"CCT", 0);
/// let spans: Vec<(usize, usize)> = hits.iter().map(|h| (h.start, h.end)).collect();
/// assert_eq!(spans, vec![(6, 9), (13, 16)]);
///
/// let hits = find_hits(b"TTTTTTCCTAAAACCTGGGGG", b"CCT", 1);
/// let spans: Vec<(usize, usize)> = hits.iter().map(|h| (h.start, h.end)).collect();
/// assert_eq!(spans, vec![(5, 9), (12, 16)]);
/// ```
pub fn find_hits(seq: &[u8], pattern: &[u8], max_edits: usize) -> Vec<Hit> {
    let mut hits = Vec::new();
    if pattern.is_empty() || max_edits >= pattern.len() {
        return hits;
    }

    // On the reversed sequence a match start becomes a match end, and the
    // last end reported is the leftmost start.
    let mut myers = Myers::<u64>::new(pattern.iter().rev());

    let mut cursor = 0;
    while cursor < seq.len() {
        let rest: Vec<u8> = seq[cursor..].iter().rev().copied().collect();
        let leftmost = myers.find_all(rest.iter(), max_edits).last();

        match leftmost {
            Some((rev_start, rev_end, edits)) => {
                let hit = Hit {
                    start: cursor + rest.len() - rev_end,
                    end: cursor + rest.len() - rev_start,
                    edits,
                };
                hits.push(hit);
                cursor = hit.end;
            }
            None => break,
        }
    }

    hits
}

/// Picks the strand carrying exactly two FRT sites.
pub fn check_orientation(forward: usize, revcomp: usize) -> anyhow::Result<Orientation> {
    if forward != EXPECTED_FRT_SITES && revcomp != EXPECTED_FRT_SITES {
        bail!(
            "Expected 2 FRT sites on either the forward or reverse strand, \
             found {} forward and {} reverse.",
            forward,
            revcomp
        );
    }
    if (forward == EXPECTED_FRT_SITES && revcomp > 0)
        || (revcomp == EXPECTED_FRT_SITES && forward > 0)
    {
        bail!(
            "FRT sites must be either on the forward or reverse strand, \
             found {} forward and {} reverse.",
            forward,
            revcomp
        );
    }

    if forward == EXPECTED_FRT_SITES {
        Ok(Orientation::Forward)
    } else {
        Ok(Orientation::Revcomp)
    }
}

/// Locates both FRT sites, on the forward strand or as reverse complements.
pub fn find_frt_sites(
    seq: &[u8],
    opts: &CircularizeOptions,
) -> anyhow::Result<(Hit, Hit, Orientation)> {
    let forward = find_hits(seq, opts.frt(), opts.allowed_errors());
    let rc_frt = bio::alphabets::dna::revcomp(opts.frt());
    let revcomp = find_hits(seq, &rc_frt, opts.allowed_errors());

    let orientation = check_orientation(forward.len(), revcomp.len())?;
    log::debug!(
        "FRT hits: {} forward, {} revcomp; using {}",
        forward.len(),
        revcomp.len(),
        orientation
    );

    let hits = match orientation {
        Orientation::Forward => forward,
        Orientation::Revcomp => revcomp,
    };
    Ok((hits[0], hits[1], orientation))
}

/// Returns the rotated sequence and the orientation of the FRT sites.
///
/// ```
/// # use isat::libs::circular::{circularize, CircularizeOptions, Orientation};
/// let opts = CircularizeOptions::new("CCT", 0).unwrap();
/// let (seq, orientation) = circularize(b"TTTTTTCCTAAAACCTGGGGG", &opts).unwrap();
/// assert_eq!(seq, b"AACCTAA".to_vec());
/// assert_eq!(orientation, Orientation::Forward);
/// ```
pub fn circularize(
    seq: &[u8],
    opts: &CircularizeOptions,
) -> anyhow::Result<(Vec<u8>, Orientation)> {
    let seq = seq.to_ascii_uppercase();
    let (left, right, orientation) = find_frt_sites(&seq, opts)?;

    let internal = &seq[left.end..right.start];
    let midpoint = internal.len() / 2;
    let (left_half, right_half) = internal.split_at(midpoint);

    let mut rotated = Vec::with_capacity(internal.len() + (left.end - left.start));
    rotated.extend_from_slice(right_half);
    rotated.extend_from_slice(&seq[left.start..left.end]);
    rotated.extend_from_slice(left_half);

    Ok((rotated, orientation))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTOR: &[u8] = b"TTTTTTCCTAAAACCTGGGGG";

    fn err_of(seq: &[u8], frt: &str) -> String {
        let opts = CircularizeOptions::new(frt, 0).unwrap();
        circularize(seq, &opts).unwrap_err().to_string()
    }

    #[test]
    fn test_options() {
        assert!(CircularizeOptions::new("acgtn", 0).is_ok());
        assert!(CircularizeOptions::new("", 0).is_err());
        assert!(CircularizeOptions::new("ACGU", 0).is_err());
        assert!(CircularizeOptions::new("ACGTACGT", 6).is_err());
        assert!(CircularizeOptions::new("ACG", 3).is_err());
        assert_eq!(CircularizeOptions::new("acgt", 1).unwrap().frt(), b"ACGT");
    }

    #[test]
    fn test_forward() {
        let opts = CircularizeOptions::new("CCT", 0).unwrap();
        let (seq, orientation) = circularize(VECTOR, &opts).unwrap();
        assert_eq!(String::from_utf8(seq).unwrap(), "AACCTAA");
        assert_eq!(orientation, Orientation::Forward);
    }

    #[test]
    fn test_revcomp() {
        let opts = CircularizeOptions::new("AGG", 0).unwrap();
        let (seq, orientation) = circularize(VECTOR, &opts).unwrap();
        assert_eq!(String::from_utf8(seq).unwrap(), "AACCTAA");
        assert_eq!(orientation, Orientation::Revcomp);
        assert_eq!(orientation.to_string(), "revcomp");
    }

    #[test]
    fn test_lowercase_input() {
        let opts = CircularizeOptions::new("cct", 0).unwrap();
        let (seq, _) = circularize(b"ttttttcctaaaacctggggg", &opts).unwrap();
        assert_eq!(seq, b"AACCTAA".to_vec());
    }

    #[test]
    fn test_wrong_site_counts() {
        assert!(err_of(VECTOR, "CCC").starts_with("Expected 2 FRT sites"));
        assert!(err_of(b"TTTTTTCCTAAAACCCGGGGG", "CCT").starts_with("Expected 2 FRT sites"));
        assert!(err_of(b"TTTTTTCCTAAAACCTGGGGGCCT", "CCT").starts_with("Expected 2 FRT sites"));
        assert!(err_of(b"TTTTTTCCTAAAACCCGGGGG", "AGG").starts_with("Expected 2 FRT sites"));
        assert!(err_of(b"TTTTTTCCTAAAAAGGGGGGG", "CCT").starts_with("Expected 2 FRT sites"));
    }

    #[test]
    fn test_mixed_strands() {
        assert!(check_orientation(2, 1)
            .unwrap_err()
            .to_string()
            .starts_with("FRT sites must be either"));
        assert!(check_orientation(1, 2).is_err());
        assert_eq!(check_orientation(2, 0).unwrap(), Orientation::Forward);
        assert_eq!(check_orientation(0, 2).unwrap(), Orientation::Revcomp);
    }

    #[test]
    fn test_fuzzy_hits() {
        // a flanking G is taken in as an insertion
        let seq = b"GGGGACGTTCCCCCCACCTTGGGG";
        assert_eq!(find_hits(seq, b"ACGTT", 0).len(), 1);
        let hits = find_hits(seq, b"ACGTT", 1);
        assert_eq!(hits.len(), 2);
        assert_eq!((hits[0].start, hits[0].end, hits[0].edits), (3, 9, 1));
        assert_eq!((hits[1].start, hits[1].end, hits[1].edits), (15, 20, 1));
    }

    #[test]
    fn test_fuzzy_leftmost_start() {
        let hits = find_hits(VECTOR, b"CCT", 1);
        let spans: Vec<(usize, usize)> = hits.iter().map(|h| (h.start, h.end)).collect();
        assert_eq!(spans, vec![(5, 9), (12, 16)]);

        // with one edit, any GG also matches AGG
        let hits = find_hits(VECTOR, b"AGG", 1);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].start, 15);
        assert_eq!(hits[1].start, 18);

        let opts = CircularizeOptions::new("CCT", 1).unwrap();
        let err = circularize(VECTOR, &opts).unwrap_err().to_string();
        assert!(err.starts_with("FRT sites must be either"));
    }

    #[test]
    fn test_frt_absorbs_flanking_base() {
        let frt = "GAAGTTCCTATTCTCTAGAAAGTATAGGAACTTC";
        let vector = format!("CCCCT{}AAAAACCCCCGGGGGT{}CCCC", frt, frt);

        let hits = find_hits(vector.as_bytes(), frt.as_bytes(), 1);
        let spans: Vec<(usize, usize)> = hits.iter().map(|h| (h.start, h.end)).collect();
        assert_eq!(spans, vec![(4, 39), (54, 89)]);

        let opts = CircularizeOptions::new(frt, 1).unwrap();
        let (seq, orientation) = circularize(vector.as_bytes(), &opts).unwrap();
        assert_eq!(
            String::from_utf8(seq).unwrap(),
            format!("CCCGGGGGT{}AAAAACC", frt)
        );
        assert_eq!(orientation, Orientation::Forward);
    }
}
