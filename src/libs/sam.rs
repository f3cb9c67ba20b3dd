//! Per-read rules for integration-site reads.
//!
//! The rules only look at a [`ReadDescriptor`], the handful of alignment
//! attributes they need, so they are independent of how records are read.

use crate::libs::bed::{Site, Strand};
use crate::libs::error::SiteError;
use indexmap::IndexMap;

pub const DEFAULT_MAX_SOFTCLIP: usize = 5;
pub const MAX_SOFTCLIP_LIMIT: usize = 100;

/// Alignment attributes of one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadDescriptor {
    pub is_unmapped: bool,
    pub is_read1: bool,
    pub is_read2: bool,
    pub is_reverse: bool,
    pub reference_name: Option<String>,
    /// 0-based leftmost aligned base
    pub reference_start: Option<u64>,
    /// 0-based, one past the rightmost aligned base
    pub reference_end: Option<u64>,
    /// `XA` tag present
    pub has_alt: bool,
    /// `SA` tag present
    pub has_sup: bool,
    /// Leading and trailing softclip lengths, `None` without a CIGAR
    pub softclips: Option<(usize, usize)>,
}

/// Softclipped bases at the 5' end of the read.
///
/// ```
/// # use isat::libs::sam::{softclipped_bases, ReadDescriptor};
/// let mut read = ReadDescriptor {
///     softclips: Some((3, 7)),
///     ..Default::default()
/// };
/// assert_eq!(softclipped_bases(&read), Some(3));
/// read.is_reverse = true;
/// assert_eq!(softclipped_bases(&read), Some(7));
/// read.softclips = None;
/// assert_eq!(softclipped_bases(&read), None);
/// ```
pub fn softclipped_bases(read: &ReadDescriptor) -> Option<usize> {
    let (leading, trailing) = read.softclips?;
    if read.is_reverse {
        Some(trailing)
    } else {
        Some(leading)
    }
}

/// The 5' reference position of a mapped read 1.
pub fn five_prime_site(read: &ReadDescriptor) -> Option<(&str, u64, Strand)> {
    if read.is_unmapped || read.is_read2 {
        return None;
    }
    let name = read.reference_name.as_deref()?;

    if read.is_reverse {
        let end = read.reference_end?;
        Some((name, end.checked_sub(1)?, Strand::Reverse))
    } else {
        Some((name, read.reference_start?, Strand::Forward))
    }
}

//----------------------------
// Filters
//----------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    /// Rejected, goes to the discard output if there is one
    Discard,
    /// Rejected and written nowhere
    Drop,
}

/// Rejects reads with alternative (`XA`) or supplementary (`SA`) hits.
#[derive(Debug, Clone, Copy)]
pub struct AltSupFilter {
    pub filter_alt: bool,
    pub filter_sup: bool,
}

impl Default for AltSupFilter {
    fn default() -> Self {
        Self {
            filter_alt: true,
            filter_sup: true,
        }
    }
}

impl AltSupFilter {
    pub fn classify(&self, read: &ReadDescriptor) -> Verdict {
        if (self.filter_alt && read.has_alt) || (self.filter_sup && read.has_sup) {
            Verdict::Discard
        } else {
            Verdict::Keep
        }
    }

    pub fn keep(&self, read: &ReadDescriptor) -> bool {
        self.classify(read) == Verdict::Keep
    }
}

/// Rejects read-1 alignments softclipped too far at their 5' end.
#[derive(Debug, Clone, Copy)]
pub struct FivePrimeFilter {
    max_softclip: usize,
}

impl Default for FivePrimeFilter {
    fn default() -> Self {
        Self {
            max_softclip: DEFAULT_MAX_SOFTCLIP,
        }
    }
}

impl FivePrimeFilter {
    pub fn new(max_softclip: usize) -> Result<Self, SiteError> {
        if !(1..=MAX_SOFTCLIP_LIMIT).contains(&max_softclip) {
            return Err(SiteError::Configuration(format!(
                "max softclip must be within [1, {}], got {}",
                MAX_SOFTCLIP_LIMIT, max_softclip
            )));
        }
        Ok(Self { max_softclip })
    }

    pub fn max_softclip(&self) -> usize {
        self.max_softclip
    }

    /// Reads other than read 1 always pass; unmapped read-1s are dropped.
    pub fn classify(&self, read: &ReadDescriptor) -> Verdict {
        if !read.is_read1 {
            return Verdict::Keep;
        }
        if read.is_unmapped {
            return Verdict::Drop;
        }

        match softclipped_bases(read) {
            Some(clipped) if clipped <= self.max_softclip => Verdict::Keep,
            _ => Verdict::Discard,
        }
    }
}

/// Tally of a filtering run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub total: u64,
    pub passing: u64,
    pub discarded: u64,
    pub dropped: u64,
}

impl FilterCounts {
    pub fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Keep => self.passing += 1,
            Verdict::Discard => self.discarded += 1,
            Verdict::Drop => self.dropped += 1,
        }
    }
}

impl std::fmt::Display for FilterCounts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total: {}, passing: {}, discarded: {}, dropped: {}",
            self.total, self.passing, self.discarded, self.dropped
        )
    }
}

//----------------------------
// SiteCounter
//----------------------------
/// Counts read-1 5' positions, keeping sites in first-seen order.
#[derive(Debug, Default)]
pub struct SiteCounter {
    r1_total: u64,
    sites: IndexMap<(String, u64, Strand), u64>,
}

impl SiteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn r1_total(&self) -> u64 {
        self.r1_total
    }

    pub fn add(&mut self, read: &ReadDescriptor) {
        if read.is_unmapped || read.is_read2 {
            return;
        }
        self.r1_total += 1;

        if let Some((name, pos, strand)) = five_prime_site(read) {
            *self
                .sites
                .entry((name.to_string(), pos, strand))
                .or_insert(0) += 1;
        }
    }

    /// One site per distinct position, named `.` and scored by its count.
    pub fn into_sites(self) -> Result<Vec<Site>, SiteError> {
        self.sites
            .into_iter()
            .map(|((name, pos, strand), count)| Site::point(&name, pos, ".", count, strand))
            .collect()
    }
}
