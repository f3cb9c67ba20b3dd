use crate::libs::error::SiteError;
use crate::libs::natural::natural_key;
use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn symbol(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

impl FromStr for Strand {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(SiteError::Format(format!(
                "unrecognized strand symbol '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

//----------------------------
// Site
//----------------------------
/// One observed or merged integration site, a BED6 line.
///
/// Fields are only reachable through accessors; a `Site` is validated once
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    chrom: String,
    start: u64,
    end: u64,
    name: String,
    score: u64,
    strand: Strand,
}

impl Site {
    // Immutable accessors
    pub fn chrom(&self) -> &str {
        &self.chrom
    }
    pub fn start(&self) -> u64 {
        self.start
    }
    pub fn end(&self) -> u64 {
        self.end
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn score(&self) -> u64 {
        self.score
    }
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// The single coordinate used for clustering.
    pub fn position(&self) -> u64 {
        self.start
    }

    /// ```
    /// # use isat::libs::bed::{Site, Strand};
    /// let site = Site::new("chr1", 100, 100, ".", 3, Strand::Forward).unwrap();
    /// assert_eq!(site.to_string(), "chr1\t100\t100\t.\t3\t+\n");
    ///
    /// assert!(Site::new("chr1", 100, 100, ".", 0, Strand::Forward).is_err());
    /// assert!(Site::new("", 100, 100, ".", 1, Strand::Forward).is_err());
    /// ```
    pub fn new(
        chrom: &str,
        start: u64,
        end: u64,
        name: &str,
        score: u64,
        strand: Strand,
    ) -> Result<Self, SiteError> {
        if chrom.is_empty() {
            return Err(SiteError::Validation("empty chromosome".to_string()));
        }
        if name.is_empty() {
            return Err(SiteError::Validation("empty name".to_string()));
        }
        if score < 1 {
            return Err(SiteError::Validation(format!(
                "score must be at least 1, got {}",
                score
            )));
        }

        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end,
            name: name.to_string(),
            score,
            strand,
        })
    }

    /// A zero-width site at `position`.
    pub fn point(
        chrom: &str,
        position: u64,
        name: &str,
        score: u64,
        strand: Strand,
    ) -> Result<Self, SiteError> {
        Self::new(chrom, position, position, name, score, strand)
    }
}

/// Parses a non-negative integer field; the sign is checked apart from the
/// digits so the whole `u64` range is accepted.
fn parse_number(field: &str, what: &str) -> Result<u64, SiteError> {
    let value = field
        .parse::<i128>()
        .map_err(|_| SiteError::Format(format!("non-numeric {} '{}'", what, field)))?;
    if value < 0 {
        return Err(SiteError::Validation(format!(
            "{} must not be negative, got {}",
            what, value
        )));
    }
    u64::try_from(value)
        .map_err(|_| SiteError::Validation(format!("{} out of range, got {}", what, value)))
}

impl FromStr for Site {
    type Err = SiteError;

    /// Parses one BED6 line. Fields past the sixth are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('\t').collect();
        if fields.len() < 6 {
            return Err(SiteError::Format(format!(
                "expected 6 tab-separated fields, found {}",
                fields.len()
            )));
        }

        let start = parse_number(fields[1], "start")?;
        let end = parse_number(fields[2], "end")?;
        let score = parse_number(fields[4], "score")?;
        let strand = Strand::from_str(fields[5])?;

        Site::new(fields[0], start, end, fields[3], score, strand)
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom, self.start, self.end, self.name, self.score, self.strand
        )
    }
}

/// Reads every site from `reader`. Blank lines and `#` comments are skipped;
/// the first bad line aborts the whole read.
pub fn read_sites<R: BufRead>(reader: R) -> Result<Vec<Site>, SiteError> {
    let mut sites = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let site = Site::from_str(line).map_err(|e| e.at_line(i + 1))?;
        sites.push(site);
    }

    Ok(sites)
}

//----------------------------
// Sorting
//----------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    /// Natural chromosome order, then start, then strand
    Position,
    /// Highest score first
    Score,
}

impl FromStr for SortBy {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "position" => Ok(SortBy::Position),
            "score" => Ok(SortBy::Score),
            _ => Err(SiteError::Configuration(format!(
                "unknown sort key '{}'",
                s
            ))),
        }
    }
}

/// Stable sort of `sites`.
pub fn sort_sites(sites: &mut [Site], by: SortBy) {
    match by {
        SortBy::Position => {
            sites.sort_by_cached_key(|s| (natural_key(&s.chrom), s.start, s.strand))
        }
        SortBy::Score => sites.sort_by(|a, b| b.score.cmp(&a.score)),
    }
}
