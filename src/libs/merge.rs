//! Chained-distance clustering of integration sites.
//!
//! Sites on the same chromosome and strand are absorbed into a cluster while
//! each new site lies within `distance` of the most recently absorbed one, so
//! a cluster may drift further than `distance` from its seed. A closed
//! cluster becomes one site whose score is the cluster total and whose
//! position is the median of the best-scoring members.

use crate::libs::bed::{Site, Strand};
use crate::libs::error::SiteError;
use crate::libs::natural::natural_key;
use indexmap::IndexMap;
use itertools::Itertools;
use rayon::prelude::*;
use std::collections::VecDeque;
use std::str::FromStr;

pub const DEFAULT_DISTANCE: u64 = 5;
pub const MAX_DISTANCE: u64 = 100;

/// How the representative of a cluster is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Median position among the records sharing the top score
    #[default]
    Median,
}

impl FromStr for MergeMode {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "median" => Ok(MergeMode::Median),
            _ => Err(SiteError::UnsupportedMode(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    pub distance: u64,
    pub mode: MergeMode,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            distance: DEFAULT_DISTANCE,
            mode: MergeMode::Median,
        }
    }
}

impl MergeOptions {
    /// ```
    /// # use isat::libs::merge::{MergeMode, MergeOptions};
    /// let opts = MergeOptions::new(10, MergeMode::Median).unwrap();
    /// assert_eq!(opts.distance, 10);
    /// assert!(MergeOptions::new(101, MergeMode::Median).is_err());
    /// ```
    pub fn new(distance: u64, mode: MergeMode) -> Result<Self, SiteError> {
        let opts = Self { distance, mode };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<(), SiteError> {
        if self.distance > MAX_DISTANCE {
            return Err(SiteError::Configuration(format!(
                "distance must be within [0, {}], got {}",
                MAX_DISTANCE, self.distance
            )));
        }
        Ok(())
    }
}

pub type GroupKey = (String, Strand);

/// Orders sites for merging: natural chromosome order, strand, position.
///
/// Chromosome names with equal natural keys (`chr1`, `Chr1`) are kept apart
/// by their raw text.
pub fn sort_for_merge(sites: &mut [Site]) {
    sites.sort_by_cached_key(|s| {
        (
            natural_key(s.chrom()),
            s.chrom().to_string(),
            s.strand(),
            s.position(),
        )
    });
}

/// Partitions sorted sites into (chromosome, strand) groups.
///
/// Keys keep the order in which they first appear; records keep their
/// relative order. Callers are expected to pass sites where every group is
/// contiguous.
pub fn group_sites(sites: Vec<Site>) -> IndexMap<GroupKey, Vec<Site>> {
    let mut groups: IndexMap<GroupKey, Vec<Site>> = IndexMap::new();

    for (key, run) in &sites
        .into_iter()
        .chunk_by(|s| (s.chrom().to_string(), s.strand()))
    {
        groups.entry(key).or_default().extend(run);
    }

    groups
}

//----------------------------
// Cluster
//----------------------------
/// Running state of one cluster while it absorbs sites.
#[derive(Debug)]
struct Cluster {
    running: u64,
    total_score: u64,
    max_score: u64,
    leaders: Vec<Site>,
}

impl Cluster {
    fn seed(site: Site) -> Self {
        Self {
            running: site.position(),
            total_score: site.score(),
            max_score: site.score(),
            leaders: vec![site],
        }
    }

    fn reaches(&self, site: &Site, distance: u64) -> bool {
        site.position().abs_diff(self.running) <= distance
    }

    fn absorb(&mut self, site: Site) -> Result<(), SiteError> {
        self.total_score = self.total_score.checked_add(site.score()).ok_or_else(|| {
            SiteError::Validation(format!(
                "cluster score overflows at {}:{}",
                site.chrom(),
                site.position()
            ))
        })?;
        self.running = site.position();

        if site.score() > self.max_score {
            self.max_score = site.score();
            self.leaders.clear();
            self.leaders.push(site);
        } else if site.score() == self.max_score {
            self.leaders.push(site);
        }

        Ok(())
    }

    /// Collapses into one zero-width site.
    ///
    /// The representative position is `positions[len / 2]` of the sorted
    /// leader positions; with two leaders this is the later one.
    fn close(self) -> Result<Site, SiteError> {
        let positions: Vec<u64> = self.leaders.iter().map(|s| s.position()).sorted().collect();
        let median = positions[positions.len() / 2];

        let representative = self
            .leaders
            .iter()
            .find(|s| s.position() == median)
            .unwrap_or(&self.leaders[0]);

        Site::point(
            representative.chrom(),
            median,
            representative.name(),
            self.total_score,
            representative.strand(),
        )
    }
}

/// Clusters one (chromosome, strand) group.
///
/// The pool is rescanned from its front after every absorption and the
/// first site in reach wins. On a position-sorted pool only the front can
/// be in reach, which keeps the common case linear.
pub fn cluster_group(sites: Vec<Site>, distance: u64) -> Result<Vec<Site>, SiteError> {
    let sorted = sites
        .windows(2)
        .all(|w| w[0].position() <= w[1].position());
    let mut pool: VecDeque<Site> = sites.into();
    let mut merged = Vec::new();

    while let Some(seed) = pool.pop_front() {
        let mut cluster = Cluster::seed(seed);

        loop {
            let next = if sorted {
                pool.front()
                    .filter(|s| cluster.reaches(s, distance))
                    .map(|_| 0)
            } else {
                pool.iter().position(|s| cluster.reaches(s, distance))
            };

            match next.and_then(|idx| pool.remove(idx)) {
                Some(site) => cluster.absorb(site)?,
                None => break,
            }
        }

        merged.push(cluster.close()?);
    }

    Ok(merged)
}

/// Merges pre-sorted sites.
///
/// Options are checked before any record is touched. Groups are clustered
/// independently, possibly in parallel, and concatenated in group order.
///
/// ```
/// # use isat::libs::bed::{Site, Strand};
/// # use isat::libs::merge::{merge, MergeOptions};
/// let sites = vec![
///     Site::point("chr1", 100, "a", 1, Strand::Forward).unwrap(),
///     Site::point("chr1", 101, "b", 2, Strand::Forward).unwrap(),
///     Site::point("chr1", 200, "c", 1, Strand::Forward).unwrap(),
/// ];
/// let merged = merge(sites, &MergeOptions::default()).unwrap();
/// assert_eq!(merged.len(), 2);
/// assert_eq!(merged[0].to_string(), "chr1\t101\t101\tb\t3\t+\n");
/// assert_eq!(merged[1].to_string(), "chr1\t200\t200\tc\t1\t+\n");
/// ```
pub fn merge(sites: Vec<Site>, opts: &MergeOptions) -> Result<Vec<Site>, SiteError> {
    opts.validate()?;

    let groups = group_sites(sites);
    log::debug!("Clustering {} chromosome/strand groups", groups.len());

    let distance = opts.distance;
    let clustered = groups
        .into_iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(_, group)| cluster_group(group, distance))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(clustered.into_iter().flatten().collect())
}
