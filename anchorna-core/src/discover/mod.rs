//! Anchor discovery for homologous sequences
//!
//! Discovery runs in rounds. Each round indexes the residues not yet claimed
//! by an anchor, turns words shared by enough sequences into candidates,
//! extends every candidate as far as the extension quota allows and accepts
//! the best non-colliding ones. Rounds that find nothing lower the quota
//! until the add-anchor floor is reached.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::anchor::AnchorSet;
use crate::error::{AnchorError, AnchorResult};
use crate::types::SequenceCollection;

pub mod candidate;
pub mod extend;
pub mod kmer;
pub mod refine;
pub mod space;

#[cfg(test)]
pub mod tests;

pub use candidate::{Candidate, CandidateGenerator};
pub use extend::{Extended, Extender};
pub use kmer::{KmerIndex, Occurrence};
pub use refine::Refinement;
pub use space::{Coverage, SearchSpace};

/// Minimum share of sequences, either as an absolute count or as a fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Quota {
    Count(usize),
    Frac(f64),
}

impl Quota {
    /// Number of sequences out of `n` this quota asks for.
    pub fn resolve(&self, n: usize) -> usize {
        match *self {
            Quota::Count(count) => count,
            // The epsilon keeps 0.8 * 5 from rounding up to 5.
            Quota::Frac(frac) => ((frac * n as f64) - 1e-9).ceil().max(1.0) as usize,
        }
    }

    fn validate(&self, name: &str, n: usize) -> AnchorResult<usize> {
        match *self {
            Quota::Frac(frac) if !(frac > 0.0 && frac <= 1.0) => {
                return Err(AnchorError::InvalidConfiguration(format!(
                    "{name} fraction must lie in (0, 1], got {frac}"
                )));
            }
            Quota::Count(count) if count > n => {
                return Err(AnchorError::InvalidConfiguration(format!(
                    "{name} of {count} sequences exceeds the {n} available"
                )));
            }
            _ => {}
        }
        let resolved = self.resolve(n);
        if resolved < 2 {
            return Err(AnchorError::InvalidConfiguration(format!(
                "{name} {self} must cover at least two sequences (resolves to {resolved} of {n})"
            )));
        }
        Ok(resolved)
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quota::Count(count) => write!(f, "{count}"),
            Quota::Frac(frac) => write!(f, "{frac}"),
        }
    }
}

impl FromStr for Quota {
    type Err = AnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || AnchorError::InvalidConfiguration(format!("invalid quota: {s}"));
        if let Some(percent) = s.strip_suffix('%') {
            let value: f64 = percent.trim().parse().map_err(|_| invalid())?;
            Ok(Quota::Frac(value / 100.0))
        } else if s.contains('.') {
            Ok(Quota::Frac(s.parse().map_err(|_| invalid())?))
        } else {
            Ok(Quota::Count(s.parse().map_err(|_| invalid())?))
        }
    }
}

/// Parameters of a discovery run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverParams {
    /// Seed word length; the alphabet default when unset
    #[serde(default)]
    pub k: Option<usize>,
    /// Quota of the first round
    #[serde(default = "default_initial_quota")]
    pub initial_quota: Quota,
    /// Quota every extension step must keep in the first round
    #[serde(default = "default_extend_quota")]
    pub extend_quota: Quota,
    /// Lowest quota later rounds fall back to
    #[serde(default = "default_add_anchor_quota")]
    pub add_anchor_quota: Quota,
    /// Sequences the quota drops after a round without new anchors
    #[serde(default = "default_quota_step")]
    pub quota_step: usize,
    /// Upper bound on rounds
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    /// Worker threads; 0 uses every core, 1 runs sequentially
    #[serde(default, skip_serializing)]
    pub workers: usize,
    /// Flank length compared when a word repeats within a sequence
    #[serde(default)]
    pub context: Option<usize>,
    /// Drop anchors whose order disagrees between sequences
    #[serde(default = "default_true")]
    pub remove_contradicting: bool,
}

fn default_initial_quota() -> Quota { Quota::Frac(1.0) }
fn default_extend_quota() -> Quota { Quota::Frac(1.0) }
fn default_add_anchor_quota() -> Quota { Quota::Frac(0.8) }
fn default_quota_step() -> usize { 1 }
fn default_max_rounds() -> usize { 1000 }
fn default_true() -> bool { true }

impl Default for DiscoverParams {
    fn default() -> Self {
        Self {
            k: None,
            initial_quota: default_initial_quota(),
            extend_quota: default_extend_quota(),
            add_anchor_quota: default_add_anchor_quota(),
            quota_step: default_quota_step(),
            max_rounds: default_max_rounds(),
            workers: 0,
            context: None,
            remove_contradicting: true,
        }
    }
}

/// Quotas resolved against the size of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub initial: usize,
    pub extend: usize,
    pub floor: usize,
}

impl Thresholds {
    /// Extension threshold of a round running at quota `round`.
    ///
    /// Relaxes the extension quota by as many sequences as the round quota
    /// has been relaxed, never below the round quota itself.
    pub fn extend_at(&self, round: usize) -> usize {
        let relaxed = self.initial.saturating_sub(round);
        round.max(self.extend.saturating_sub(relaxed))
    }
}

impl DiscoverParams {
    /// Check the parameters against a collection of `n` sequences.
    pub fn validate(&self, n: usize) -> AnchorResult<Thresholds> {
        if self.k == Some(0) {
            return Err(AnchorError::InvalidConfiguration("k must be positive".into()));
        }
        if self.context == Some(0) {
            return Err(AnchorError::InvalidConfiguration("context must be positive".into()));
        }
        if self.max_rounds == 0 {
            return Err(AnchorError::InvalidConfiguration("max_rounds must be positive".into()));
        }
        if self.quota_step == 0 {
            return Err(AnchorError::InvalidConfiguration("quota_step must be positive".into()));
        }
        let initial = self.initial_quota.validate("initial_quota", n)?;
        let extend = self.extend_quota.validate("extend_quota", n)?;
        let floor = self.add_anchor_quota.validate("add_anchor_quota", n)?;
        if floor > initial {
            return Err(AnchorError::InvalidConfiguration(format!(
                "add_anchor_quota {} ({floor} sequences) exceeds initial_quota {} ({initial} sequences)",
                self.add_anchor_quota, self.initial_quota
            )));
        }
        Ok(Thresholds { initial, extend, floor })
    }
}

/// How a discovery run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// A round at the floor quota found nothing new.
    Completed,
    /// `max_rounds` was reached while rounds still ran above the floor
    /// or kept finding anchors.
    Exhausted { quota: usize },
}

/// Result of [`discover`].
#[derive(Debug, Clone)]
pub struct Discovery {
    pub anchors: AnchorSet,
    /// Anchors dropped because their order contradicts stronger anchors
    pub removed: AnchorSet,
    pub rounds: usize,
    pub status: SearchStatus,
}

impl Discovery {
    pub fn is_exhausted(&self) -> bool {
        matches!(self.status, SearchStatus::Exhausted { .. })
    }
}

/// Discover anchors shared by the sequences of `collection`.
pub fn discover(collection: &SequenceCollection, params: &DiscoverParams) -> AnchorResult<Discovery> {
    let thresholds = params.validate(collection.len())?;
    let k = params.k.unwrap_or_else(|| collection.alphabet().default_k());
    log::info!(
        "Discovering anchors in {} {} sequences (k={}, quotas {}/{}/{} sequences)",
        collection.len(),
        collection.alphabet().name(),
        k,
        thresholds.initial,
        thresholds.extend,
        thresholds.floor
    );

    let refinement = Refinement::new(collection, k, params, thresholds)?;
    let (found, rounds, status) = refinement.run();

    let (anchors, removed) = if params.remove_contradicting {
        let (kept, removed) = found.remove_contradicting();
        if !removed.is_empty() {
            log::info!("Removed {} contradicting anchors", removed.len());
        }
        (kept, removed)
    } else {
        (found, AnchorSet::default())
    };

    match status {
        SearchStatus::Completed => log::info!("Found {} anchors in {} rounds", anchors.len(), rounds),
        SearchStatus::Exhausted { quota } => log::warn!(
            "Search exhausted after {} rounds at quota {}; returning {} anchors found so far",
            rounds,
            quota,
            anchors.len()
        ),
    }

    Ok(Discovery { anchors, removed, rounds, status })
}
