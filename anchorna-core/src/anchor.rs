//! Anchors and anchor sets
//!
//! Anchor ids are dense indices into their set. Every operation that
//! produces a new set renumbers, so an id is only meaningful together with
//! the set it was read from.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::selection::Selection;
use crate::types::{Span, Strand};

/// Placement of an anchor on one sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locus {
    pub span: Span,
    pub strand: Strand,
    pub frame: Option<u8>,
    /// Provenance offset of the sequence the span refers to
    pub offset: u64,
}

impl Locus {
    pub fn new(span: Span) -> Self {
        Self { span, strand: Strand::Unknown, frame: None, offset: 0 }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Start in the coordinates of the uncut sequence.
    pub fn absolute_start(&self) -> u64 {
        self.offset + self.span.start as u64
    }

    fn absolute_span(&self) -> (u64, u64) {
        (self.absolute_start(), self.offset + self.span.end as u64)
    }
}

/// A conserved region with one span per carrying sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub id: usize,
    /// Seed word the anchor grew from
    pub word: String,
    pub loci: BTreeMap<String, Locus>,
    /// Fraction of sequences carrying the anchor when it was found
    pub quota: f64,
}

impl Anchor {
    pub fn new(word: impl Into<String>, loci: BTreeMap<String, Locus>, quota: f64) -> Self {
        Self { id: 0, word: word.into(), loci, quota }
    }

    pub fn members(&self) -> usize {
        self.loci.len()
    }

    pub fn locus(&self, seq_id: &str) -> Option<&Locus> {
        self.loci.get(seq_id)
    }

    /// Mean absolute start over all members.
    pub fn representative_position(&self) -> f64 {
        if self.loci.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.loci.values().map(Locus::absolute_start).sum();
        sum as f64 / self.loci.len() as f64
    }

    pub fn leftmost_start(&self) -> u64 {
        self.loci.values().map(Locus::absolute_start).min().unwrap_or(0)
    }

    /// True if both anchors sit on a shared sequence and overlap there by
    /// more than `max_overlap` of the shorter span.
    pub fn conflicts_with(&self, other: &Anchor, max_overlap: f64) -> bool {
        self.loci.iter().any(|(seq_id, locus)| {
            let Some(theirs) = other.loci.get(seq_id) else {
                return false;
            };
            let (a_start, a_end) = locus.absolute_span();
            let (b_start, b_end) = theirs.absolute_span();
            let overlap = a_end.min(b_end).saturating_sub(a_start.max(b_start));
            let shorter = (a_end - a_start).min(b_end - b_start).max(1);
            overlap > 0 && overlap as f64 / shorter as f64 > max_overlap
        })
    }

    /// True if the two anchors are ordered differently on two shared sequences.
    pub fn contradicts(&self, other: &Anchor) -> bool {
        let mut seen: Option<Ordering> = None;
        for (seq_id, locus) in &self.loci {
            let Some(theirs) = other.loci.get(seq_id) else {
                continue;
            };
            let order = locus.absolute_start().cmp(&theirs.absolute_start());
            if order == Ordering::Equal {
                continue;
            }
            match seen {
                Some(previous) if previous != order => return true,
                _ => seen = Some(order),
            }
        }
        false
    }

    /// Re-express every locus relative to `offsets`, keeping absolute
    /// positions. Targets above a locus start are left alone.
    pub fn rebase(&mut self, offsets: &BTreeMap<String, u64>) {
        for (seq_id, locus) in self.loci.iter_mut() {
            let Some(&target) = offsets.get(seq_id) else {
                continue;
            };
            if target == locus.offset {
                continue;
            }
            let absolute = locus.absolute_start();
            if absolute < target {
                log::warn!(
                    "Anchor {} on {} starts at {} before offset {}, keeping offset {}",
                    self.word, seq_id, absolute, target, locus.offset
                );
                continue;
            }
            let start = (absolute - target) as usize;
            locus.span = Span::new(start, start + locus.span.len());
            locus.offset = target;
        }
    }
}

/// Lowest provenance offset per sequence over `anchors`.
fn lowest_offsets(anchors: &[Anchor]) -> BTreeMap<String, u64> {
    let mut offsets: BTreeMap<String, u64> = BTreeMap::new();
    for anchor in anchors {
        for (seq_id, locus) in &anchor.loci {
            offsets
                .entry(seq_id.clone())
                .and_modify(|offset| *offset = (*offset).min(locus.offset))
                .or_insert(locus.offset);
        }
    }
    offsets
}

/// Options of [`AnchorSet::merge_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergeOptions {
    /// Largest tolerated overlap as a fraction of the shorter span; 0 rejects any overlap
    pub max_overlap: f64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { max_overlap: 0.0 }
    }
}

/// Ordered, densely numbered anchors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnchorSet {
    anchors: Vec<Anchor>,
}

impl AnchorSet {
    /// Sort anchors by representative position and number them.
    ///
    /// All loci on one sequence are moved to the lowest offset seen for it,
    /// so a set carries a single offset per sequence.
    pub fn new(mut anchors: Vec<Anchor>) -> Self {
        let offsets = lowest_offsets(&anchors);
        for anchor in anchors.iter_mut() {
            anchor.rebase(&offsets);
        }
        anchors.sort_by(|a, b| {
            a.representative_position()
                .total_cmp(&b.representative_position())
                .then_with(|| a.leftmost_start().cmp(&b.leftmost_start()))
                .then_with(|| a.word.cmp(&b.word))
        });
        Self::from_ordered(anchors)
    }

    /// Keep the given order and renumber.
    fn from_ordered(mut anchors: Vec<Anchor>) -> Self {
        for (id, anchor) in anchors.iter_mut().enumerate() {
            anchor.id = id;
        }
        Self { anchors }
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Anchor> {
        self.anchors.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Anchor> {
        self.anchors.iter()
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn into_anchors(self) -> Vec<Anchor> {
        self.anchors
    }

    /// Identifiers of all sequences carrying at least one anchor.
    pub fn sequence_ids(&self) -> BTreeSet<&str> {
        self.anchors
            .iter()
            .flat_map(|a| a.loci.keys().map(String::as_str))
            .collect()
    }

    /// Provenance offset of every sequence carrying an anchor.
    pub fn offsets(&self) -> BTreeMap<String, u64> {
        lowest_offsets(&self.anchors)
    }

    /// Set without the anchors in `ids`; unknown ids are ignored with a warning.
    pub fn remove(&self, ids: &[usize]) -> AnchorSet {
        let excluded: BTreeSet<usize> = ids.iter().copied().collect();
        for id in excluded.range(self.len()..) {
            log::warn!("Cannot remove anchor A{id}: set has {} anchors", self.len());
        }
        Self::from_ordered(
            self.anchors
                .iter()
                .filter(|a| !excluded.contains(&a.id))
                .cloned()
                .collect(),
        )
    }

    /// Anchors matched by `selection`, in set order.
    pub fn select(&self, selection: &Selection) -> AnchorSet {
        Self::from_ordered(
            self.anchors
                .iter()
                .filter(|a| selection.contains(a.id))
                .cloned()
                .collect(),
        )
    }

    pub fn merge(&self, other: &AnchorSet) -> AnchorSet {
        self.merge_with(other, &MergeOptions::default())
    }

    /// Union of both sets, compared in absolute coordinates. Of two
    /// conflicting anchors the one with the higher quota survives, `self`
    /// winning ties. Loci of both sets end up on the lower offset.
    pub fn merge_with(&self, other: &AnchorSet, options: &MergeOptions) -> AnchorSet {
        let mut pool: Vec<(usize, Anchor)> = self
            .anchors
            .iter()
            .map(|a| (0, a.clone()))
            .chain(other.anchors.iter().map(|a| (1, a.clone())))
            .collect();
        pool.sort_by(|(origin_a, a), (origin_b, b)| {
            b.quota
                .total_cmp(&a.quota)
                .then_with(|| origin_a.cmp(origin_b))
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut kept: Vec<Anchor> = Vec::with_capacity(pool.len());
        let mut dropped = 0;
        for (_, anchor) in pool {
            if kept.iter().any(|k| k.conflicts_with(&anchor, options.max_overlap)) {
                dropped += 1;
                continue;
            }
            kept.push(anchor);
        }
        if dropped > 0 {
            log::debug!("Merge dropped {dropped} overlapping anchors");
        }
        AnchorSet::new(kept)
    }

    /// Split into anchors consistent with each other and anchors whose order
    /// contradicts a stronger one.
    pub fn remove_contradicting(&self) -> (AnchorSet, AnchorSet) {
        let mut by_quota: Vec<&Anchor> = self.anchors.iter().collect();
        by_quota.sort_by(|a, b| b.quota.total_cmp(&a.quota).then_with(|| a.id.cmp(&b.id)));

        let mut kept: Vec<&Anchor> = Vec::new();
        let mut removed: Vec<&Anchor> = Vec::new();
        for anchor in by_quota {
            if kept.iter().any(|k| k.contradicts(anchor)) {
                removed.push(anchor);
            } else {
                kept.push(anchor);
            }
        }
        kept.sort_by_key(|a| a.id);
        removed.sort_by_key(|a| a.id);
        (
            Self::from_ordered(kept.into_iter().cloned().collect()),
            Self::from_ordered(removed.into_iter().cloned().collect()),
        )
    }

    /// Human readable listing, one line per anchor and per member when `verbose`.
    pub fn to_text(&self, verbose: bool) -> String {
        let mut out = String::new();
        for anchor in &self.anchors {
            let lengths: Vec<usize> = anchor.loci.values().map(|l| l.span.len()).collect();
            let min_len = lengths.iter().min().copied().unwrap_or(0);
            let max_len = lengths.iter().max().copied().unwrap_or(0);
            let len = if min_len == max_len {
                min_len.to_string()
            } else {
                format!("{min_len}-{max_len}")
            };
            out.push_str(&format!(
                "A{:<4} {:>9.1}+{:<6} quota {:.2}  members {:<4} {}\n",
                anchor.id,
                anchor.representative_position(),
                len,
                anchor.quota,
                anchor.members(),
                anchor.word
            ));
            if verbose {
                for (seq_id, locus) in &anchor.loci {
                    out.push_str(&format!(
                        "    {:<24} {:>8}..{:<8} {} offset {}\n",
                        seq_id,
                        locus.span.start,
                        locus.span.end,
                        char::from(locus.strand),
                        locus.offset
                    ));
                }
            }
        }
        out
    }
}

impl fmt::Display for AnchorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(false))
    }
}

impl<'a> IntoIterator for &'a AnchorSet {
    type Item = &'a Anchor;
    type IntoIter = std::slice::Iter<'a, Anchor>;

    fn into_iter(self) -> Self::IntoIter {
        self.anchors.iter()
    }
}

/// `set` without the anchors in `ids`, renumbered.
pub fn remove(set: &AnchorSet, ids: &[usize]) -> AnchorSet {
    set.remove(ids)
}

/// Union of two sets with overlaps resolved by quota.
pub fn merge(a: &AnchorSet, b: &AnchorSet) -> AnchorSet {
    a.merge(b)
}
