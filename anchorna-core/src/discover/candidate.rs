//! Candidate generation from shared words

use std::collections::BTreeMap;

use super::kmer::Occurrence;
use super::space::SearchSpace;

/// A seed word with exactly one chosen start per member sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub word: Vec<u8>,
    /// `(sequence, start)` pairs ordered by sequence
    pub members: Vec<(usize, usize)>,
}

impl Candidate {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn leftmost_start(&self) -> usize {
        self.members.iter().map(|&(_, start)| start).min().unwrap_or(0)
    }
}

/// Turns index entries into candidates.
///
/// When a word repeats within one sequence, the occurrence whose flanks
/// agree longest with the consensus flanks of the other sequences is kept.
pub struct CandidateGenerator<'s> {
    space: &'s SearchSpace,
    context: usize,
}

impl<'s> CandidateGenerator<'s> {
    pub fn new(space: &'s SearchSpace, context: usize) -> Self {
        Self { space, context }
    }

    /// Candidate for `word`, or `None` if it occurs in fewer than `quota` sequences.
    pub fn generate(&self, word: &[u8], occurrences: &[Occurrence], quota: usize) -> Option<Candidate> {
        let mut by_seq: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for occ in occurrences {
            by_seq.entry(occ.seq).or_default().push(occ.start);
        }
        if by_seq.len() < quota {
            return None;
        }

        let k = word.len();
        let mut members = Vec::with_capacity(by_seq.len());
        let repeated = by_seq.values().any(|starts| starts.len() > 1);
        let profile = repeated.then(|| self.flank_profile(&by_seq, occurrences, k));

        for (&seq, starts) in &by_seq {
            let start = match (&profile, starts.as_slice()) {
                (_, [single]) => *single,
                (Some(profile), _) => self.best_occurrence(seq, starts, k, profile),
                (None, _) => starts[0],
            };
            members.push((seq, start));
        }

        Some(Candidate { word: word.to_vec(), members })
    }

    /// Consensus residues left and right of the word, nearest first.
    fn flank_profile(
        &self,
        by_seq: &BTreeMap<usize, Vec<usize>>,
        occurrences: &[Occurrence],
        k: usize,
    ) -> FlankProfile {
        let singles: Vec<(usize, usize)> = by_seq
            .iter()
            .filter(|(_, starts)| starts.len() == 1)
            .map(|(&seq, starts)| (seq, starts[0]))
            .collect();
        let reference: Vec<(usize, usize)> = if singles.is_empty() {
            occurrences.iter().map(|o| (o.seq, o.start)).collect()
        } else {
            singles
        };

        let left = (0..self.context)
            .map(|d| {
                majority(reference.iter().map(|&(seq, start)| {
                    start.checked_sub(d + 1).and_then(|p| self.space.residue(seq, p))
                }))
            })
            .collect();
        let right = (0..self.context)
            .map(|d| majority(reference.iter().map(|&(seq, start)| self.space.residue(seq, start + k + d))))
            .collect();

        FlankProfile { left, right }
    }

    fn best_occurrence(&self, seq: usize, starts: &[usize], k: usize, profile: &FlankProfile) -> usize {
        let mut best = (0, starts[0]);
        for (i, &start) in starts.iter().enumerate() {
            let left = profile
                .left
                .iter()
                .enumerate()
                .take_while(|&(d, expected)| {
                    let residue = start.checked_sub(d + 1).and_then(|p| self.space.residue(seq, p));
                    residue.is_some() && residue == *expected
                })
                .count();
            let right = profile
                .right
                .iter()
                .enumerate()
                .take_while(|&(d, expected)| {
                    let residue = self.space.residue(seq, start + k + d);
                    residue.is_some() && residue == *expected
                })
                .count();
            let score = left + right;
            if i == 0 || score > best.0 {
                best = (score, start);
            }
        }
        best.1
    }
}

struct FlankProfile {
    left: Vec<Option<u8>>,
    right: Vec<Option<u8>>,
}

/// Most frequent residue, ties resolved to the smallest byte.
pub(crate) fn majority(residues: impl Iterator<Item = Option<u8>>) -> Option<u8> {
    let mut counts = [0usize; 256];
    for residue in residues.flatten() {
        counts[residue as usize] += 1;
    }
    let mut best: Option<(u8, usize)> = None;
    for (byte, &count) in counts.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, c)| count > c) {
            best = Some((byte as u8, count));
        }
    }
    best.map(|(byte, _)| byte)
}
