//! Exact k-mer index over the usable residues of a search space

use std::collections::HashMap;

use super::space::SearchSpace;

/// Start of one word occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Occurrence {
    pub seq: usize,
    pub start: usize,
}

/// Maps every word of length `k` to its occurrences.
///
/// Occurrence lists are ordered by sequence index, then position.
#[derive(Debug, Clone)]
pub struct KmerIndex {
    k: usize,
    entries: HashMap<Vec<u8>, Vec<Occurrence>>,
}

impl KmerIndex {
    /// Index every window made of `k` usable residues.
    pub fn build(space: &SearchSpace, k: usize) -> Self {
        let mut entries: HashMap<Vec<u8>, Vec<Occurrence>> = HashMap::new();

        for seq in 0..space.n_sequences() {
            let residues = space.residues(seq);
            let mut valid_run = 0;
            for pos in 0..residues.len() {
                if space.residue(seq, pos).is_some() {
                    valid_run += 1;
                } else {
                    valid_run = 0;
                }

                if valid_run >= k {
                    let start = pos + 1 - k;
                    entries
                        .entry(residues[start..=pos].to_vec())
                        .or_default()
                        .push(Occurrence { seq, start });
                }
            }
        }

        Self { k, entries }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, word: &[u8]) -> Option<&[Occurrence]> {
        self.entries.get(word).map(Vec::as_slice)
    }

    /// Words found in at least `quota` distinct sequences, sorted by word.
    pub fn shared_words(&self, quota: usize) -> Vec<(&[u8], &[Occurrence])> {
        let mut shared: Vec<(&[u8], &[Occurrence])> = self
            .entries
            .iter()
            .filter(|(_, occurrences)| distinct_sequences(occurrences) >= quota)
            .map(|(word, occurrences)| (word.as_slice(), occurrences.as_slice()))
            .collect();
        shared.sort_unstable_by(|a, b| a.0.cmp(b.0));
        shared
    }
}

/// Number of distinct sequences in an ordered occurrence list.
pub fn distinct_sequences(occurrences: &[Occurrence]) -> usize {
    let mut count = 0;
    let mut last = None;
    for occ in occurrences {
        if last != Some(occ.seq) {
            count += 1;
            last = Some(occ.seq);
        }
    }
    count
}
