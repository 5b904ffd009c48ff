//! Residues still available to discovery

use crate::types::{SequenceCollection, Span};

/// Residue byte marking an ambiguous or already claimed position.
const UNUSABLE: u8 = 0;

/// Sorted, pairwise disjoint spans on one sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    spans: Vec<Span>,
}

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlaps(&self, span: &Span) -> bool {
        let idx = self.spans.partition_point(|s| s.end <= span.start);
        self.spans.get(idx).is_some_and(|s| s.start < span.end)
    }

    pub fn insert(&mut self, span: Span) {
        let idx = self.spans.partition_point(|s| s.start < span.start);
        self.spans.insert(idx, span);
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Total number of covered residues.
    pub fn covered(&self) -> usize {
        self.spans.iter().map(Span::len).sum()
    }
}

/// Normalized residues of a collection with claimed ranges blanked out.
///
/// Read-only during a round; only the refinement controller consumes spans
/// between rounds.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    residues: Vec<Vec<u8>>,
    consumed: Vec<Coverage>,
}

impl SearchSpace {
    pub fn new(collection: &SequenceCollection) -> Self {
        let alphabet = collection.alphabet();
        let residues = collection
            .iter()
            .map(|seq| {
                seq.residues
                    .iter()
                    .map(|&r| alphabet.normalize(r).unwrap_or(UNUSABLE))
                    .collect()
            })
            .collect();
        Self {
            residues,
            consumed: vec![Coverage::new(); collection.len()],
        }
    }

    pub fn n_sequences(&self) -> usize {
        self.residues.len()
    }

    pub fn seq_len(&self, seq: usize) -> usize {
        self.residues[seq].len()
    }

    /// Usable residue at `pos`, or `None` past the ends, on ambiguous symbols
    /// and inside consumed spans.
    pub fn residue(&self, seq: usize, pos: usize) -> Option<u8> {
        self.residues[seq].get(pos).copied().filter(|&r| r != UNUSABLE)
    }

    /// Residue immediately left of `pos`.
    pub fn residue_before(&self, seq: usize, pos: usize) -> Option<u8> {
        pos.checked_sub(1).and_then(|p| self.residue(seq, p))
    }

    pub fn residues(&self, seq: usize) -> &[u8] {
        &self.residues[seq]
    }

    pub fn is_usable(&self, seq: usize, span: &Span) -> bool {
        (span.start..span.end).all(|pos| self.residue(seq, pos).is_some())
    }

    /// Claim `span` on `seq` for an accepted anchor.
    pub fn consume(&mut self, seq: usize, span: Span) {
        let end = span.end.min(self.residues[seq].len());
        for residue in &mut self.residues[seq][span.start.min(end)..end] {
            *residue = UNUSABLE;
        }
        self.consumed[seq].insert(span);
    }

    pub fn consumed(&self, seq: usize) -> &Coverage {
        &self.consumed[seq]
    }
}
