//! Residue-by-residue candidate extension

use super::candidate::{majority, Candidate};
use super::space::SearchSpace;
use crate::types::Span;

/// A candidate grown to its maximal extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extended {
    pub word: Vec<u8>,
    /// Leftmost seed start before extension, used for ordering
    pub seed_start: usize,
    /// `(sequence, span)` pairs ordered by sequence
    pub members: Vec<(usize, Span)>,
}

impl Extended {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn leftmost_start(&self) -> usize {
        self.members.iter().map(|(_, span)| span.start).min().unwrap_or(0)
    }
}

/// Grows candidates left, then right, while at least `threshold` members
/// agree on the next residue.
pub struct Extender<'s> {
    space: &'s SearchSpace,
    threshold: usize,
}

impl<'s> Extender<'s> {
    pub fn new(space: &'s SearchSpace, threshold: usize) -> Self {
        Self { space, threshold }
    }

    pub fn extend(&self, candidate: Candidate) -> Extended {
        let seed_start = candidate.leftmost_start();
        let k = candidate.word.len();
        let mut members = candidate.members;
        let mut length = k;

        // Left: members hold the current start
        loop {
            let next: Vec<Option<u8>> = members
                .iter()
                .map(|&(seq, start)| self.space.residue_before(seq, start))
                .collect();
            match self.agreeing(&members, &next) {
                Some(kept) => members = kept.into_iter().map(|(seq, start)| (seq, start - 1)).collect(),
                None => break,
            }
            length += 1;
        }

        loop {
            let next: Vec<Option<u8>> = members
                .iter()
                .map(|&(seq, start)| self.space.residue(seq, start + length))
                .collect();
            match self.agreeing(&members, &next) {
                Some(kept) => members = kept,
                None => break,
            }
            length += 1;
        }

        Extended {
            word: candidate.word,
            seed_start,
            members: members
                .into_iter()
                .map(|(seq, start)| (seq, Span::new(start, start + length)))
                .collect(),
        }
    }

    /// Members whose next residue matches the majority, if there are enough of them.
    fn agreeing(&self, members: &[(usize, usize)], next: &[Option<u8>]) -> Option<Vec<(usize, usize)>> {
        let consensus = majority(next.iter().copied())?;
        let kept: Vec<(usize, usize)> = members
            .iter()
            .zip(next)
            .filter(|(_, residue)| **residue == Some(consensus))
            .map(|(&member, _)| member)
            .collect();
        (kept.len() >= self.threshold).then_some(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Sequence, SequenceCollection};

    fn space(seqs: &[&str]) -> SearchSpace {
        let sequences = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| Sequence::new(format!("s{i}"), *s))
            .collect();
        SearchSpace::new(&SequenceCollection::new(sequences).unwrap())
    }

    fn candidate(word: &str, members: &[(usize, usize)]) -> Candidate {
        Candidate { word: word.as_bytes().to_vec(), members: members.to_vec() }
    }

    #[test]
    fn test_extends_to_shared_block() {
        let space = space(&["TTACGTACGGG", "CCACGTACGAA", "GGACGTACGCC"]);
        let extender = Extender::new(&space, 3);

        let extended = extender.extend(candidate("GTA", &[(0, 4), (1, 4), (2, 4)]));
        assert_eq!(extended.seed_start, 4);
        assert_eq!(
            extended.members,
            vec![(0, Span::new(2, 9)), (1, Span::new(2, 9)), (2, Span::new(2, 9))]
        );
    }

    #[test]
    fn test_stops_at_sequence_boundary() {
        let space = space(&["ACGTT", "ACGTC", "ACGTG"]);
        let extender = Extender::new(&space, 3);

        let extended = extender.extend(candidate("CG", &[(0, 1), (1, 1), (2, 1)]));
        assert!(extended.members.iter().all(|(_, span)| *span == Span::new(0, 4)));
    }

    #[test]
    fn test_drops_disagreeing_member() {
        let space = space(&["AAGATCCC", "AAGATCCC", "TTGATGGG"]);
        let extender = Extender::new(&space, 2);

        let extended = extender.extend(candidate("GAT", &[(0, 2), (1, 2), (2, 2)]));
        assert_eq!(extended.members, vec![(0, Span::new(0, 8)), (1, Span::new(0, 8))]);
    }

    #[test]
    fn test_threshold_blocks_extension() {
        let space = space(&["AAGATCCC", "AAGATCCC", "TTGATGGG"]);
        let extender = Extender::new(&space, 3);

        let extended = extender.extend(candidate("GAT", &[(0, 2), (1, 2), (2, 2)]));
        assert_eq!(extended.len(), 3);
        assert!(extended.members.iter().all(|(_, span)| *span == Span::new(2, 5)));
    }

    #[test]
    fn test_ambiguous_residue_never_matches() {
        let space = space(&["NGATA", "CGATA", "CGATA"]);
        let extender = Extender::new(&space, 3);

        let extended = extender.extend(candidate("GAT", &[(0, 1), (1, 1), (2, 1)]));
        assert!(extended.members.iter().all(|(_, span)| *span == Span::new(1, 5)));
    }
}
