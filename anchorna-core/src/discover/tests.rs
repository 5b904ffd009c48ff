//! End-to-end discovery tests on small fixture collections

use super::*;
use crate::types::{Sequence, Span};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixture collections with known anchors
pub struct TestSequences;

impl TestSequences {
    /// Five sequences sharing TTGACC at offsets 3, 11, 7, 20 and 15
    pub fn planted_word() -> Vec<&'static str> {
        vec![
            "GCTTTGACCAAAGACAATTACATAACATACACGTCAGCACG",
            "AAACTTGTTGGTTGACCCCCAGTGTGAATCGCTTAAGGGTT",
            "AAGTAAGTTGACCTGTGATGCATACGCCTTTACTTGCTGTG",
            "TCCACCCCATCGGACTGGCATTGACCTTTTTATTACACTCA",
            "GAAACAGAACTCGGGTTGACCTAATTTTGACAGGTCACGCA",
        ]
    }

    /// GGATCCAT shared by all four sequences, CTTAAGTC by the first three
    pub fn two_tier() -> Vec<&'static str> {
        vec![
            "TTTCCGGATCCATTCATGCAATTCTTAAGTCCAAAAC",
            "CATGTCGGATCCATCGTAATGTAGCTTAAGTCGCGAAA",
            "TAGTAAAGGATCCATCCATTTTACGCTTAAGTCGAGGAT",
            "ACCAAATTGGATCCATCCTCCTTATTCAGGACCTAACCTG",
        ]
    }

    /// Two conserved blocks whose order flips in the third sequence
    pub fn crossing_blocks() -> Vec<&'static str> {
        vec![
            "TCCTTATTGATTACAGGTCAGGACCTAACCTTGAACTCCCTGAGG",
            "TAAACGATTACAGGTCAGGTCTCTCCGCCTTGAACTCCCCCCTTAT",
            "AAAAGCCCTTGAACTCTGTTGCACCTAGATTACAGGTGCCAAGTT",
        ]
    }

    pub fn protein() -> Vec<&'static str> {
        vec![
            "YKNTMKWVTFISLLARICGENSI",
            "PVEWIAHMKWVTFISLLQKG",
            "PGMKWVTFISLLDFYYRFFAAHHG",
        ]
    }

    /// Homologous sequences derived from one random ancestor by point
    /// substitutions and short indels
    pub fn mutated_family(seed: u64, members: usize, len: usize) -> Vec<String> {
        let mut rng = StdRng::seed_from_u64(seed);
        let ancestor: Vec<u8> = (0..len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        (0..members)
            .map(|_| {
                let mut seq = Vec::with_capacity(len + 8);
                for &residue in &ancestor {
                    match rng.gen_range(0..100) {
                        0..=3 => seq.push(b"ACGT"[rng.gen_range(0..4)]),
                        4 => {}
                        5 => {
                            seq.push(residue);
                            seq.push(b"ACGT"[rng.gen_range(0..4)]);
                        }
                        _ => seq.push(residue),
                    }
                }
                String::from_utf8(seq).unwrap()
            })
            .collect()
    }

    pub fn collection<S: AsRef<str>>(seqs: &[S]) -> SequenceCollection {
        let sequences = seqs
            .iter()
            .enumerate()
            .map(|(i, s)| Sequence::new(format!("seq{i}"), s.as_ref()))
            .collect();
        SequenceCollection::new(sequences).unwrap()
    }
}

fn params(k: usize, initial: usize, extend: usize, floor: usize, max_rounds: usize) -> DiscoverParams {
    DiscoverParams {
        k: Some(k),
        initial_quota: Quota::Count(initial),
        extend_quota: Quota::Count(extend),
        add_anchor_quota: Quota::Count(floor),
        max_rounds,
        workers: 1,
        ..Default::default()
    }
}

fn spans(anchor: &crate::anchor::Anchor) -> Vec<(String, Span)> {
    anchor.loci.iter().map(|(id, locus)| (id.clone(), locus.span)).collect()
}

#[test]
fn test_quota_resolution() {
    assert_eq!(Quota::Count(3).resolve(10), 3);
    assert_eq!(Quota::Frac(1.0).resolve(5), 5);
    assert_eq!(Quota::Frac(0.8).resolve(5), 4);
    assert_eq!(Quota::Frac(0.5).resolve(5), 3);
    assert_eq!(Quota::Frac(0.01).resolve(5), 1);
}

#[test]
fn test_quota_parsing() {
    assert_eq!("4".parse::<Quota>().unwrap(), Quota::Count(4));
    assert_eq!("0.75".parse::<Quota>().unwrap(), Quota::Frac(0.75));
    assert_eq!("50%".parse::<Quota>().unwrap(), Quota::Frac(0.5));
    assert!("many".parse::<Quota>().is_err());
}

#[test]
fn test_params_validation() {
    let n = 5;
    assert_eq!(
        DiscoverParams::default().validate(n).unwrap(),
        Thresholds { initial: 5, extend: 5, floor: 4 }
    );

    let invalid = [
        DiscoverParams { k: Some(0), ..Default::default() },
        DiscoverParams { initial_quota: Quota::Frac(1.5), ..Default::default() },
        DiscoverParams { initial_quota: Quota::Frac(0.0), ..Default::default() },
        DiscoverParams { extend_quota: Quota::Count(6), ..Default::default() },
        DiscoverParams { add_anchor_quota: Quota::Count(1), ..Default::default() },
        DiscoverParams {
            initial_quota: Quota::Count(3),
            add_anchor_quota: Quota::Count(4),
            ..Default::default()
        },
        DiscoverParams { max_rounds: 0, ..Default::default() },
        DiscoverParams { quota_step: 0, ..Default::default() },
    ];
    for params in invalid {
        assert!(
            matches!(params.validate(n), Err(AnchorError::InvalidConfiguration(_))),
            "{params:?}"
        );
    }
}

#[test]
fn test_extension_threshold_relaxes_with_round_quota() {
    let thresholds = Thresholds { initial: 10, extend: 9, floor: 5 };
    assert_eq!(thresholds.extend_at(10), 10);
    assert_eq!(thresholds.extend_at(9), 9);
    assert_eq!(thresholds.extend_at(7), 7);

    let strict = Thresholds { initial: 6, extend: 6, floor: 3 };
    assert_eq!(strict.extend_at(4), 4);
}

#[test]
fn test_planted_word_found_exactly() {
    let collection = TestSequences::collection(&TestSequences::planted_word());
    let discovery = discover(&collection, &params(6, 5, 5, 5, 50)).unwrap();

    assert_eq!(discovery.status, SearchStatus::Completed);
    assert_eq!(discovery.anchors.len(), 1);
    let anchor = discovery.anchors.get(0).unwrap();
    assert_eq!(anchor.word, "TTGACC");
    assert_eq!(anchor.quota, 1.0);
    for (i, offset) in [3, 11, 7, 20, 15].into_iter().enumerate() {
        let locus = anchor.locus(&format!("seq{i}")).unwrap();
        assert_eq!(locus.span, Span::new(offset, offset + 6));
    }
}

#[test]
fn test_lowered_quota_finds_partial_anchor() {
    let collection = TestSequences::collection(&TestSequences::two_tier());
    let discovery = discover(&collection, &params(5, 4, 4, 3, 50)).unwrap();

    assert_eq!(discovery.status, SearchStatus::Completed);
    assert_eq!(discovery.rounds, 4);
    assert_eq!(discovery.anchors.len(), 2);

    let full = discovery.anchors.get(0).unwrap();
    assert_eq!(full.word, "GGATC");
    assert_eq!(full.quota, 1.0);
    assert_eq!(
        spans(full),
        vec![
            ("seq0".to_string(), Span::new(5, 13)),
            ("seq1".to_string(), Span::new(6, 14)),
            ("seq2".to_string(), Span::new(7, 15)),
            ("seq3".to_string(), Span::new(8, 16)),
        ]
    );

    let partial = discovery.anchors.get(1).unwrap();
    assert_eq!(partial.word, "CTTAA");
    assert_eq!(partial.quota, 0.75);
    assert_eq!(
        spans(partial),
        vec![
            ("seq0".to_string(), Span::new(23, 31)),
            ("seq1".to_string(), Span::new(24, 32)),
            ("seq2".to_string(), Span::new(25, 33)),
        ]
    );
}

#[test]
fn test_floor_quota_limits_discovery() {
    let collection = TestSequences::collection(&TestSequences::two_tier());
    let discovery = discover(&collection, &params(5, 4, 4, 4, 50)).unwrap();

    assert_eq!(discovery.status, SearchStatus::Completed);
    assert_eq!(discovery.anchors.len(), 1);
    assert_eq!(discovery.anchors.get(0).unwrap().word, "GGATC");
}

#[test]
fn test_round_limit_reports_exhaustion() {
    let collection = TestSequences::collection(&TestSequences::two_tier());

    let one = discover(&collection, &params(5, 4, 4, 3, 1)).unwrap();
    assert_eq!(one.status, SearchStatus::Exhausted { quota: 4 });
    assert_eq!(one.rounds, 1);
    assert_eq!(one.anchors.len(), 1);

    let two = discover(&collection, &params(5, 4, 4, 3, 2)).unwrap();
    assert_eq!(two.status, SearchStatus::Exhausted { quota: 3 });
    assert_eq!(two.anchors.len(), 1);

    let three = discover(&collection, &params(5, 4, 4, 3, 3)).unwrap();
    assert!(three.is_exhausted());
    assert_eq!(three.anchors.len(), 2);

    let four = discover(&collection, &params(5, 4, 4, 3, 4)).unwrap();
    assert_eq!(four.status, SearchStatus::Completed);
    assert_eq!(four.anchors, three.anchors);
}

#[test]
fn test_contradicting_anchors_removed() {
    let collection = TestSequences::collection(&TestSequences::crossing_blocks());

    let kept = discover(&collection, &params(6, 3, 3, 3, 50)).unwrap();
    assert_eq!(kept.anchors.len(), 1);
    assert_eq!(kept.anchors.get(0).unwrap().word, "GATTAC");
    assert_eq!(kept.removed.len(), 1);
    assert_eq!(kept.removed.get(0).unwrap().word, "CCTTGA");

    let all = DiscoverParams { remove_contradicting: false, ..params(6, 3, 3, 3, 50) };
    let discovery = discover(&collection, &all).unwrap();
    assert_eq!(discovery.anchors.len(), 2);
    assert!(discovery.removed.is_empty());
}

#[test]
fn test_protein_alphabet_defaults() {
    let collection = TestSequences::collection(&TestSequences::protein());
    assert_eq!(collection.alphabet(), crate::types::Alphabet::AminoAcid);

    let params = DiscoverParams {
        initial_quota: Quota::Frac(1.0),
        add_anchor_quota: Quota::Frac(1.0),
        workers: 1,
        ..Default::default()
    };
    let discovery = discover(&collection, &params).unwrap();
    assert_eq!(discovery.anchors.len(), 1);
    let anchor = discovery.anchors.get(0).unwrap();
    assert_eq!(anchor.word, "MKWVT");
    assert_eq!(anchor.locus("seq1").unwrap().span, Span::new(7, 17));
}

#[test]
fn test_worker_count_does_not_change_result() {
    let family = TestSequences::mutated_family(42, 6, 400);
    let collection = TestSequences::collection(&family);
    let base = DiscoverParams {
        k: Some(8),
        initial_quota: Quota::Frac(1.0),
        extend_quota: Quota::Frac(0.9),
        add_anchor_quota: Quota::Frac(0.5),
        ..Default::default()
    };

    let sequential = discover(&collection, &DiscoverParams { workers: 1, ..base.clone() }).unwrap();
    for workers in [0, 2, 4] {
        let parallel = discover(&collection, &DiscoverParams { workers, ..base.clone() }).unwrap();
        assert_eq!(parallel.anchors, sequential.anchors, "workers={workers}");
        assert_eq!(parallel.rounds, sequential.rounds);
    }
}

#[test]
fn test_discovered_anchor_invariants() {
    for seed in [1, 2, 3] {
        let family = TestSequences::mutated_family(seed, 5, 300);
        let collection = TestSequences::collection(&family);
        let params = DiscoverParams {
            k: Some(7),
            initial_quota: Quota::Frac(1.0),
            extend_quota: Quota::Frac(1.0),
            add_anchor_quota: Quota::Frac(0.6),
            workers: 1,
            ..Default::default()
        };
        let floor = params.add_anchor_quota.resolve(collection.len());
        let discovery = discover(&collection, &params).unwrap();

        for anchor in &discovery.anchors {
            // quota of the producing round never drops below the floor
            assert!(anchor.members() >= floor);
            assert!(anchor.quota >= floor as f64 / collection.len() as f64);

            // extension only keeps members agreeing residue by residue
            let slices: Vec<&[u8]> = anchor
                .loci
                .iter()
                .map(|(id, locus)| {
                    let seq = &collection.sequences()[collection.index_of(id).unwrap()];
                    &seq.residues[locus.span.start..locus.span.end]
                })
                .collect();
            assert!(slices.windows(2).all(|w| w[0] == w[1]));
            assert!(slices[0].len() >= 7);
        }

        for seq in collection.iter() {
            let mut taken: Vec<Span> = discovery
                .anchors
                .iter()
                .filter_map(|a| a.locus(&seq.id).map(|l| l.span))
                .collect();
            taken.sort();
            assert!(taken.windows(2).all(|w| w[0].end <= w[1].start), "overlap on {}", seq.id);
        }

        let ids: Vec<usize> = discovery.anchors.iter().map(|a| a.id).collect();
        assert_eq!(ids, (0..discovery.anchors.len()).collect::<Vec<_>>());
    }
}

#[test]
fn test_iupac_codes_keep_nucleotide_semantics() {
    let mut seqs: Vec<String> = TestSequences::planted_word().iter().map(|s| s.to_string()).collect();
    seqs[0].replace_range(30..31, "R");
    seqs[2].replace_range(25..27, "YK");
    let collection = TestSequences::collection(&seqs);
    assert_eq!(collection.alphabet(), crate::types::Alphabet::Nucleotide);

    let discovery = discover(&collection, &params(6, 5, 5, 5, 50)).unwrap();
    assert_eq!(discovery.anchors.len(), 1);
    assert_eq!(discovery.anchors.get(0).unwrap().word, "TTGACC");

    let defaults = DiscoverParams { workers: 1, ..Default::default() };
    let space = SearchSpace::new(&collection);
    assert_eq!(space.residue(0, 30), None);
    assert!(discover(&collection, &defaults).is_ok());
}

#[test]
fn test_too_few_sequences_rejected() {
    let single = SequenceCollection::new(vec![Sequence::new("a", "ACGT")]);
    assert!(matches!(single, Err(AnchorError::EmptyInput(_))));
}
