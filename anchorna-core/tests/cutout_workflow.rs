use anchorna_core::io::{read_anchors, write_anchors, write_fasta_file, FastaParser};
use anchorna_core::{
    cutout, discover, merge, Anchor, AnchorError, AnchorSet, DiscoverParams, Locus, Quota,
    ResolutionError, Sequence, SequenceCollection, Span,
};
use std::collections::BTreeMap;
use tempfile::Builder;

const TWO_TIER: [&str; 4] = [
    "TTTCCGGATCCATTCATGCAATTCTTAAGTCCAAAAC",
    "CATGTCGGATCCATCGTAATGTAGCTTAAGTCGCGAAA",
    "TAGTAAAGGATCCATCCATTTTACGCTTAAGTCGAGGAT",
    "ACCAAATTGGATCCATCCTCCTTATTCAGGACCTAACCTG",
];

fn sequences() -> Vec<Sequence> {
    TWO_TIER
        .iter()
        .enumerate()
        .map(|(i, s)| Sequence::new(format!("seq{i}"), *s))
        .collect()
}

fn params(floor: usize) -> DiscoverParams {
    DiscoverParams {
        k: Some(5),
        initial_quota: Quota::Count(4),
        extend_quota: Quota::Count(4),
        add_anchor_quota: Quota::Count(floor),
        workers: 1,
        ..Default::default()
    }
}

fn loci(entries: &[(&str, usize, usize)]) -> BTreeMap<String, Locus> {
    entries
        .iter()
        .map(|&(id, start, end)| (id.to_string(), Locus::new(Span::new(start, end))))
        .collect()
}

fn cut_anchor(word: &str, entries: &[(&str, usize, usize, u64)]) -> Anchor {
    let loci = entries
        .iter()
        .map(|&(id, start, end, offset)| {
            (id.to_string(), Locus::new(Span::new(start, end)).with_offset(offset))
        })
        .collect();
    Anchor::new(word, loci, 1.0)
}

#[test]
fn motif_to_anchor_window() {
    let mut residues = vec![b'C'; 70];
    residues[12..15].copy_from_slice(b"ATG");
    let seq = Sequence::new("s1", residues);
    let other = Sequence::new("s2", vec![b'G'; 70]);

    let anchors = AnchorSet::new(vec![
        Anchor::new("CCCCC", loci(&[("s1", 2, 7), ("s2", 3, 8)]), 1.0),
        Anchor::new("CCCCCCCC", loci(&[("s1", 30, 40), ("s2", 31, 41)]), 1.0),
    ]);

    let cut = cutout(&anchors, std::slice::from_ref(&seq), "ATG<", "A1>+10").expect("cutout");
    assert_eq!(cut.len(), 1);
    assert_eq!(cut[0].residues, seq.residues[12..50].to_vec());
    assert_eq!(cut[0].offset, 12);

    // the motif is missing on s2
    let err = cutout(&anchors, &[seq, other], "ATG<", "A1>+10").unwrap_err();
    assert!(matches!(
        err,
        AnchorError::Resolution { source: ResolutionError::MotifNotFound { .. }, ref seq_id, .. } if seq_id == "s2"
    ));
}

#[test]
fn cutout_discovery_merges_back() {
    let full = SequenceCollection::new(sequences()).expect("collection");
    let strict = discover(&full, &params(4)).expect("discover");
    assert_eq!(strict.anchors.len(), 1);

    let cut = cutout(&strict.anchors, full.sequences(), "A0>", "end").expect("cutout");
    assert_eq!(cut.iter().map(|s| s.offset).collect::<Vec<_>>(), vec![13, 14, 15, 16]);

    // cutouts survive a trip through FASTA with their offsets
    let fasta = Builder::new().suffix(".fa").tempfile().expect("temp fasta");
    write_fasta_file(fasta.path(), &cut).expect("write fasta");
    let reread = FastaParser::parse_file(fasta.path()).expect("read fasta");
    assert_eq!(reread, cut);

    let inner = discover(&SequenceCollection::new(reread).unwrap(), &params(3)).expect("discover cut");
    assert_eq!(inner.anchors.len(), 1);
    let local = inner.anchors.get(0).unwrap();
    assert_eq!(local.locus("seq0").unwrap().span, Span::new(10, 18));
    assert_eq!(local.locus("seq0").unwrap().offset, 13);

    let merged = merge(&strict.anchors, &inner.anchors);
    let relaxed = discover(&full, &params(3)).expect("discover relaxed");
    assert_eq!(merged, relaxed.anchors);
    assert_eq!(merged.get(1).unwrap().locus("seq2").unwrap().span, Span::new(25, 33));
}

#[test]
fn anchor_edges_are_ordered() {
    let full = SequenceCollection::new(sequences()).expect("collection");
    let discovery = discover(&full, &params(3)).expect("discover");

    for seq in full.iter() {
        for anchor in &discovery.anchors {
            let Some(locus) = anchor.locus(&seq.id) else { continue };
            let lower = format!("A{}<", anchor.id);
            let upper = format!("A{}>", anchor.id);
            let window = cutout(&discovery.anchors, std::slice::from_ref(seq), &lower, &upper)
                .expect("anchor window");
            assert_eq!(window[0].residues.len(), locus.span.len());
        }
    }

    let err = cutout(&discovery.anchors, full.sequences(), "A9", "end").unwrap_err();
    assert!(err.is_resolution());
}

#[test]
fn combined_offsets_survive_anchor_files() {
    let full = AnchorSet::new(vec![
        cut_anchor("UPSTREAM", &[("a", 10, 18, 0), ("b", 12, 20, 0)]),
        cut_anchor("DOWNSTREAM", &[("a", 150, 158, 0), ("b", 152, 160, 0)]),
    ]);
    let cut = AnchorSet::new(vec![cut_anchor("MIDDLE", &[("a", 20, 26, 100), ("b", 25, 31, 90)])]);
    let inner = AnchorSet::new(vec![cut_anchor("INNER", &[("a", 2, 8, 130), ("b", 8, 14, 130)])]);

    let forward = merge(&merge(&full, &cut), &inner);
    let backward = merge(&merge(&inner, &cut), &full);
    assert_eq!(forward, backward);

    let words: Vec<&str> = forward.iter().map(|a| a.word.as_str()).collect();
    assert_eq!(words, vec!["UPSTREAM", "MIDDLE", "INNER", "DOWNSTREAM"]);
    assert!(forward.offsets().values().all(|&offset| offset == 0));
    assert_eq!(forward.get(1).unwrap().locus("b").unwrap().span, Span::new(115, 121));

    for suffix in [".gff", ".json"] {
        let file = Builder::new().suffix(suffix).tempfile().expect("temp anchors");
        write_anchors(&backward, file.path()).expect("write anchors");
        assert_eq!(read_anchors(file.path()).expect("read anchors"), backward, "{suffix}");
    }

    // positions on the uncut sequence agree whichever set came first
    let seq = Sequence::new("b", vec![b'A'; 200]);
    let window = cutout(&forward, std::slice::from_ref(&seq), "A1<", "A2>").expect("cutout");
    assert_eq!(window[0].offset, 115);
    assert_eq!(window[0].residues.len(), 144 - 115);
}
