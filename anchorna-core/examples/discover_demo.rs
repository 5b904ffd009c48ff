//! AnchoRNA discovery demo
//!
//! Finds anchors in a handful of related sequences, then cuts out the
//! region between the first anchor and the sequence end.

use anchorna_core::{cutout, discover, DiscoverParams, Quota, Sequence, SequenceCollection};

fn main() -> anyhow::Result<()> {
    println!("AnchoRNA Discovery Demo");
    println!("=======================\n");

    let raw = [
        "TTTCCGGATCCATTCATGCAATTCTTAAGTCCAAAAC",
        "CATGTCGGATCCATCGTAATGTAGCTTAAGTCGCGAAA",
        "TAGTAAAGGATCCATCCATTTTACGCTTAAGTCGAGGAT",
        "ACCAAATTGGATCCATCCTCCTTATTCAGGACCTAACCTG",
    ];
    let sequences: Vec<Sequence> = raw
        .iter()
        .enumerate()
        .map(|(i, s)| Sequence::new(format!("seq{}", i + 1), *s))
        .collect();
    for seq in &sequences {
        println!("{:>5}: {}", seq.id, String::from_utf8_lossy(&seq.residues));
    }
    println!();

    let collection = SequenceCollection::new(sequences)?;
    let params = DiscoverParams {
        k: Some(5),
        initial_quota: Quota::Frac(1.0),
        extend_quota: Quota::Frac(1.0),
        add_anchor_quota: Quota::Frac(0.75),
        ..Default::default()
    };

    let discovery = discover(&collection, &params)?;
    println!(
        "Found {} anchors in {} rounds ({:?})",
        discovery.anchors.len(),
        discovery.rounds,
        discovery.status
    );
    print!("{}", discovery.anchors.to_text(true));
    println!();

    let cut = cutout(&discovery.anchors, collection.sequences(), "A0>", "end")?;
    println!("Cutout A0> .. end");
    for seq in &cut {
        println!(
            "{:>5}: offset {:>2}  {}",
            seq.id,
            seq.offset,
            String::from_utf8_lossy(&seq.residues)
        );
    }
    Ok(())
}
