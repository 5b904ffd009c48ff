use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{AnchorError, AnchorResult};

/// Half-open residue range `[start, end)` on one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn overlap_len(&self, other: &Span) -> usize {
        self.end.min(other.end).saturating_sub(self.start.max(other.start))
    }

    /// Floor-rounded midpoint.
    pub fn midpoint(&self) -> usize {
        self.start + self.len() / 2
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl From<char> for Strand {
    fn from(c: char) -> Self {
        match c {
            '+' => Strand::Forward,
            '-' => Strand::Reverse,
            _ => Strand::Unknown,
        }
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unknown => '.',
        }
    }
}

/// Residue alphabet of a sequence collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alphabet {
    #[serde(rename = "nt", alias = "nucleotide")]
    Nucleotide,
    #[serde(rename = "aa", alias = "amino acid")]
    AminoAcid,
}

const AMINO_ACIDS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";
/// Nucleotides, IUPAC ambiguity codes and gaps
const NUCLEOTIDE_SYMBOLS: &[u8] = b"ACGTURYKMSWBDHVN-.";

impl Alphabet {
    /// Default seed word length.
    pub fn default_k(&self) -> usize {
        match self {
            Alphabet::Nucleotide => 12,
            Alphabet::AminoAcid => 5,
        }
    }

    /// Normalize a residue to its canonical upper-case form.
    ///
    /// Returns `None` for ambiguous symbols, gaps and stop codons. Those never
    /// take part in seeding or extension.
    pub fn normalize(&self, residue: u8) -> Option<u8> {
        let upper = residue.to_ascii_uppercase();
        match self {
            Alphabet::Nucleotide => match upper {
                b'A' | b'C' | b'G' | b'T' => Some(upper),
                b'U' => Some(b'T'),
                _ => None,
            },
            Alphabet::AminoAcid => AMINO_ACIDS.contains(&upper).then_some(upper),
        }
    }

    /// Guess the alphabet from the residues of all sequences.
    ///
    /// Sequences written only in nucleotide and IUPAC ambiguity symbols are
    /// nucleotide; the ambiguity codes still normalize to `None`.
    pub fn detect(sequences: &[Sequence]) -> Alphabet {
        let nucleotide_like = sequences.iter().all(|seq| {
            seq.residues
                .iter()
                .all(|r| NUCLEOTIDE_SYMBOLS.contains(&r.to_ascii_uppercase()))
        });
        if nucleotide_like {
            Alphabet::Nucleotide
        } else {
            Alphabet::AminoAcid
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Alphabet::Nucleotide => "nucleotide",
            Alphabet::AminoAcid => "amino acid",
        }
    }
}

impl FromStr for Alphabet {
    type Err = AnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nt" | "nucleotide" => Ok(Alphabet::Nucleotide),
            "aa" | "amino acid" | "protein" => Ok(Alphabet::AminoAcid),
            other => Err(AnchorError::InvalidConfiguration(format!(
                "unknown alphabet {other}, expected nt or aa"
            ))),
        }
    }
}

/// A named residue sequence with provenance metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    pub residues: Vec<u8>,
    /// Position of residue 0 in the sequence this one was cut from; 0 for full sequences.
    pub offset: u64,
    pub strand: Strand,
    pub frame: Option<u8>,
}

impl Sequence {
    pub fn new(id: impl Into<String>, residues: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            residues: residues.into(),
            offset: 0,
            strand: Strand::Unknown,
            frame: None,
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_strand(mut self, strand: Strand) -> Self {
        self.strand = strand;
        self
    }

    pub fn with_frame(mut self, frame: u8) -> Self {
        self.frame = Some(frame);
        self
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

/// Validated input of one discovery run.
#[derive(Debug, Clone)]
pub struct SequenceCollection {
    sequences: Vec<Sequence>,
    alphabet: Alphabet,
}

impl SequenceCollection {
    /// Build a collection, detecting the alphabet from the residues.
    pub fn new(sequences: Vec<Sequence>) -> AnchorResult<Self> {
        let alphabet = Alphabet::detect(&sequences);
        Self::with_alphabet(sequences, alphabet)
    }

    pub fn with_alphabet(sequences: Vec<Sequence>, alphabet: Alphabet) -> AnchorResult<Self> {
        if sequences.len() < 2 {
            return Err(AnchorError::EmptyInput(format!(
                "need at least two sequences, got {}",
                sequences.len()
            )));
        }
        if let Some(seq) = sequences.iter().find(|seq| seq.is_empty()) {
            return Err(AnchorError::EmptyInput(format!(
                "sequence {} has no residues",
                seq.id
            )));
        }
        let mut seen = HashSet::new();
        for seq in &sequences {
            if !seen.insert(seq.id.as_str()) {
                return Err(AnchorError::InvalidConfiguration(format!(
                    "duplicate sequence identifier {}",
                    seq.id
                )));
            }
        }
        Ok(Self { sequences, alphabet })
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.sequences.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.sequences.iter().position(|seq| seq.id == id)
    }

    pub fn min_len(&self) -> usize {
        self.sequences.iter().map(Sequence::len).min().unwrap_or(0)
    }

    pub fn into_sequences(self) -> Vec<Sequence> {
        self.sequences
    }
}
