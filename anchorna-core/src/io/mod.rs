//! File formats for sequences and anchors

#[cfg(feature = "io-fasta")]
pub mod fasta;
#[cfg(feature = "io-gff")]
pub mod gff;
#[cfg(feature = "io-json")]
pub mod json;

#[cfg(feature = "io-fasta")]
pub use fasta::{write_fasta, write_fasta_file, FastaError, FastaParser};
#[cfg(feature = "io-gff")]
pub use gff::{AnchorGff, GffError};
#[cfg(feature = "io-json")]
pub use json::{read_json, read_json_file, write_json, write_json_file};

use anyhow::Result;
use std::path::Path;

use crate::anchor::AnchorSet;

/// Read anchors from a GFF or, for `.json` paths, a JSON file
#[cfg(all(feature = "io-gff", feature = "io-json"))]
pub fn read_anchors<P: AsRef<Path>>(path: P) -> Result<AnchorSet> {
    if is_json(path.as_ref()) {
        read_json_file(path)
    } else {
        AnchorGff::read_file(path)
    }
}

/// Write anchors as GFF or, for `.json` paths, JSON
#[cfg(all(feature = "io-gff", feature = "io-json"))]
pub fn write_anchors<P: AsRef<Path>>(anchors: &AnchorSet, path: P) -> Result<()> {
    if is_json(path.as_ref()) {
        write_json_file(anchors, path)
    } else {
        AnchorGff::write_file(anchors, path)
    }
}

#[cfg(all(feature = "io-gff", feature = "io-json"))]
fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
