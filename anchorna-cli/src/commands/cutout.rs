//! Cutout command implementation - extract windows between two positions

use anchorna_core::cutout;
use anchorna_core::io::write_fasta_file;
use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{check_output, load_anchors, load_sequences, sequence_file};
use crate::config::Config;

pub fn execute(
    config: &Config,
    anchors: &str,
    lower: &str,
    upper: &str,
    fname: Option<PathBuf>,
    out: PathBuf,
    force: bool,
) -> Result<()> {
    check_output(&out, force)?;
    let anchors = load_anchors(anchors)?;
    let path = sequence_file(config, fname)?;
    let sequences = load_sequences(&path)?;

    log::info!("Cutting out {lower} .. {upper}");
    let windows = cutout(&anchors, &sequences, lower, upper)
        .with_context(|| format!("Failed to cut out {lower} .. {upper}"))?;

    write_fasta_file(&out, &windows)
        .with_context(|| format!("Failed to write sequences: {}", out.display()))?;
    log::info!("{} sequences written to: {}", windows.len(), out.display());
    Ok(())
}
