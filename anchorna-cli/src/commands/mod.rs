//! Command implementations for the AnchoRNA CLI

pub mod combine;
pub mod create;
pub mod cutout;
pub mod go;
pub mod print;

use anchorna_core::io::{read_anchors, FastaParser};
use anchorna_core::{AnchorSet, Selection, Sequence};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::CliError;

/// Load an anchor file given as `file|selection|removal`.
///
/// The selection keeps matching anchors, the removal then drops anchors by
/// their renumbered ids. Either part may be empty: `anchors.gff||3,7`.
pub fn load_anchors(spec: &str) -> Result<AnchorSet> {
    let mut parts = spec.split('|');
    let fname = parts.next().unwrap_or_default();
    let selection = parts.next().unwrap_or_default().trim();
    let removal = parts.next().unwrap_or_default().trim();
    if parts.next().is_some() {
        return Err(CliError::anchor_source(spec, "expected file|selection|removal").into());
    }
    if fname.is_empty() {
        return Err(CliError::anchor_source(spec, "missing file name").into());
    }

    let path = Path::new(fname);
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()).into());
    }
    let mut anchors = read_anchors(path)
        .with_context(|| format!("Failed to read anchors from {}", path.display()))?;
    log::debug!("Loaded {} anchors from {}", anchors.len(), path.display());

    if !selection.is_empty() {
        let selection: Selection = selection.parse()?;
        anchors = anchors.select(&selection);
        log::debug!("Selected {} anchors with {selection}", anchors.len());
    }
    if !removal.is_empty() {
        let removal: Selection = removal.parse()?;
        anchors = anchors.remove(&removal.ids(anchors.len()));
        log::debug!("Removed anchors {removal}, {} left", anchors.len());
    }
    Ok(anchors)
}

/// Sequence file from the command line, falling back to `[input] fname`
pub fn sequence_file(config: &Config, fname: Option<PathBuf>) -> Result<PathBuf> {
    let path = fname
        .or_else(|| config.input.fname.clone())
        .ok_or_else(|| CliError::config("no sequence file given and [input] fname is not set"))?;
    if !path.exists() {
        return Err(CliError::file_not_found(path).into());
    }
    Ok(path)
}

pub fn load_sequences(path: &Path) -> Result<Vec<Sequence>> {
    let sequences = FastaParser::parse_file(path)
        .with_context(|| format!("Failed to read sequences from {}", path.display()))?;
    log::info!("Read {} sequences from {}", sequences.len(), path.display());
    Ok(sequences)
}

/// Refuse to clobber `path` unless `force` is set
pub fn check_output(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::file_exists(path.to_path_buf()).into());
    }
    Ok(())
}
