//! Combine command implementation - select, remove and merge anchor files

use anchorna_core::io::write_anchors;
use anchorna_core::MergeOptions;
use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{check_output, load_anchors};

pub fn execute(sources: Vec<String>, out: PathBuf, max_overlap: f64, force: bool) -> Result<()> {
    check_output(&out, force)?;
    let options = MergeOptions { max_overlap };

    let mut sources = sources.iter();
    let first = sources.next().context("No anchor files to combine")?;
    let mut combined = load_anchors(first)?;
    log::info!("Starting from {} anchors of {first}", combined.len());

    for source in sources {
        let anchors = load_anchors(source)?;
        let before = combined.len();
        combined = combined.merge_with(&anchors, &options);
        log::info!(
            "Merged {} anchors of {source}, {} added",
            anchors.len(),
            combined.len().saturating_sub(before)
        );
    }

    write_anchors(&combined, &out)
        .with_context(|| format!("Failed to write anchors: {}", out.display()))?;
    log::info!("{} anchors written to: {}", combined.len(), out.display());
    Ok(())
}
