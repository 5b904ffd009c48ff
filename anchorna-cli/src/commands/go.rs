//! Go command implementation - discover anchors in a sequence file

use anchorna_core::io::write_anchors;
use anchorna_core::{
    discover, Alphabet, DiscoverParams, Quota, SearchStatus, Sequence, SequenceCollection,
};
use anyhow::{Context, Result};
use std::path::PathBuf;

use super::{check_output, load_sequences, sequence_file};
use crate::config::Config;

/// Command line overrides of the `[discover]` section
#[derive(Debug, Default)]
pub struct Overrides {
    pub k: Option<usize>,
    pub initial_quota: Option<Quota>,
    pub extend_quota: Option<Quota>,
    pub add_anchor_quota: Option<Quota>,
    pub max_rounds: Option<usize>,
    pub keep_contradicting: bool,
}

impl Overrides {
    fn apply(self, mut params: DiscoverParams) -> DiscoverParams {
        if self.k.is_some() {
            params.k = self.k;
        }
        if let Some(quota) = self.initial_quota {
            params.initial_quota = quota;
        }
        if let Some(quota) = self.extend_quota {
            params.extend_quota = quota;
        }
        if let Some(quota) = self.add_anchor_quota {
            params.add_anchor_quota = quota;
        }
        if let Some(max_rounds) = self.max_rounds {
            params.max_rounds = max_rounds;
        }
        if self.keep_contradicting {
            params.remove_contradicting = false;
        }
        params
    }
}

/// Collection in the given alphabet, or the detected one when unset
fn collect(sequences: Vec<Sequence>, alphabet: Option<Alphabet>) -> Result<SequenceCollection> {
    let collection = match alphabet {
        Some(alphabet) => SequenceCollection::with_alphabet(sequences, alphabet),
        None => SequenceCollection::new(sequences),
    };
    collection.context("Invalid sequence collection")
}

#[allow(clippy::too_many_arguments)]
pub fn execute(
    config: &Config,
    threads: usize,
    fname: Option<PathBuf>,
    alphabet: Option<Alphabet>,
    out: PathBuf,
    removed_out: Option<PathBuf>,
    overrides: Overrides,
    force: bool,
) -> Result<()> {
    log::info!("Starting anchor discovery");
    check_output(&out, force)?;
    let removed_out = removed_out.or_else(|| config.discover.removed_anchors_path.clone());
    if let Some(path) = &removed_out {
        check_output(path, force)?;
    }

    let path = sequence_file(config, fname)?;
    let sequences = load_sequences(&path)?;
    let collection = collect(sequences, alphabet.or(config.input.alphabet))?;
    log::info!(
        "Collection of {} {} sequences, shortest {} residues",
        collection.len(),
        collection.alphabet().name(),
        collection.min_len()
    );

    let params = overrides.apply(config.discover.params(threads));
    log::debug!("Discovery parameters: {params:?}");

    let discovery = discover(&collection, &params).context("Anchor discovery failed")?;
    if let SearchStatus::Exhausted { quota } = discovery.status {
        log::warn!(
            "Stopped after {} rounds at quota {quota}, raise max_rounds to search further",
            discovery.rounds
        );
    }

    write_anchors(&discovery.anchors, &out)
        .with_context(|| format!("Failed to write anchors: {}", out.display()))?;
    log::info!("{} anchors written to: {}", discovery.anchors.len(), out.display());

    if let Some(path) = removed_out {
        write_anchors(&discovery.removed, &path)
            .with_context(|| format!("Failed to write removed anchors: {}", path.display()))?;
        log::info!(
            "{} contradicting anchors written to: {}",
            discovery.removed.len(),
            path.display()
        );
    }

    Ok(())
}
