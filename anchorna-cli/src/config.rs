//! Configuration handling for the AnchoRNA CLI
//!
//! Supports loading configuration from anchorna.toml files with CLI argument overrides.

use anchorna_core::{Alphabet, DiscoverParams, Quota};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "anchorna.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub discover: DiscoverConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Worker threads for discovery, 0 uses all cores
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// Sequence file (FASTA, optionally gzipped)
    #[serde(default)]
    pub fname: Option<PathBuf>,

    /// Residue alphabet, `nt` or `aa`; detected from the residues when unset
    #[serde(default)]
    pub alphabet: Option<Alphabet>,
}

/// The `[discover]` section: discovery parameters plus output paths
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscoverConfig {
    #[serde(flatten)]
    pub params: DiscoverParams,

    /// Where to write anchors dropped as contradicting
    #[serde(default)]
    pub removed_anchors_path: Option<PathBuf>,
}

fn default_threads() -> usize { num_cpus::get() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { threads: default_threads() }
    }
}

impl DiscoverConfig {
    /// Discovery parameters running on `workers` threads
    pub fn params(&self, workers: usize) -> DiscoverParams {
        DiscoverParams { workers, ..self.params.clone() }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    log::info!("Loading configuration from: {DEFAULT_CONFIG_FILE}");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }

    /// Example configuration file content
    pub fn example_toml() -> Result<String> {
        let mut config = Self::default();
        config.input.fname = Some(PathBuf::from("sequences.fasta"));
        config.input.alphabet = Some(Alphabet::Nucleotide);
        config.discover.removed_anchors_path = Some(PathBuf::from("removed_anchors.gff"));
        toml::to_string_pretty(&config).context("Failed to serialize default configuration")
    }
}
