//! Create command implementation - write an example configuration file

use anyhow::{Context, Result};
use std::path::PathBuf;

use super::check_output;
use crate::config::Config;

pub fn execute(out: PathBuf, force: bool) -> Result<()> {
    check_output(&out, force)?;

    let content = Config::example_toml()?;
    std::fs::write(&out, content)
        .with_context(|| format!("Failed to write configuration file: {}", out.display()))?;

    log::info!("Example configuration written to: {}", out.display());
    log::info!("Set [input] fname and run: anchorna go --config {}", out.display());
    Ok(())
}
