//! Print command implementation - list the anchors of an anchor file

use anyhow::Result;

use super::load_anchors;

pub fn execute(anchors: &str, members: bool) -> Result<()> {
    let anchors = load_anchors(anchors)?;
    log::info!("{} anchors on {} sequences", anchors.len(), anchors.sequence_ids().len());
    print!("{}", anchors.to_text(members));
    Ok(())
}
