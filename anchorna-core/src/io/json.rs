//! JSON export and import of anchor sets

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::anchor::AnchorSet;

pub fn write_json<W: Write>(anchors: &AnchorSet, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, anchors).context("Failed to serialize anchors")?;
    Ok(())
}

pub fn read_json<R: Read>(reader: R) -> Result<AnchorSet> {
    let anchors: AnchorSet = serde_json::from_reader(reader).context("Failed to parse anchor JSON")?;
    // ids in the file are not trusted
    Ok(AnchorSet::new(anchors.into_anchors()))
}

pub fn write_json_file<P: AsRef<Path>>(anchors: &AnchorSet, path: P) -> Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("Failed to create {}", path.as_ref().display()))?;
    let mut writer = BufWriter::new(file);
    write_json(anchors, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<AnchorSet> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("Failed to open {}", path.as_ref().display()))?;
    read_json(BufReader::new(file))
}
