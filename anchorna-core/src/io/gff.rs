//! GFF3 persistence of anchor sets
//!
//! One record per anchor member with 1-based inclusive coordinates:
//!
//! ```text
//! ##gff-version 3
//! #anchorna anchor file
//! #offset seq1 0
//! seq1	anchorna	anchor	6	13	1	+	.	Name=A0;word=GGATC
//! ```

use anyhow::Result;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::anchor::{Anchor, AnchorSet, Locus};
use crate::types::{Span, Strand};

const VERSION_HEADER: &str = "##gff-version 3";
const ANCHOR_HEADER: &str = "#anchorna anchor file";
const SOURCE: &str = "anchorna";
const FEATURE: &str = "anchor";

#[derive(Debug, Error)]
pub enum GffError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Missing header line \"{0}\", not an anchor file")]
    MissingHeader(&'static str),
    #[error("Line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
}

/// Reader and writer for anchor GFF files
pub struct AnchorGff;

impl AnchorGff {
    /// Write `anchors` to a file
    pub fn write_file<P: AsRef<Path>>(anchors: &AnchorSet, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        Self::write(anchors, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write<W: Write>(anchors: &AnchorSet, writer: &mut W) -> Result<()> {
        writeln!(writer, "{VERSION_HEADER}")?;
        writeln!(writer, "{ANCHOR_HEADER}")?;
        for (seq_id, offset) in anchors.offsets() {
            writeln!(writer, "#offset {seq_id} {offset}")?;
        }

        for anchor in anchors {
            for (seq_id, locus) in &anchor.loci {
                let phase = locus.frame.map_or_else(|| ".".to_string(), |f| f.to_string());
                writeln!(
                    writer,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\tName=A{};word={}",
                    seq_id,
                    SOURCE,
                    FEATURE,
                    locus.span.start + 1,
                    locus.span.end,
                    anchor.quota,
                    char::from(locus.strand),
                    phase,
                    anchor.id,
                    anchor.word
                )?;
            }
        }
        Ok(())
    }

    /// Read an anchor file, checking the anchor header
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<AnchorSet> {
        let file = File::open(path.as_ref())?;
        Self::read(BufReader::new(file), true)
    }

    pub fn read<R: BufRead>(reader: R, check_header: bool) -> Result<AnchorSet> {
        let mut offsets: HashMap<String, u64> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Anchor> = HashMap::new();
        let mut seen_version = false;
        let mut seen_anchor_header = false;

        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(GffError::Io)?;
            let line_num = idx + 1;
            let trimmed = line.trim_end();

            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with("##gff-version") {
                seen_version = true;
                continue;
            }
            if trimmed.eq_ignore_ascii_case(ANCHOR_HEADER) {
                seen_anchor_header = true;
                continue;
            }
            if let Some(rest) = trimmed.strip_prefix("#offset") {
                let (seq_id, offset) = parse_offset(rest, line_num)?;
                offsets.insert(seq_id, offset);
                continue;
            }
            if trimmed.starts_with('#') {
                continue;
            }

            if check_header && !(seen_version && seen_anchor_header) {
                let missing = if seen_version { ANCHOR_HEADER } else { VERSION_HEADER };
                return Err(GffError::MissingHeader(missing).into());
            }

            let record = parse_record(trimmed, line_num)?;
            let anchor = groups.entry(record.name.clone()).or_insert_with(|| {
                order.push(record.name.clone());
                Anchor::new(record.word.clone(), BTreeMap::new(), record.score)
            });
            if anchor.loci.contains_key(&record.seq_id) {
                return Err(GffError::InvalidRecord {
                    line: line_num,
                    message: format!("{} listed twice for sequence {}", record.name, record.seq_id),
                }
                .into());
            }
            anchor.loci.insert(record.seq_id, record.locus);
        }

        if check_header && !(seen_version && seen_anchor_header) {
            let missing = if seen_version { ANCHOR_HEADER } else { VERSION_HEADER };
            return Err(GffError::MissingHeader(missing).into());
        }

        let anchors = order
            .into_iter()
            .filter_map(|name| groups.remove(&name))
            .map(|mut anchor| {
                for (seq_id, locus) in anchor.loci.iter_mut() {
                    locus.offset = offsets.get(seq_id).copied().unwrap_or(0);
                }
                anchor
            })
            .collect();
        Ok(AnchorSet::new(anchors))
    }
}

struct Record {
    seq_id: String,
    name: String,
    word: String,
    score: f64,
    locus: Locus,
}

fn invalid(line: usize, message: impl Into<String>) -> GffError {
    GffError::InvalidRecord { line, message: message.into() }
}

fn parse_offset(rest: &str, line: usize) -> Result<(String, u64), GffError> {
    let fields: Vec<&str> = rest.split_whitespace().collect();
    match fields.as_slice() {
        [seq_id, offset] => {
            let offset = offset
                .parse()
                .map_err(|_| invalid(line, format!("invalid offset {offset}")))?;
            Ok((seq_id.to_string(), offset))
        }
        _ => Err(invalid(line, "expected \"#offset <seqid> <offset>\"")),
    }
}

fn parse_record(line: &str, line_num: usize) -> Result<Record, GffError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 9 {
        return Err(invalid(line_num, format!("expected 9 columns, found {}", fields.len())));
    }

    let start: usize = fields[3]
        .parse()
        .map_err(|_| invalid(line_num, format!("invalid start {}", fields[3])))?;
    let end: usize = fields[4]
        .parse()
        .map_err(|_| invalid(line_num, format!("invalid end {}", fields[4])))?;
    if start == 0 || end < start {
        return Err(invalid(line_num, format!("invalid range {start}-{end}")));
    }
    let score: f64 = fields[5]
        .parse()
        .map_err(|_| invalid(line_num, format!("invalid score {}", fields[5])))?;
    let strand = fields[6].chars().next().map(Strand::from).unwrap_or_default();
    let frame = match fields[7] {
        "." => None,
        phase => Some(
            phase
                .parse()
                .map_err(|_| invalid(line_num, format!("invalid phase {phase}")))?,
        ),
    };

    let attributes: HashMap<&str, &str> = fields[8]
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .collect();
    let name = attributes
        .get("Name")
        .ok_or_else(|| invalid(line_num, "missing Name attribute"))?
        .to_string();
    let word = attributes.get("word").copied().unwrap_or_default().to_string();

    Ok(Record {
        seq_id: fields[0].to_string(),
        name,
        word,
        score,
        locus: Locus {
            span: Span::new(start - 1, end),
            strand,
            frame,
            offset: 0,
        },
    })
}
