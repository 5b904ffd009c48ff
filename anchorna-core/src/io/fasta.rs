//! FASTA sequence input and output
//!
//! Parsing goes through needletail, gzip input is detected by extension.
//! Header tokens `offset=N`, `strand=+|-` and `frame=N` carry cutout
//! provenance and are written back by [`write_fasta`].

use anyhow::Result;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use needletail::{parse_fastx_file, parse_fastx_reader};
use crate::types::{Sequence, Strand};

const LINE_WIDTH: usize = 60;

#[derive(Debug, Error)]
pub enum FastaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid header \"{header}\": {message}")]
    InvalidHeader { header: String, message: String },
    #[error("Empty file or no sequences found")]
    EmptyFile,
}

/// FASTA/FASTQ parser for sequence collections
pub struct FastaParser;

impl FastaParser {
    /// Parse a FASTA/FASTQ file, gzipped if the name ends in `.gz`
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<Sequence>> {
        let path_str = path.as_ref().to_string_lossy();

        if path_str.ends_with(".gz") {
            let file = File::open(path.as_ref())?;
            Self::parse_reader(BufReader::new(GzDecoder::new(file)))
        } else {
            let mut reader = parse_fastx_file(path.as_ref())
                .map_err(|e| FastaError::Parse(e.to_string()))?;
            let mut sequences = Vec::new();
            while let Some(record) = reader.next() {
                let record = record.map_err(|e| FastaError::Parse(e.to_string()))?;
                sequences.push(Self::record_to_sequence(&record)?);
            }
            Self::non_empty(sequences)
        }
    }

    /// Parse FASTA/FASTQ data from any readable source
    pub fn parse_reader<R: std::io::Read + Send>(reader: R) -> Result<Vec<Sequence>> {
        let mut sequences = Vec::new();
        let mut fastx_reader = parse_fastx_reader(reader)
            .map_err(|e| FastaError::Parse(e.to_string()))?;

        while let Some(record) = fastx_reader.next() {
            let record = record.map_err(|e| FastaError::Parse(e.to_string()))?;
            sequences.push(Self::record_to_sequence(&record)?);
        }

        Self::non_empty(sequences)
    }

    fn non_empty(sequences: Vec<Sequence>) -> Result<Vec<Sequence>> {
        if sequences.is_empty() {
            Err(FastaError::EmptyFile.into())
        } else {
            Ok(sequences)
        }
    }

    fn record_to_sequence(record: &needletail::parser::SequenceRecord) -> Result<Sequence> {
        let header = String::from_utf8_lossy(record.id()).to_string();
        let mut sequence = parse_header(&header)?;
        sequence.residues = record.seq().to_vec();
        Ok(sequence)
    }
}

/// Sequence with id and provenance metadata from a header line, no residues.
fn parse_header(header: &str) -> Result<Sequence, FastaError> {
    let mut tokens = header.split_whitespace();
    let id = tokens.next().ok_or_else(|| FastaError::InvalidHeader {
        header: header.to_string(),
        message: "missing identifier".to_string(),
    })?;
    let mut sequence = Sequence::new(id, Vec::new());
    let invalid = |message: String| FastaError::InvalidHeader {
        header: header.to_string(),
        message,
    };

    for token in tokens {
        match token.split_once('=') {
            Some(("offset", value)) => {
                sequence.offset = value
                    .parse()
                    .map_err(|_| invalid(format!("invalid offset {value}")))?;
            }
            Some(("strand", value)) => {
                sequence.strand = value.chars().next().map(Strand::from).unwrap_or_default();
            }
            Some(("frame", value)) => {
                sequence.frame = Some(
                    value
                        .parse()
                        .map_err(|_| invalid(format!("invalid frame {value}")))?,
                );
            }
            _ => {}
        }
    }
    Ok(sequence)
}

/// Write sequences as FASTA, keeping provenance in the header
pub fn write_fasta<W: Write>(writer: &mut W, sequences: &[Sequence]) -> std::io::Result<()> {
    for seq in sequences {
        write!(writer, ">{}", seq.id)?;
        if seq.offset != 0 {
            write!(writer, " offset={}", seq.offset)?;
        }
        if seq.strand != Strand::Unknown {
            write!(writer, " strand={}", char::from(seq.strand))?;
        }
        if let Some(frame) = seq.frame {
            write!(writer, " frame={frame}")?;
        }
        writeln!(writer)?;
        for chunk in seq.residues.chunks(LINE_WIDTH) {
            writer.write_all(chunk)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}

pub fn write_fasta_file<P: AsRef<Path>>(path: P, sequences: &[Sequence]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_fasta(&mut writer, sequences)?;
    writer.flush()?;
    Ok(())
}
