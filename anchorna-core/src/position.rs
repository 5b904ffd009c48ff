//! Position expressions and anchor-relative cutouts
//!
//! An expression names a target and optionally a side and a shift:
//!
//! ```text
//! A3        anchor 3          ATG<      start of the first ATG
//! A3>       right edge        A3^-5     five residues before the middle of anchor 3
//! start     sequence start    end       sequence end
//! ```
//!
//! Without a side an anchor or motif covers its whole span: as a lower
//! bound it resolves to the left edge, as an upper bound to the right edge.

use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::anchor::AnchorSet;
use crate::error::{AnchorError, AnchorResult, ResolutionError};
use crate::types::Sequence;

const EXPRESSION_PATTERN: &str =
    r"^(?:(?P<anchor>[aA]\d+)|(?P<word>[A-Za-z*]+))(?P<side>[<>^])?(?P<shift>[+-]\d+)?$";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Anchor(usize),
    /// Residue literal, matched case-insensitively
    Motif(String),
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    /// Floor-rounded midpoint
    Middle,
}

/// Role of a resolved position, selects the default side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
    Point,
}

/// Compiled once per process
fn expression_regex() -> AnchorResult<&'static Regex> {
    static EXPRESSION: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    EXPRESSION
        .get_or_init(|| Regex::new(EXPRESSION_PATTERN))
        .as_ref()
        .map_err(|e| AnchorError::InvalidConfiguration(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionExpr {
    pub target: Target,
    pub side: Option<Side>,
    pub shift: i64,
    text: String,
}

impl PositionExpr {
    pub fn parse(expression: &str) -> AnchorResult<Self> {
        let text = expression.trim();
        let caps = expression_regex()?
            .captures(text)
            .ok_or_else(|| AnchorError::malformed(expression, "expected A<n>, a motif, start or end"))?;

        let side = caps.name("side").map(|m| match m.as_str() {
            "<" => Side::Left,
            ">" => Side::Right,
            _ => Side::Middle,
        });
        let shift = match caps.name("shift") {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| AnchorError::malformed(expression, "shift out of range"))?,
            None => 0,
        };

        let target = if let Some(m) = caps.name("anchor") {
            let index = m.as_str()[1..]
                .parse()
                .map_err(|_| AnchorError::malformed(expression, "anchor index out of range"))?;
            Target::Anchor(index)
        } else {
            match caps.name("word").map(|m| m.as_str()) {
                Some("start") => Target::Start,
                Some("end") => Target::End,
                Some(word) => Target::Motif(word.to_ascii_uppercase()),
                None => return Err(AnchorError::malformed(expression, "missing target")),
            }
        };
        if matches!(target, Target::Start | Target::End) && side.is_some() {
            return Err(AnchorError::malformed(expression, "start and end take no side"));
        }

        Ok(Self { target, side, shift, text: text.to_string() })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Resolve to a position in `[0, seq.len()]`.
    pub fn resolve_bound(&self, anchors: &AnchorSet, seq: &Sequence, bound: Bound) -> AnchorResult<usize> {
        let fail = |source| AnchorError::Resolution {
            expression: self.text.clone(),
            seq_id: seq.id.clone(),
            source,
        };
        let len = seq.len();

        let base = match &self.target {
            Target::Start => 0,
            Target::End => len as i64,
            Target::Anchor(index) => {
                let index = *index;
                let anchor = anchors.get(index).ok_or_else(|| {
                    fail(ResolutionError::UnknownAnchor { index, count: anchors.len() })
                })?;
                let locus = anchor
                    .locus(&seq.id)
                    .ok_or_else(|| fail(ResolutionError::NotAMember { index }))?;
                let rebase = locus.offset as i64 - seq.offset as i64;
                self.pick(
                    locus.span.start as i64 + rebase,
                    locus.span.end as i64 + rebase,
                    bound,
                )
            }
            Target::Motif(motif) => {
                let start = find_motif(&seq.residues, motif.as_bytes())
                    .ok_or_else(|| fail(ResolutionError::MotifNotFound { motif: motif.clone() }))?;
                self.pick(start as i64, (start + motif.len()) as i64, bound)
            }
        };

        let position = base + self.shift;
        if position < 0 || position > len as i64 {
            return Err(fail(ResolutionError::OutOfBounds { position, len }));
        }
        Ok(position as usize)
    }

    /// Resolve as a single coordinate.
    pub fn resolve(&self, anchors: &AnchorSet, seq: &Sequence) -> AnchorResult<usize> {
        self.resolve_bound(anchors, seq, Bound::Point)
    }

    fn pick(&self, start: i64, end: i64, bound: Bound) -> i64 {
        let side = self.side.unwrap_or(match bound {
            Bound::Upper => Side::Right,
            Bound::Lower | Bound::Point => Side::Left,
        });
        match side {
            Side::Left => start,
            Side::Right => end,
            Side::Middle => start + (end - start) / 2,
        }
    }
}

impl FromStr for PositionExpr {
    type Err = AnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PositionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn find_motif(residues: &[u8], motif: &[u8]) -> Option<usize> {
    if motif.is_empty() || motif.len() > residues.len() {
        return None;
    }
    residues
        .windows(motif.len())
        .position(|window| window.eq_ignore_ascii_case(motif))
}

/// Resolve `expression` to a single position on `seq`.
pub fn resolve(expression: &str, anchors: &AnchorSet, seq: &Sequence) -> AnchorResult<usize> {
    PositionExpr::parse(expression)?.resolve(anchors, seq)
}

/// Cut every sequence between the positions `lower` and `upper` resolve to.
///
/// Cutouts carry the provenance offset of their first residue so anchors
/// found on them can be merged back into `anchors`.
pub fn cutout(
    anchors: &AnchorSet,
    sequences: &[Sequence],
    lower: &str,
    upper: &str,
) -> AnchorResult<Vec<Sequence>> {
    let lower = PositionExpr::parse(lower)?;
    let upper = PositionExpr::parse(upper)?;

    sequences
        .iter()
        .map(|seq| {
            let start = lower.resolve_bound(anchors, seq, Bound::Lower)?;
            let end = upper.resolve_bound(anchors, seq, Bound::Upper)?;
            if start > end {
                return Err(AnchorError::Resolution {
                    expression: format!("{lower} {upper}"),
                    seq_id: seq.id.clone(),
                    source: ResolutionError::EmptyWindow { lower: start, upper: end },
                });
            }
            Ok(Sequence {
                id: seq.id.clone(),
                residues: seq.residues[start..end].to_vec(),
                offset: seq.offset + start as u64,
                strand: seq.strand,
                frame: seq.frame,
            })
        })
        .collect()
}
