//! Anchor selection expressions such as `a5:a10,a12,20:`

use std::fmt;
use std::str::FromStr;

use crate::error::{AnchorError, AnchorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    Single(usize),
    /// Half-open id range; open ends reach the set boundaries
    Range { start: Option<usize>, end: Option<usize> },
}

/// Comma separated anchor ids and half-open id ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    parts: Vec<Part>,
    text: String,
}

impl Selection {
    pub fn parse(text: &str) -> AnchorResult<Self> {
        let mut parts = Vec::new();
        for raw in text.split(',') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let part = match raw.split_once(':') {
                Some((start, end)) => Part::Range {
                    start: parse_bound(start, text)?,
                    end: parse_bound(end, text)?,
                },
                None => match parse_bound(raw, text)? {
                    Some(id) => Part::Single(id),
                    None => return Err(invalid(text, "empty anchor id")),
                },
            };
            parts.push(part);
        }
        if parts.is_empty() {
            return Err(invalid(text, "selects nothing"));
        }
        Ok(Self { parts, text: text.to_string() })
    }

    pub fn contains(&self, id: usize) -> bool {
        self.parts.iter().any(|part| match *part {
            Part::Single(single) => single == id,
            Part::Range { start, end } => {
                start.map_or(true, |s| id >= s) && end.map_or(true, |e| id < e)
            }
        })
    }

    /// Selected ids below `count`, ascending.
    pub fn ids(&self, count: usize) -> Vec<usize> {
        (0..count).filter(|&id| self.contains(id)).collect()
    }
}

fn parse_bound(token: &str, text: &str) -> AnchorResult<Option<usize>> {
    let token = token.trim();
    let digits = token
        .strip_prefix('a')
        .or_else(|| token.strip_prefix('A'))
        .unwrap_or(token);
    if digits.is_empty() {
        return if token.is_empty() {
            Ok(None)
        } else {
            Err(invalid(text, "anchor prefix without id"))
        };
    }
    digits
        .parse()
        .map(Some)
        .map_err(|_| invalid(text, &format!("invalid anchor id {token}")))
}

fn invalid(text: &str, reason: &str) -> AnchorError {
    AnchorError::InvalidConfiguration(format!("invalid anchor selection \"{text}\": {reason}"))
}

impl FromStr for Selection {
    type Err = AnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
