//! Error types shared by discovery, curation and position resolution.

use thiserror::Error;

/// Result type for core operations
pub type AnchorResult<T> = Result<T, AnchorError>;

/// Errors raised by the core library
#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Malformed position expression \"{expression}\": {reason}")]
    MalformedExpression { expression: String, reason: String },

    #[error("Cannot resolve \"{expression}\" on sequence {seq_id}: {source}")]
    Resolution {
        expression: String,
        seq_id: String,
        #[source]
        source: ResolutionError,
    },

    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl AnchorError {
    /// True for every failure of the position expression resolver.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            AnchorError::MalformedExpression { .. } | AnchorError::Resolution { .. }
        )
    }

    pub fn malformed(expression: &str, reason: impl Into<String>) -> Self {
        AnchorError::MalformedExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// Reasons a well-formed expression fails on a particular sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("anchor A{index} does not exist (anchor set has {count} anchors)")]
    UnknownAnchor { index: usize, count: usize },

    #[error("anchor A{index} does not cover this sequence")]
    NotAMember { index: usize },

    #[error("motif {motif} not found")]
    MotifNotFound { motif: String },

    #[error("position {position} outside of sequence of length {len}")]
    OutOfBounds { position: i64, len: usize },

    #[error("lower bound {lower} lies after upper bound {upper}")]
    EmptyWindow { lower: usize, upper: usize },
}
