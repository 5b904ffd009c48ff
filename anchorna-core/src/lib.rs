//! AnchoRNA Core Library
//!
//! Anchor discovery over homologous sequences, anchor set curation and
//! anchor-relative cutouts.

pub mod types;
pub mod error;
pub mod discover;
pub mod anchor;
pub mod selection;
pub mod position;
pub mod io;

// Re-export commonly used types and functions
pub use types::{Alphabet, Sequence, SequenceCollection, Span, Strand};
pub use error::{AnchorError, AnchorResult, ResolutionError};
pub use discover::{discover, DiscoverParams, Discovery, Quota, SearchStatus};
pub use anchor::{merge, remove, Anchor, AnchorSet, Locus, MergeOptions};
pub use selection::Selection;
pub use position::{cutout, resolve, Bound, PositionExpr, Side, Target};

/// Version information for the AnchoRNA core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
