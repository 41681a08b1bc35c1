use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Which end of the selected region a marker search was looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Begin,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Begin => f.write_str("begin"),
            Boundary::End => f.write_str("end"),
        }
    }
}

/// Errors raised by normalization, the corpus store and the analysis pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// No line contains the marker substring
    #[error("{boundary} marker {marker:?} not found in input")]
    BoundaryNotFound { boundary: Boundary, marker: String },

    /// The persisted corpus and label artifacts disagree
    #[error("corpus store is inconsistent: {reason}")]
    StoreInconsistent { reason: String },

    /// Another process holds the store lock
    #[error("corpus store is locked by {}", path.display())]
    StoreLocked { path: PathBuf },

    #[error("analysis needs at least one document in the corpus")]
    EmptyCorpus,

    #[error("document index {index} out of range for a corpus of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("store artifact codec error: {0}")]
    Codec(#[from] serde_cbor::Error),

    #[error("source fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
