//! Error taxonomy for the ingestion core.
//!
//! Only two conditions are raised as errors: malformed input and persistence
//! failure. Depth limits and fan-out truncation are reported as values on the
//! walker's result (see [`crate::ingest::types::SourceResult`]).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MmiError {
    /// The input is not a tree of mappings, sequences, and JSON-compatible scalars.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The manifest or event log could not be written.
    #[error("persistence failed for {}: {source}", path.display())]
    PersistenceFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest could not be encoded or decoded.
    #[error("manifest serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MmiError {
    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PersistenceFailed {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, MmiError>;
