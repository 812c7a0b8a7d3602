//! Export failure taxonomy

use thiserror::Error;

/// Errors raised while writing, reading, or evaluating interchange graphs.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid graph header: {0}")]
    Header(#[from] serde_json::Error),

    #[error("not a QTGF file (bad magic)")]
    BadMagic,

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("payload truncated: header declares {expected} values, file holds {actual}")]
    TruncatedPayload { expected: usize, actual: usize },

    #[error("tensor `{0}` contains non-finite values")]
    NonFiniteWeights(String),

    #[error("malformed graph: {0}")]
    Malformed(String),
}
