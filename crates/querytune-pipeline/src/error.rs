//! Pipeline failure taxonomy
//!
//! Only [`DataError`] aborts the pipeline. Acquisition failures trigger
//! the fallback model, and training or export failures narrow the outcome
//! while the run still exits cleanly with some artifact on disk.

use querytune_export::ExportError;
use querytune_model::RegistryError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal training-data errors.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read training data from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("training data at {path} is not valid JSON")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Model acquisition failures. Non-fatal: the pipeline retries once with
/// the fallback identifier, and only a fallback failure ends acquisition.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("could not resolve model `{identifier}`")]
    Resolve {
        identifier: String,
        #[source]
        source: RegistryError,
    },

    #[error("tokenizer has neither a padding nor an end-of-sequence token")]
    PadToken,
}

/// Training failures. Non-fatal: the run degrades to the placeholder
/// artifact. The trainer disables the kv cache itself, so an enabled
/// cache never reaches the forward pass.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("no formatted records to train on")]
    EmptyCorpus,

    #[error("failed to tokenize training records")]
    Tokenize(#[source] anyhow::Error),

    #[error("training step failed")]
    Step(#[source] anyhow::Error),

    #[error("failed to save checkpoint")]
    Checkpoint(#[source] anyhow::Error),
}

/// Top-level pipeline errors: the only ways a run can fail outright.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("failed to write placeholder artifact")]
    Placeholder(#[from] ExportError),
}
