//! Model acquisition with fallback
//!
//! Resolves the requested model identifier; on failure, emits a fallback
//! event and tries the fixed fallback identifier exactly once. Either way
//! the tokenizer's padding token is defaulted from end-of-sequence before
//! the pair is handed to the trainer.

use crate::error::AcquisitionError;
use crate::events::{EventSink, PipelineEvent};
use querytune_model::{registry, AcquiredModel, FALLBACK_MODEL_ID};

/// Resolve `identifier`, falling back to [`FALLBACK_MODEL_ID`] when it
/// cannot be materialized.
pub fn acquire(
    identifier: &str,
    corpus: &[String],
    sink: &dyn EventSink,
) -> Result<AcquiredModel, AcquisitionError> {
    let mut acquired = match registry::resolve(identifier, corpus) {
        Ok(acquired) => acquired,
        Err(primary_err) => {
            sink.emit(PipelineEvent::ModelFallback {
                requested: identifier.to_string(),
                fallback: FALLBACK_MODEL_ID.to_string(),
                reason: primary_err.to_string(),
            });
            registry::resolve(FALLBACK_MODEL_ID, corpus).map_err(|source| {
                AcquisitionError::Resolve {
                    identifier: FALLBACK_MODEL_ID.to_string(),
                    source,
                }
            })?
        }
    };

    if acquired.tokenizer.pad_id().is_none() {
        let defaulted = acquired.tokenizer.ensure_pad_token();
        if !defaulted {
            return Err(AcquisitionError::PadToken);
        }
    }

    Ok(acquired)
}
