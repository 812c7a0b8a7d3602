//! Model identifier registry
//!
//! Resolves identifier strings to a tokenizer+model pair. An identifier is
//! either a catalog name (a built-in configuration preset, freshly
//! initialized and paired with a tokenizer trained over the caller's
//! corpus) or a filesystem path to a native checkpoint base.
//!
//! The registry itself never falls back; ordering of acquisition attempts
//! is the pipeline's concern.

use crate::checkpoint::load_checkpoint;
use crate::config::{CacheMode, LmConfig};
use crate::lm::QueryLm;
use crate::tokenizer::Tokenizer;
use std::path::Path;
use thiserror::Error;

/// The fixed fallback identifier used when the requested model cannot be
/// materialized. Must always resolve.
pub const FALLBACK_MODEL_ID: &str = "qt-nano-1m";

/// Resolution failures
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown model identifier `{0}` and no checkpoint found at that path")]
    UnknownIdentifier(String),

    #[error("failed to load checkpoint for `{identifier}`")]
    Checkpoint {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to build tokenizer for `{identifier}`")]
    Tokenizer {
        identifier: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("tokenizer vocabulary ({tokenizer}) exceeds model vocabulary ({model})")]
    VocabMismatch { tokenizer: usize, model: usize },
}

/// A resolved tokenizer+model pair.
pub struct AcquiredModel {
    /// The identifier that actually resolved (catalog name or path)
    pub identifier: String,
    pub tokenizer: Tokenizer,
    pub model: QueryLm,
}

impl std::fmt::Debug for AcquiredModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquiredModel")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}

/// Look up a catalog preset by name.
pub fn catalog(identifier: &str) -> Option<LmConfig> {
    let preset = |vocab_size, n_embd, n_hidden, sequence_len| LmConfig {
        vocab_size,
        n_embd,
        n_hidden,
        sequence_len,
        cache_mode: CacheMode::Disabled,
    };
    match identifier {
        "qt-base-25m" => Some(preset(8192, 512, 1024, 512)),
        "qt-small-8m" => Some(preset(4096, 256, 512, 512)),
        "qt-nano-1m" => Some(preset(512, 64, 128, 256)),
        _ => None,
    }
}

/// Resolve an identifier to a tokenizer+model pair.
///
/// Catalog names produce a fresh model and a tokenizer trained over
/// `corpus`; any other identifier is treated as a checkpoint base path
/// with a `tokenizer.json` expected in its parent directory.
pub fn resolve(identifier: &str, corpus: &[String]) -> Result<AcquiredModel, RegistryError> {
    if let Some(config) = catalog(identifier) {
        let tokenizer = Tokenizer::train_from_corpus(corpus.iter(), config.vocab_size).map_err(
            |source| RegistryError::Tokenizer {
                identifier: identifier.to_string(),
                source,
            },
        )?;
        validate_vocab(&tokenizer, &config)?;
        return Ok(AcquiredModel {
            identifier: identifier.to_string(),
            tokenizer,
            model: QueryLm::new(config),
        });
    }

    let path = Path::new(identifier);
    if !path.with_extension("json").exists() {
        return Err(RegistryError::UnknownIdentifier(identifier.to_string()));
    }

    let (model, _metadata) =
        load_checkpoint(path).map_err(|source| RegistryError::Checkpoint {
            identifier: identifier.to_string(),
            source,
        })?;

    let tokenizer_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tokenizer =
        Tokenizer::from_directory(tokenizer_dir).map_err(|source| RegistryError::Tokenizer {
            identifier: identifier.to_string(),
            source,
        })?;
    validate_vocab(&tokenizer, model.config())?;

    Ok(AcquiredModel {
        identifier: identifier.to_string(),
        tokenizer,
        model,
    })
}

fn validate_vocab(tokenizer: &Tokenizer, config: &LmConfig) -> Result<(), RegistryError> {
    if tokenizer.vocab_size() > config.vocab_size {
        return Err(RegistryError::VocabMismatch {
            tokenizer: tokenizer.vocab_size(),
            model: config.vocab_size,
        });
    }
    Ok(())
}
