//! Causal language model, tokenizer, and checkpointing for querytune
//!
//! This crate provides everything the fine-tuning pipeline needs to
//! materialize a tokenizer+model pair:
//! - A BPE tokenizer wrapper with special-token handling
//! - A small causal LM built on aprender's nn modules
//! - Native checkpoint save/load (SafeTensors weights + JSON metadata)
//! - An identifier registry resolving model names to presets or checkpoints
//!
//! # Example
//!
//! ```no_run
//! use querytune_model::{LmConfig, QueryLm, save_checkpoint};
//!
//! let config = LmConfig::default();
//! let model = QueryLm::new(config);
//! save_checkpoint(&model, "results/model", None)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod checkpoint;
pub mod config;
pub mod lm;
pub mod registry;
pub mod tokenizer;

pub use checkpoint::{load_checkpoint, save_checkpoint, CheckpointMetadata};
pub use config::{CacheMode, LmConfig};
pub use lm::{NamedTensor, QueryLm};
pub use registry::{AcquiredModel, RegistryError, FALLBACK_MODEL_ID};
pub use tokenizer::{Tokenizer, EOS_TOKEN, PAD_TOKEN};
