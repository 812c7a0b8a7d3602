//! Model configuration

use serde::{Deserialize, Serialize};

/// KV-cache behavior during forward passes.
///
/// Training must run with the cache disabled so that labels stay aligned
/// with inputs; the trainer passes this explicitly rather than toggling a
/// hidden flag on the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    Enabled,
    Disabled,
}

/// Causal LM configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmConfig {
    /// Vocabulary size
    pub vocab_size: usize,
    /// Embedding dimension
    pub n_embd: usize,
    /// Hidden layer dimension
    pub n_hidden: usize,
    /// Maximum sequence length
    pub sequence_len: usize,
    /// KV-cache behavior
    pub cache_mode: CacheMode,
}

impl Default for LmConfig {
    fn default() -> Self {
        Self {
            vocab_size: 4096,
            n_embd: 256,
            n_hidden: 512,
            sequence_len: 512,
            cache_mode: CacheMode::Disabled,
        }
    }
}
