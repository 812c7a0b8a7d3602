//! BPE tokenizer wrapper with special-token handling
//!
//! Wraps `aprender::text::tokenize::BpeTokenizer` and keeps track of the
//! end-of-sequence and padding tokens. aprender's BPE cannot add special
//! tokens after training, so the training corpus is salted with them to
//! keep them in the vocabulary as whole tokens.

use anyhow::{Context, Result};
use aprender::text::tokenize::BpeTokenizer;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// End-of-sequence token string
pub const EOS_TOKEN: &str = "<|eos|>";
/// Padding token string
pub const PAD_TOKEN: &str = "<|pad|>";

/// How many times each special token is repeated in the training corpus so
/// BPE keeps it as a single vocabulary entry.
const SPECIAL_TOKEN_REPEATS: usize = 50;

/// Serialized tokenizer data: vocabulary and merge rules only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerData {
    /// Token to ID mapping
    pub vocabulary: std::collections::HashMap<String, u32>,
    /// BPE merge rules
    pub merges: Vec<(String, String)>,
}

/// Tokenizer for the fine-tuning pipeline.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    bpe: BpeTokenizer,
    eos_id: Option<u32>,
    pad_id: Option<u32>,
}

impl Tokenizer {
    /// Train a tokenizer over the given corpus.
    ///
    /// The special tokens are appended to the corpus (repeated) before
    /// training so they survive as whole tokens.
    pub fn train_from_corpus<I, S>(corpus: I, vocab_size: usize) -> Result<Self>
    where
        I: Iterator<Item = S>,
        S: AsRef<str>,
    {
        let mut owned: Vec<String> = corpus.map(|s| s.as_ref().to_string()).collect();
        for _ in 0..SPECIAL_TOKEN_REPEATS {
            owned.push(EOS_TOKEN.to_string());
            owned.push(PAD_TOKEN.to_string());
        }
        let refs: Vec<&str> = owned.iter().map(|s| s.as_str()).collect();

        let bpe = BpeTokenizer::train(&refs, vocab_size)
            .map_err(|e| anyhow::anyhow!("Failed to train BPE tokenizer: {}", e))?;

        Ok(Self::from_bpe(bpe))
    }

    fn from_bpe(bpe: BpeTokenizer) -> Self {
        let eos_id = bpe.token_to_id(EOS_TOKEN);
        let pad_id = bpe.token_to_id(PAD_TOKEN);
        Self { bpe, eos_id, pad_id }
    }

    /// Encode text to token IDs
    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.bpe
            .encode(text)
            .map_err(|e| anyhow::anyhow!("Encoding failed: {}", e))
    }

    /// Decode token IDs to text
    pub fn decode(&self, ids: &[u32]) -> Result<String> {
        self.bpe
            .decode(ids)
            .map_err(|e| anyhow::anyhow!("Decoding failed: {}", e))
    }

    /// Vocabulary size
    pub fn vocab_size(&self) -> usize {
        self.bpe.vocab_size()
    }

    /// End-of-sequence token ID, if present in the vocabulary
    pub fn eos_id(&self) -> Option<u32> {
        self.eos_id
    }

    /// Padding token ID, if designated
    pub fn pad_id(&self) -> Option<u32> {
        self.pad_id
    }

    /// Default the padding token from the end-of-sequence token when no
    /// padding token is designated.
    ///
    /// Returns `true` when the default was applied. When neither token is
    /// available the tokenizer is left unchanged and the caller decides
    /// whether that is fatal.
    pub fn ensure_pad_token(&mut self) -> bool {
        if self.pad_id.is_some() {
            return false;
        }
        match self.eos_id {
            Some(eos) => {
                self.pad_id = Some(eos);
                true
            }
            None => false,
        }
    }

    /// Load a tokenizer from `tokenizer.json` in the given directory.
    pub fn from_directory<P: AsRef<Path>>(path: P) -> Result<Self> {
        let tokenizer_file = path.as_ref().join("tokenizer.json");
        if !tokenizer_file.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_file.display());
        }

        let content = std::fs::read_to_string(&tokenizer_file).with_context(|| {
            format!("Failed to read tokenizer file: {}", tokenizer_file.display())
        })?;
        let data: TokenizerData =
            serde_json::from_str(&content).context("Failed to parse tokenizer JSON")?;

        let bpe = BpeTokenizer::from_vocab(data.vocabulary, data.merges);
        Ok(Self::from_bpe(bpe))
    }

    /// Save the tokenizer as `tokenizer.json` in the given directory.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;

        let data = TokenizerData {
            vocabulary: self.bpe.vocab().clone(),
            merges: self.bpe.merges().to_vec(),
        };
        let content = serde_json::to_string(&data).context("Failed to serialize tokenizer")?;

        let tokenizer_file = path.join("tokenizer.json");
        std::fs::write(&tokenizer_file, content).with_context(|| {
            format!("Failed to write tokenizer file: {}", tokenizer_file.display())
        })?;

        Ok(())
    }
}
