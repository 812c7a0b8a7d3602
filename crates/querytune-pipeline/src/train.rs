//! Training loop
//!
//! Tokenizes the formatted instruction records, runs AdamW with warmup
//! plus cosine decay over shuffled batches, and saves a native checkpoint
//! (weights, metadata, tokenizer) at the end. Any failure here maps to
//! [`TrainingError`] and the pipeline decides how far to degrade.

use crate::error::TrainingError;
use crate::events::{EventSink, PipelineEvent};
use anyhow::Context;
use aprender::autograd::Tensor;
use aprender::nn::optim::{AdamW, Optimizer};
use aprender::nn::scheduler::{LRScheduler, WarmupCosineScheduler};
use aprender::nn::Module;
use querytune_model::{save_checkpoint, CacheMode, CheckpointMetadata, QueryLm, Tokenizer};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// Training hyperparameters.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Number of passes over the dataset
    pub epochs: usize,
    /// Sequences per optimizer step
    pub batch_size: usize,
    /// Peak learning rate
    pub learning_rate: f32,
    /// Fixed sequence length; records are truncated or padded to this
    pub seq_len: usize,
    /// Linear warmup steps before cosine decay
    pub warmup_steps: usize,
    /// Emit a training event every this many steps
    pub log_interval: usize,
    /// Shuffle seed
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            epochs: 3,
            batch_size: 2,
            learning_rate: 5e-5,
            seq_len: 512,
            warmup_steps: 100,
            log_interval: 10,
            seed: 42,
        }
    }
}

/// A trained model plus where its checkpoint landed.
pub struct TrainedModel {
    pub model: QueryLm,
    /// Checkpoint base path (sibling `.safetensors` and `.json` files)
    pub checkpoint: PathBuf,
    pub final_loss: Option<f32>,
}

impl std::fmt::Debug for TrainedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrainedModel")
            .field("checkpoint", &self.checkpoint)
            .field("final_loss", &self.final_loss)
            .finish_non_exhaustive()
    }
}

/// Encode one record to exactly `seq_len` token ids.
fn encode_record(
    tokenizer: &Tokenizer,
    record: &str,
    seq_len: usize,
) -> Result<Vec<f32>, TrainingError> {
    let mut ids = tokenizer
        .encode(record)
        .map_err(TrainingError::Tokenize)?;
    if let Some(eos) = tokenizer.eos_id() {
        ids.push(eos);
    }
    ids.truncate(seq_len);

    let pad = tokenizer.pad_id().or_else(|| tokenizer.eos_id()).unwrap_or(0);
    while ids.len() < seq_len {
        ids.push(pad);
    }
    Ok(ids.into_iter().map(|id| id as f32).collect())
}

/// Fine-tune `model` on the formatted records and checkpoint the result
/// under `checkpoint_dir`.
pub fn train(
    mut model: QueryLm,
    tokenizer: &Tokenizer,
    records: &[String],
    checkpoint_dir: &Path,
    options: &TrainOptions,
    sink: &dyn EventSink,
) -> Result<TrainedModel, TrainingError> {
    if records.is_empty() {
        return Err(TrainingError::EmptyCorpus);
    }

    // Fail before touching the optimizer if the checkpoint location is
    // unusable; the caller degrades to the placeholder artifact.
    std::fs::create_dir_all(checkpoint_dir)
        .with_context(|| {
            format!(
                "Failed to create checkpoint directory: {}",
                checkpoint_dir.display()
            )
        })
        .map_err(TrainingError::Checkpoint)?;

    model.set_cache_mode(CacheMode::Disabled);

    let seq_len = options.seq_len.min(model.config().sequence_len).max(2);
    let sequences: Vec<Vec<f32>> = records
        .iter()
        .map(|record| encode_record(tokenizer, record, seq_len))
        .collect::<Result<_, _>>()?;

    let batches_per_epoch = sequences.len().div_ceil(options.batch_size);
    let max_steps = (options.epochs * batches_per_epoch).max(1);

    let mut optimizer = AdamW::new(model.parameters_mut(), options.learning_rate);
    let mut scheduler = WarmupCosineScheduler::with_min_lr(
        options.warmup_steps.min(max_steps),
        max_steps,
        options.learning_rate * 0.1,
    );

    let mut rng = StdRng::seed_from_u64(options.seed);
    let mut step = 0usize;
    let mut last_loss = None;

    for epoch in 0..options.epochs {
        let mut order: Vec<usize> = (0..sequences.len()).collect();
        order.shuffle(&mut rng);

        for batch_indices in order.chunks(options.batch_size) {
            let mut input_values = Vec::with_capacity(batch_indices.len() * (seq_len - 1));
            let mut target_values = Vec::with_capacity(batch_indices.len() * (seq_len - 1));
            for &index in batch_indices {
                let ids = &sequences[index];
                input_values.extend_from_slice(&ids[..seq_len - 1]);
                target_values.extend_from_slice(&ids[1..]);
            }
            let shape = [batch_indices.len(), seq_len - 1];
            let inputs = Tensor::new(&input_values, &shape);
            let targets = Tensor::new(&target_values, &shape);

            let loss = model
                .forward_training(&inputs, &targets)
                .map_err(TrainingError::Step)?;
            loss.backward();
            optimizer.step();
            optimizer.zero_grad();
            scheduler.step(&mut optimizer);

            last_loss = Some(loss.item());
            step += 1;
            if step % options.log_interval == 0 {
                sink.emit(PipelineEvent::TrainingStep {
                    epoch,
                    step,
                    loss: loss.item(),
                    learning_rate: optimizer.lr(),
                });
            }
        }
    }

    let checkpoint = checkpoint_dir.join("model");
    let metadata = CheckpointMetadata {
        epoch: options.epochs,
        loss: last_loss,
        learning_rate: Some(optimizer.lr()),
        ..Default::default()
    };
    save_checkpoint(&model, &checkpoint, Some(metadata)).map_err(TrainingError::Checkpoint)?;
    tokenizer
        .save(checkpoint_dir)
        .map_err(TrainingError::Checkpoint)?;
    sink.emit(PipelineEvent::CheckpointSaved {
        path: checkpoint.clone(),
    });

    Ok(TrainedModel {
        model,
        checkpoint,
        final_loss: last_loss,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use querytune_model::registry;
    use tempfile::TempDir;

    fn tiny_options() -> TrainOptions {
        TrainOptions {
            epochs: 1,
            batch_size: 2,
            seq_len: 16,
            warmup_steps: 1,
            log_interval: 1,
            ..TrainOptions::default()
        }
    }

    fn records() -> Vec<String> {
        vec![
            "### Instruction:\nq one\n\n### Response:\na one\n".to_string(),
            "### Instruction:\nq two\n\n### Response:\na two\n".to_string(),
        ]
    }

    #[test]
    fn test_train_writes_checkpoint_and_tokenizer() {
        let dir = TempDir::new().unwrap();
        let records = records();
        let acquired = registry::resolve("qt-nano-1m", &records).unwrap();
        let sink = MemorySink::new();

        let trained = train(
            acquired.model,
            &acquired.tokenizer,
            &records,
            dir.path(),
            &tiny_options(),
            &sink,
        )
        .unwrap();

        assert!(trained.checkpoint.with_extension("safetensors").exists());
        assert!(trained.checkpoint.with_extension("json").exists());
        assert!(dir.path().join("tokenizer.json").exists());
        assert!(trained.final_loss.is_some());
        assert!(sink
            .events()
            .iter()
            .any(|e| matches!(e, PipelineEvent::CheckpointSaved { .. })));
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let dir = TempDir::new().unwrap();
        let seed = vec!["hello world".to_string()];
        let acquired = registry::resolve("qt-nano-1m", &seed).unwrap();

        let err = train(
            acquired.model,
            &acquired.tokenizer,
            &[],
            dir.path(),
            &tiny_options(),
            &MemorySink::new(),
        )
        .unwrap_err();
        assert!(matches!(err, TrainingError::EmptyCorpus));
    }

    #[test]
    fn test_blocked_checkpoint_dir_fails_before_training() {
        let dir = TempDir::new().unwrap();
        let blocked = dir.path().join("results");
        std::fs::write(&blocked, b"not a directory").unwrap();

        let records = records();
        let acquired = registry::resolve("qt-nano-1m", &records).unwrap();
        let sink = MemorySink::new();

        let err = train(
            acquired.model,
            &acquired.tokenizer,
            &records,
            &blocked,
            &tiny_options(),
            &sink,
        )
        .unwrap_err();
        assert!(matches!(err, TrainingError::Checkpoint(_)));
        assert!(sink
            .events()
            .iter()
            .all(|e| !matches!(e, PipelineEvent::TrainingStep { .. })));
    }
}
