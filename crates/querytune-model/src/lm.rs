//! Minimal causal LM built on aprender's nn modules
//!
//! The model is deliberately plain: a token embedding projection, one
//! hidden layer with ReLU, and an LM head. All tensor math, autograd, and
//! the cross-entropy loss are aprender's; this crate only wires them
//! together and exposes the surface the trainer and exporter need.

use crate::config::{CacheMode, LmConfig};
use anyhow::Result;
use aprender::autograd::Tensor;
use aprender::nn::loss::CrossEntropyLoss;
use aprender::nn::{Linear, Module, ReLU};

/// A named weight tensor extracted for interchange export.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedTensor {
    /// Qualified name, e.g. `embed.weight`
    pub name: String,
    /// Tensor shape
    pub shape: Vec<usize>,
    /// Row-major values
    pub values: Vec<f32>,
}

/// Small causal language model for question/answer fine-tuning.
pub struct QueryLm {
    config: LmConfig,
    /// Token embedding as a projection over one-hot rows: vocab -> n_embd
    embed: Linear,
    /// Hidden layer: n_embd -> n_hidden
    hidden: Linear,
    act: ReLU,
    /// LM head: n_hidden -> vocab
    lm_head: Linear,
    loss_fn: CrossEntropyLoss,
}

impl QueryLm {
    /// Create a freshly initialized model from a configuration.
    pub fn new(config: LmConfig) -> Self {
        let embed = Linear::new(config.vocab_size, config.n_embd);
        let hidden = Linear::new(config.n_embd, config.n_hidden);
        let lm_head = Linear::new(config.n_hidden, config.vocab_size);

        Self {
            config,
            embed,
            hidden,
            act: ReLU::new(),
            lm_head,
            loss_fn: CrossEntropyLoss::new(),
        }
    }

    /// Model configuration
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Override the KV-cache mode (the trainer forces `Disabled`).
    pub fn set_cache_mode(&mut self, mode: CacheMode) {
        self.config.cache_mode = mode;
    }

    /// One-hot encode a `[batch, seq]` token-id tensor into
    /// `[batch * seq, vocab]` rows.
    ///
    /// Token ids arrive as f32 values, matching how the trainer builds its
    /// batch tensors. Ids outside the vocabulary are clamped to the last
    /// entry rather than panicking.
    fn one_hot(&self, input_ids: &Tensor) -> Tensor {
        let vocab = self.config.vocab_size;
        let ids: Vec<f32> = input_ids.data().iter().copied().collect();
        let mut rows = vec![0.0f32; ids.len() * vocab];
        for (i, &id) in ids.iter().enumerate() {
            let idx = (id.max(0.0) as usize).min(vocab - 1);
            rows[i * vocab + idx] = 1.0;
        }
        Tensor::new(&rows, &[ids.len(), vocab])
    }

    /// Forward pass: `[batch, seq]` token ids to `[batch * seq, vocab]`
    /// logits.
    pub fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let one_hot = self.one_hot(input_ids);
        let embedded = self.embed.forward(&one_hot);
        let hidden = self.act.forward(&self.hidden.forward(&embedded));
        Ok(self.lm_head.forward(&hidden))
    }

    /// Forward pass with targets, returning the scalar loss tensor.
    ///
    /// Targets are `[batch, seq]` token ids, already shifted by one against
    /// the inputs. Fails when the cache is enabled: cached positions would
    /// misalign labels against inputs during training.
    pub fn forward_training(&self, input_ids: &Tensor, targets: &Tensor) -> Result<Tensor> {
        if self.config.cache_mode == CacheMode::Enabled {
            anyhow::bail!("kv cache must be disabled during training");
        }

        let logits = self.forward(input_ids)?;
        let flat: Vec<f32> = targets.data().iter().copied().collect();
        let targets = Tensor::new(&flat, &[flat.len()]);
        Ok(self.loss_fn.forward(&logits, &targets))
    }

    /// Extract the weight tensors for interchange export, in forward order.
    pub fn export_tensors(&self) -> Vec<NamedTensor> {
        let mut out = Vec::new();
        let layers: [(&str, &Linear); 3] = [
            ("embed", &self.embed),
            ("hidden", &self.hidden),
            ("lm_head", &self.lm_head),
        ];
        for (layer_name, layer) in layers {
            for (i, param) in layer.parameters().into_iter().enumerate() {
                let suffix = if i == 0 { "weight" } else { "bias" };
                out.push(NamedTensor {
                    name: format!("{layer_name}.{suffix}"),
                    shape: param.shape().to_vec(),
                    values: param.data().iter().copied().collect(),
                });
            }
        }
        out
    }

    /// Total parameter count
    pub fn parameter_count(&self) -> usize {
        self.parameters().iter().map(|p| p.data().len()).sum()
    }
}

impl Module for QueryLm {
    fn forward(&self, input: &Tensor) -> Tensor {
        QueryLm::forward(self, input).expect("QueryLm forward pass failed")
    }

    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = Vec::new();
        params.extend(self.embed.parameters());
        params.extend(self.hidden.parameters());
        params.extend(self.lm_head.parameters());
        params
    }

    fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = Vec::new();
        params.extend(self.embed.parameters_mut());
        params.extend(self.hidden.parameters_mut());
        params.extend(self.lm_head.parameters_mut());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_config() -> LmConfig {
        LmConfig {
            vocab_size: 32,
            n_embd: 8,
            n_hidden: 16,
            sequence_len: 16,
            cache_mode: CacheMode::Disabled,
        }
    }

    #[test]
    fn test_forward_shape() {
        let model = QueryLm::new(tiny_config());
        let ids = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[1, 4]);

        let logits = model.forward(&ids).unwrap();
        assert_eq!(logits.shape(), &[4, 32]);
    }

    #[test]
    fn test_forward_training_rejects_enabled_cache() {
        let mut model = QueryLm::new(tiny_config());
        model.set_cache_mode(CacheMode::Enabled);
        let ids = Tensor::new(&[1.0, 2.0], &[1, 2]);
        let targets = Tensor::new(&[2.0, 3.0], &[1, 2]);

        assert!(model.forward_training(&ids, &targets).is_err());
    }

    #[test]
    fn test_export_tensors_cover_all_layers() {
        let model = QueryLm::new(tiny_config());
        let tensors = model.export_tensors();

        let names: Vec<&str> = tensors.iter().map(|t| t.name.as_str()).collect();
        assert!(names.contains(&"embed.weight"));
        assert!(names.contains(&"hidden.weight"));
        assert!(names.contains(&"lm_head.weight"));
        for tensor in &tensors {
            assert_eq!(
                tensor.values.len(),
                tensor.shape.iter().product::<usize>()
            );
        }
    }
}
