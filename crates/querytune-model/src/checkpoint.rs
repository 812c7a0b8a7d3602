//! Native checkpoint save/load
//!
//! Checkpoints use aprender's standard serialization: weights in a
//! `.safetensors` file, configuration and training metadata in a sibling
//! `.json` file.

use crate::{LmConfig, QueryLm};
use anyhow::{Context, Result};
use aprender::nn::serialize::{load_model, save_model};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Checkpoint format version for compatibility checking
const CHECKPOINT_VERSION: &str = "1.0.0";

/// Checkpoint metadata containing training information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Completed training epoch count
    pub epoch: usize,
    /// Loss value at this checkpoint
    pub loss: Option<f32>,
    /// Learning rate at this checkpoint
    pub learning_rate: Option<f32>,
    /// Additional metadata as key-value pairs
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Save a model checkpoint to disk.
///
/// `path` is the checkpoint base; weights land at `<path>.safetensors` and
/// metadata at `<path>.json`. Parent directories are created if missing.
pub fn save_checkpoint<P: AsRef<Path>>(
    model: &QueryLm,
    path: P,
    metadata: Option<CheckpointMetadata>,
) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create checkpoint directory: {}", parent.display())
        })?;
    }

    let weights_path = path.with_extension("safetensors");
    save_model(model, &weights_path)
        .map_err(|e| anyhow::anyhow!("Failed to save weights to SafeTensors: {}", e))?;

    let mut metadata = metadata.unwrap_or_default();
    metadata.extra.insert(
        "version".to_string(),
        serde_json::Value::String(CHECKPOINT_VERSION.to_string()),
    );
    metadata
        .extra
        .insert("config".to_string(), serde_json::to_value(model.config())?);

    let metadata_path = path.with_extension("json");
    let json_data =
        serde_json::to_string_pretty(&metadata).context("Failed to serialize metadata to JSON")?;
    fs::write(&metadata_path, json_data)
        .with_context(|| format!("Failed to write metadata file: {}", metadata_path.display()))?;

    Ok(())
}

/// Load a model checkpoint from disk.
///
/// Rebuilds the model from the config stored in metadata, then loads the
/// SafeTensors weights into it. The checkpoint version must match.
pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<(QueryLm, CheckpointMetadata)> {
    let path = path.as_ref();

    let metadata_path = path.with_extension("json");
    let json_data = fs::read_to_string(&metadata_path)
        .with_context(|| format!("Failed to read metadata file: {}", metadata_path.display()))?;
    let metadata: CheckpointMetadata =
        serde_json::from_str(&json_data).context("Failed to parse metadata JSON")?;

    let version = metadata
        .extra
        .get("version")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing version in metadata"))?;
    if version != CHECKPOINT_VERSION {
        anyhow::bail!(
            "Checkpoint version mismatch: expected {}, got {}",
            CHECKPOINT_VERSION,
            version
        );
    }

    let config_value = metadata
        .extra
        .get("config")
        .ok_or_else(|| anyhow::anyhow!("Missing config in metadata"))?;
    let config: LmConfig = serde_json::from_value(config_value.clone())
        .context("Failed to parse config from metadata")?;

    let mut model = QueryLm::new(config);
    let weights_path = path.with_extension("safetensors");
    load_model(&mut model, &weights_path)
        .map_err(|e| anyhow::anyhow!("Failed to load weights from SafeTensors: {}", e))?;

    Ok((model, metadata))
}
