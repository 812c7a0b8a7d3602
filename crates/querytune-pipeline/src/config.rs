//! Pipeline configuration

use crate::profile::DomainProfile;
use crate::train::TrainOptions;
use std::path::PathBuf;

/// Everything one pipeline run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// JSON array of question/answer pairs
    pub training_data: PathBuf,
    /// Where the interchange artifact is written
    pub output_model: PathBuf,
    /// Requested base model; `None` uses the profile default
    pub base_model: Option<String>,
    pub profile: DomainProfile,
    /// Directory for the native checkpoint and tokenizer
    pub checkpoint_dir: PathBuf,
    pub train: TrainOptions,
}

impl PipelineConfig {
    /// The model identifier to request, after applying the profile
    /// default.
    pub fn resolved_base_model(&self) -> &str {
        self.base_model
            .as_deref()
            .unwrap_or_else(|| self.profile.default_model_id())
    }
}
