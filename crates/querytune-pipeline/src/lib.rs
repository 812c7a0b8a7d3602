//! querytune fine-tuning pipeline
//!
//! Orchestrates the four pipeline stages: load question/answer training
//! data, format it into instruction prompts, acquire a tokenizer+model
//! pair (with a fixed fallback), then train and export. The pipeline
//! degrades rather than aborts: only bad training data is fatal, every
//! later failure narrows the outcome but still produces an artifact.

pub mod acquire;
pub mod config;
pub mod dataset;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod profile;
pub mod prompt;
pub mod train;

pub use config::PipelineConfig;
pub use dataset::{load_examples, Example, MIN_EXAMPLES};
pub use error::{AcquisitionError, DataError, PipelineError, TrainingError};
pub use events::{EventSink, MemorySink, NullSink, PipelineEvent, Stage, StdoutSink};
pub use pipeline::{run, Outcome, PipelineReport};
pub use profile::DomainProfile;
pub use prompt::{format_dataset, format_example};
pub use train::{train, TrainOptions, TrainedModel};
