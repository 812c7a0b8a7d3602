//! Pipeline orchestration
//!
//! Runs the stages in order and narrows the outcome instead of aborting:
//!
//! - everything works: interchange artifact plus native checkpoint;
//! - export fails: native checkpoint only;
//! - acquisition or training fails: identity placeholder artifact.
//!
//! Only unusable training data, or a placeholder that itself cannot be
//! written, fails the run.

use crate::acquire::acquire;
use crate::config::PipelineConfig;
use crate::dataset::{augment, load_examples};
use crate::error::PipelineError;
use crate::events::{EventSink, PipelineEvent, Stage};
use crate::prompt::format_dataset;
use crate::train::train;
use querytune_export::{export_model, write_placeholder};
use std::path::PathBuf;

/// How far the run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Interchange artifact and native checkpoint both written
    Full,
    /// Training succeeded but export failed; only the checkpoint stands
    NativeOnly,
    /// Training never completed; identity placeholder written instead
    Placeholder,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub outcome: Outcome,
    /// Identifier that actually resolved, if acquisition got that far
    pub model_identifier: Option<String>,
    /// Examples loaded from the training data file
    pub examples: usize,
    /// Seed examples appended to reach the minimum
    pub augmented: usize,
    /// Native checkpoint base path, when training completed
    pub checkpoint: Option<PathBuf>,
    /// Artifact written at the output path, when export or the
    /// placeholder succeeded
    pub artifact: Option<PathBuf>,
}

/// Run the full pipeline.
pub fn run(config: &PipelineConfig, sink: &dyn EventSink) -> Result<PipelineReport, PipelineError> {
    sink.emit(PipelineEvent::StageStarted { stage: Stage::Data });
    let mut examples = load_examples(&config.training_data)?;
    let loaded = examples.len();
    sink.emit(PipelineEvent::DatasetLoaded {
        path: config.training_data.clone(),
        examples: loaded,
    });
    let augmented = augment(&mut examples, config.profile, sink);

    sink.emit(PipelineEvent::StageStarted {
        stage: Stage::Format,
    });
    let records = format_dataset(&examples, config.profile);
    sink.emit(PipelineEvent::RecordsFormatted {
        records: records.len(),
    });

    let placeholder_report = |reason: String,
                              identifier: Option<String>,
                              sink: &dyn EventSink|
     -> Result<PipelineReport, PipelineError> {
        sink.emit(PipelineEvent::TrainingAbandoned { reason });
        write_placeholder(&config.output_model)?;
        sink.emit(PipelineEvent::ArtifactWritten {
            path: config.output_model.clone(),
            placeholder: true,
        });
        Ok(PipelineReport {
            outcome: Outcome::Placeholder,
            model_identifier: identifier,
            examples: loaded,
            augmented,
            checkpoint: None,
            artifact: Some(config.output_model.clone()),
        })
    };

    sink.emit(PipelineEvent::StageStarted {
        stage: Stage::Acquire,
    });
    let acquired = match acquire(config.resolved_base_model(), &records, sink) {
        Ok(acquired) => acquired,
        Err(err) => return placeholder_report(err.to_string(), None, sink),
    };
    let identifier = acquired.identifier.clone();
    sink.emit(PipelineEvent::ModelReady {
        identifier: identifier.clone(),
        parameters: acquired.model.parameter_count(),
    });

    sink.emit(PipelineEvent::StageStarted {
        stage: Stage::Train,
    });
    let trained = match train(
        acquired.model,
        &acquired.tokenizer,
        &records,
        &config.checkpoint_dir,
        &config.train,
        sink,
    ) {
        Ok(trained) => trained,
        Err(err) => return placeholder_report(err.to_string(), Some(identifier), sink),
    };

    sink.emit(PipelineEvent::StageStarted {
        stage: Stage::Export,
    });
    match export_model(&trained.model, &identifier, &config.output_model) {
        Ok(()) => {
            sink.emit(PipelineEvent::ArtifactWritten {
                path: config.output_model.clone(),
                placeholder: false,
            });
            Ok(PipelineReport {
                outcome: Outcome::Full,
                model_identifier: Some(identifier),
                examples: loaded,
                augmented,
                checkpoint: Some(trained.checkpoint),
                artifact: Some(config.output_model.clone()),
            })
        }
        Err(err) => {
            sink.emit(PipelineEvent::ExportSkipped {
                reason: err.to_string(),
            });
            Ok(PipelineReport {
                outcome: Outcome::NativeOnly,
                model_identifier: Some(identifier),
                examples: loaded,
                augmented,
                checkpoint: Some(trained.checkpoint),
                artifact: None,
            })
        }
    }
}
