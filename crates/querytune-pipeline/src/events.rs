//! Structured pipeline events
//!
//! Each stage reports progress through an [`EventSink`] rather than
//! printing directly, so the binary can log to stdout while tests capture
//! the stream in memory and assert on ordering.

use std::path::PathBuf;
use std::sync::Mutex;

/// Pipeline stage identifiers, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Data,
    Format,
    Acquire,
    Train,
    Export,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Data => "data",
            Stage::Format => "format",
            Stage::Acquire => "acquire",
            Stage::Train => "train",
            Stage::Export => "export",
        };
        write!(f, "{name}")
    }
}

/// Everything the pipeline reports while running.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted {
        stage: Stage,
    },
    DatasetLoaded {
        path: PathBuf,
        examples: usize,
    },
    /// Seed examples were appended because the dataset was too small.
    ExamplesAugmented {
        added: usize,
        total: usize,
    },
    RecordsFormatted {
        records: usize,
    },
    /// The requested model failed to resolve; trying the fallback.
    ModelFallback {
        requested: String,
        fallback: String,
        reason: String,
    },
    ModelReady {
        identifier: String,
        parameters: usize,
    },
    TrainingStep {
        epoch: usize,
        step: usize,
        loss: f32,
        learning_rate: f32,
    },
    CheckpointSaved {
        path: PathBuf,
    },
    /// Interchange export failed; the native checkpoint stands alone.
    ExportSkipped {
        reason: String,
    },
    /// Training failed; degrading to the placeholder artifact.
    TrainingAbandoned {
        reason: String,
    },
    ArtifactWritten {
        path: PathBuf,
        placeholder: bool,
    },
}

/// Receives pipeline events.
pub trait EventSink {
    fn emit(&self, event: PipelineEvent);
}

/// Logs events to stdout, one line each.
pub struct StdoutSink;

impl EventSink for StdoutSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::StageStarted { stage } => {
                println!("=== stage: {stage} ===");
            }
            PipelineEvent::DatasetLoaded { path, examples } => {
                println!("Loaded {} training examples from {}", examples, path.display());
            }
            PipelineEvent::ExamplesAugmented { added, total } => {
                println!("Very few training examples; added {added} seed examples ({total} total)");
            }
            PipelineEvent::RecordsFormatted { records } => {
                println!("Prepared {records} instruction records");
            }
            PipelineEvent::ModelFallback {
                requested,
                fallback,
                reason,
            } => {
                println!("Error acquiring {requested}: {reason}");
                println!("Falling back to smaller model: {fallback}");
            }
            PipelineEvent::ModelReady {
                identifier,
                parameters,
            } => {
                println!("Model {identifier} ready ({parameters} parameters)");
            }
            PipelineEvent::TrainingStep {
                epoch,
                step,
                loss,
                learning_rate,
            } => {
                println!("epoch {epoch} step {step} | loss {loss:.4} | lr {learning_rate:.2e}");
            }
            PipelineEvent::CheckpointSaved { path } => {
                println!("Checkpoint saved to {}", path.display());
            }
            PipelineEvent::ExportSkipped { reason } => {
                println!("Export failed ({reason}); keeping native checkpoint only");
            }
            PipelineEvent::TrainingAbandoned { reason } => {
                println!("Training failed ({reason}); writing placeholder artifact");
            }
            PipelineEvent::ArtifactWritten { path, placeholder } => {
                if placeholder {
                    println!("Placeholder artifact written to {}", path.display());
                } else {
                    println!("Model exported to {}", path.display());
                }
            }
        }
    }
}

/// Captures events in memory for assertions.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().expect("event sink poisoned").clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: PipelineEvent) {
        self.events.lock().expect("event sink poisoned").push(event);
    }
}

/// Discards all events.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}
