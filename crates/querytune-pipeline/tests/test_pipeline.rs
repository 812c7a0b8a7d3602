//! End-to-end pipeline tests covering all three outcomes.

use querytune_pipeline::{
    run, DomainProfile, MemorySink, Outcome, PipelineConfig, PipelineError, PipelineEvent,
    TrainOptions,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_training_data(dir: &Path, pairs: usize) -> std::path::PathBuf {
    let examples: Vec<serde_json::Value> = (0..pairs)
        .map(|i| {
            serde_json::json!({
                "Question": format!("What is dataset question {i}?"),
                "Answer": format!("[{{\"value\": {i}}}]"),
            })
        })
        .collect();
    let path = dir.join("training.json");
    fs::write(&path, serde_json::to_string(&examples).unwrap()).unwrap();
    path
}

fn tiny_config(dir: &Path, training_data: std::path::PathBuf) -> PipelineConfig {
    PipelineConfig {
        training_data,
        output_model: dir.join("model.qtgf"),
        base_model: Some("qt-nano-1m".to_string()),
        profile: DomainProfile::ExportData,
        checkpoint_dir: dir.join("results"),
        train: TrainOptions {
            epochs: 1,
            batch_size: 2,
            seq_len: 16,
            warmup_steps: 1,
            log_interval: 1,
            ..TrainOptions::default()
        },
    }
}

#[test]
fn test_full_run_writes_artifact_and_checkpoint() {
    let dir = TempDir::new().unwrap();
    let training_data = write_training_data(dir.path(), 2);
    let config = tiny_config(dir.path(), training_data);
    let sink = MemorySink::new();

    let report = run(&config, &sink).unwrap();

    assert_eq!(report.outcome, Outcome::Full);
    assert_eq!(report.examples, 2);
    assert_eq!(report.augmented, 2);
    assert!(config.output_model.exists());
    let checkpoint = report.checkpoint.unwrap();
    assert!(checkpoint.with_extension("safetensors").exists());

    let graph = querytune_export::read_graph(&config.output_model).unwrap();
    assert_eq!(graph.header.inputs, vec!["input_ids".to_string()]);
    assert_eq!(graph.header.outputs, vec!["logits".to_string()]);
    assert!(!graph.header.tensors.is_empty());
}

#[test]
fn test_unknown_base_model_falls_back_before_training() {
    let dir = TempDir::new().unwrap();
    let training_data = write_training_data(dir.path(), 6);
    let mut config = tiny_config(dir.path(), training_data);
    config.base_model = Some("definitely-missing".to_string());
    let sink = MemorySink::new();

    let report = run(&config, &sink).unwrap();

    assert_eq!(report.outcome, Outcome::Full);
    assert_eq!(report.model_identifier.as_deref(), Some("qt-nano-1m"));

    let events = sink.events();
    let fallback_pos = events
        .iter()
        .position(|e| matches!(e, PipelineEvent::ModelFallback { .. }))
        .expect("fallback event missing");
    let first_step = events
        .iter()
        .position(|e| matches!(e, PipelineEvent::TrainingStep { .. }))
        .expect("no training steps recorded");
    assert!(fallback_pos < first_step);
}

#[test]
fn test_blocked_output_degrades_to_native_checkpoint() {
    let dir = TempDir::new().unwrap();
    let training_data = write_training_data(dir.path(), 2);
    let mut config = tiny_config(dir.path(), training_data);

    // Occupy the output parent with a file so export cannot write there.
    let blocked = dir.path().join("blocked");
    fs::write(&blocked, b"in the way").unwrap();
    config.output_model = blocked.join("model.qtgf");

    let sink = MemorySink::new();
    let report = run(&config, &sink).unwrap();

    assert_eq!(report.outcome, Outcome::NativeOnly);
    assert!(report.artifact.is_none());
    let checkpoint = report.checkpoint.unwrap();
    assert!(checkpoint.with_extension("safetensors").exists());
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, PipelineEvent::ExportSkipped { .. })));
}

#[test]
fn test_blocked_checkpoint_dir_degrades_to_placeholder() {
    let dir = TempDir::new().unwrap();
    let training_data = write_training_data(dir.path(), 2);
    let mut config = tiny_config(dir.path(), training_data);

    // Occupy the checkpoint directory path with a file.
    fs::write(dir.path().join("results"), b"in the way").unwrap();

    let sink = MemorySink::new();
    let report = run(&config, &sink).unwrap();

    assert_eq!(report.outcome, Outcome::Placeholder);
    assert!(report.checkpoint.is_none());
    assert_eq!(report.artifact.as_ref(), Some(&config.output_model));

    // The placeholder is a loadable graph that echoes its input.
    let graph = querytune_export::read_graph(&config.output_model).unwrap();
    let echoed = graph.execute(&[7.0, 8.0, 9.0]).unwrap();
    assert_eq!(echoed, vec![7.0, 8.0, 9.0]);

    // A second run over the same blocked layout behaves identically.
    let report = run(&config, &MemorySink::new()).unwrap();
    assert_eq!(report.outcome, Outcome::Placeholder);
}

#[test]
fn test_invalid_training_data_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("training.json");
    fs::write(&path, b"{ not json").unwrap();
    let config = tiny_config(dir.path(), path);

    let err = run(&config, &MemorySink::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Data(_)));
    assert!(!config.output_model.exists());
}

#[test]
fn test_missing_training_data_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = tiny_config(dir.path(), dir.path().join("nope.json"));

    let err = run(&config, &MemorySink::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Data(_)));
}
