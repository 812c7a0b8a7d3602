//! Integration tests for the QTGF container and graph lowering.

use querytune_export::{
    identity_graph, lower_model, read_graph, write_graph, write_placeholder, ExportError,
};
use querytune_model::{CacheMode, LmConfig, QueryLm};
use std::fs;
use tempfile::TempDir;

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
fn test_lowered_graph_roundtrips_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.qtgf");

    let model = QueryLm::new(tiny_config());
    let graph = lower_model(&model, "tiny").unwrap();
    write_graph(&graph, &path).unwrap();

    let reread = read_graph(&path).unwrap();
    assert_eq!(reread.header, graph.header);
    assert_eq!(reread.data, graph.data);
}

#[test]
fn test_lowered_graph_produces_per_token_logits() {
    let model = QueryLm::new(tiny_config());
    let graph = lower_model(&model, "tiny").unwrap();

    let input_ids = vec![1.0, 5.0, 9.0];
    let logits = graph.execute(&input_ids).unwrap();

    assert_eq!(logits.len(), input_ids.len() * 32);
    assert!(logits.iter().all(|v| v.is_finite()));
}

#[test]
fn test_writer_creates_missing_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("deep").join("model.qtgf");

    write_placeholder(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_placeholder_survives_reread_unchanged() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("placeholder.qtgf");

    write_placeholder(&path).unwrap();
    let reread = read_graph(&path).unwrap();

    assert_eq!(reread.header, identity_graph().header);
    assert!(reread.data.is_empty());
}

#[test]
fn test_placeholder_rewrite_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("placeholder.qtgf");

    write_placeholder(&path).unwrap();
    let first = fs::read(&path).unwrap();
    write_placeholder(&path).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_reader_rejects_foreign_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("not-a-graph.bin");
    fs::write(&path, b"GGUFxxxxxxxxxxxx").unwrap();

    assert!(matches!(read_graph(&path), Err(ExportError::BadMagic)));
}

#[test]
fn test_reader_rejects_future_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("placeholder.qtgf");

    write_placeholder(&path).unwrap();
    let mut bytes = fs::read(&path).unwrap();
    bytes[4..8].copy_from_slice(&99u32.to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        read_graph(&path),
        Err(ExportError::UnsupportedVersion(99))
    ));
}

#[test]
fn test_reader_rejects_truncated_payload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.qtgf");

    let model = QueryLm::new(tiny_config());
    let graph = lower_model(&model, "tiny").unwrap();
    write_graph(&graph, &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() - 64]).unwrap();

    assert!(matches!(
        read_graph(&path),
        Err(ExportError::TruncatedPayload { .. })
    ));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn identity_graph_echoes_arbitrary_input(
            input in proptest::collection::vec(-1000.0f32..1000.0, 1..128)
        ) {
            let graph = identity_graph();
            let output = graph.execute(&input).unwrap();
            prop_assert_eq!(output, input);
        }

        #[test]
        fn embedding_lookup_clamps_out_of_range_ids(id in 0.0f32..10_000.0) {
            let model = QueryLm::new(tiny_config());
            let graph = lower_model(&model, "tiny").unwrap();
            let logits = graph.execute(&[id]).unwrap();
            prop_assert_eq!(logits.len(), 32);
            prop_assert!(logits.iter().all(|v| v.is_finite()));
        }
    }
}
