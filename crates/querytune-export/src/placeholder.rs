//! Last-resort placeholder artifact
//!
//! When training or the full export fails, the pipeline still writes a
//! valid graph: a single identity node that echoes `input_ids` back as
//! `logits`. Downstream consumers can load it like any other artifact.

use crate::error::ExportError;
use crate::format::write_graph;
use crate::graph::{Graph, GraphHeader, Node, Op, PRODUCER};
use std::path::Path;

/// Name recorded in the placeholder's header
pub const PLACEHOLDER_NAME: &str = "querytune-placeholder";

/// Build the single-node identity graph.
pub fn identity_graph() -> Graph {
    Graph {
        header: GraphHeader {
            name: PLACEHOLDER_NAME.to_string(),
            producer: PRODUCER.to_string(),
            inputs: vec!["input_ids".to_string()],
            outputs: vec!["logits".to_string()],
            nodes: vec![Node {
                name: "passthrough".to_string(),
                op: Op::Identity,
                inputs: vec!["input_ids".to_string()],
                outputs: vec!["logits".to_string()],
            }],
            tensors: Vec::new(),
        },
        data: Vec::new(),
    }
}

/// Write the identity placeholder to `path`.
pub fn write_placeholder(path: &Path) -> Result<(), ExportError> {
    write_graph(&identity_graph(), path)
}
