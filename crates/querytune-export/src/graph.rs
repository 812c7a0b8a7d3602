//! Computation graph document model

use crate::error::ExportError;
use serde::{Deserialize, Serialize};

/// Producer string recorded in every graph header
pub const PRODUCER: &str = "querytune";

/// Supported graph operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Pass the input through unchanged
    Identity,
    /// Row lookup: token ids against an embedding table `[vocab, dim]`
    Embed,
    /// `[n, k] x [k, m] -> [n, m]`
    MatMul,
    /// Elementwise add, or `[n, m] + [m]` row broadcast
    Add,
    /// Elementwise `max(0, x)`
    Relu,
}

/// One operation in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub op: Op,
    /// Value names consumed, in operand order
    pub inputs: Vec<String>,
    /// Value names produced
    pub outputs: Vec<String>,
}

/// Location of a weight tensor inside the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TensorSpec {
    pub name: String,
    pub shape: Vec<usize>,
    /// Offset into the payload, in f32 elements
    pub offset: usize,
    /// Length, in f32 elements
    pub len: usize,
}

/// JSON header of a QTGF file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphHeader {
    pub name: String,
    pub producer: String,
    /// Graph-level input value names
    pub inputs: Vec<String>,
    /// Graph-level output value names
    pub outputs: Vec<String>,
    pub nodes: Vec<Node>,
    pub tensors: Vec<TensorSpec>,
}

/// A complete interchange graph: header plus tensor payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    pub header: GraphHeader,
    /// Concatenated tensor values, laid out per `header.tensors`
    pub data: Vec<f32>,
}

impl Graph {
    /// Look up a weight tensor by name.
    pub fn tensor(&self, name: &str) -> Option<(&TensorSpec, &[f32])> {
        let spec = self.header.tensors.iter().find(|t| t.name == name)?;
        let values = self.data.get(spec.offset..spec.offset + spec.len)?;
        Some((spec, values))
    }

    /// Check structural consistency: tensor extents inside the payload,
    /// shapes matching lengths, finite values, and at least one node.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.header.nodes.is_empty() {
            return Err(ExportError::Malformed("graph has no nodes".to_string()));
        }
        if self.header.inputs.is_empty() || self.header.outputs.is_empty() {
            return Err(ExportError::Malformed(
                "graph must declare inputs and outputs".to_string(),
            ));
        }
        for spec in &self.header.tensors {
            let end = spec.offset + spec.len;
            if end > self.data.len() {
                return Err(ExportError::TruncatedPayload {
                    expected: end,
                    actual: self.data.len(),
                });
            }
            if spec.shape.iter().product::<usize>() != spec.len {
                return Err(ExportError::Malformed(format!(
                    "tensor `{}` shape {:?} does not match length {}",
                    spec.name, spec.shape, spec.len
                )));
            }
            let values = &self.data[spec.offset..end];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(ExportError::NonFiniteWeights(spec.name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_node_graph(data: Vec<f32>, len: usize) -> Graph {
        Graph {
            header: GraphHeader {
                name: "test".to_string(),
                producer: PRODUCER.to_string(),
                inputs: vec!["x".to_string()],
                outputs: vec!["y".to_string()],
                nodes: vec![Node {
                    name: "n0".to_string(),
                    op: Op::Identity,
                    inputs: vec!["x".to_string()],
                    outputs: vec!["y".to_string()],
                }],
                tensors: vec![TensorSpec {
                    name: "w".to_string(),
                    shape: vec![len],
                    offset: 0,
                    len,
                }],
            },
            data,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_graph() {
        let graph = one_node_graph(vec![1.0, 2.0], 2);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_truncated_payload() {
        let graph = one_node_graph(vec![1.0], 2);
        assert!(matches!(
            graph.validate(),
            Err(ExportError::TruncatedPayload { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_weights() {
        let graph = one_node_graph(vec![1.0, f32::NAN], 2);
        assert!(matches!(
            graph.validate(),
            Err(ExportError::NonFiniteWeights(_))
        ));
    }
}
