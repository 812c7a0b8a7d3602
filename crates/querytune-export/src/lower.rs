//! Lowering a trained model into an interchange graph
//!
//! Translates the model's three linear layers into an Embed / MatMul / Add
//! / Relu node chain and packs the weights into a single payload. Weight
//! orientation from the training library is normalized to `[in, out]` so
//! the evaluator's matmul convention holds.

use crate::error::ExportError;
use crate::format::write_graph;
use crate::graph::{Graph, GraphHeader, Node, Op, TensorSpec, PRODUCER};
use querytune_model::{NamedTensor, QueryLm};
use std::path::Path;

/// Normalize a layer weight to `[rows, cols]` row-major order.
///
/// Linear layers may store their weight as `[out, in]`; the graph wants
/// `[in, out]` so activations multiply on the left.
fn orient(tensor: &NamedTensor, rows: usize, cols: usize) -> Result<(Vec<usize>, Vec<f32>), ExportError> {
    if tensor.shape == [rows, cols] {
        return Ok((vec![rows, cols], tensor.values.clone()));
    }
    if tensor.shape == [cols, rows] {
        let mut transposed = vec![0.0f32; tensor.values.len()];
        for r in 0..cols {
            for c in 0..rows {
                transposed[c * cols + r] = tensor.values[r * rows + c];
            }
        }
        return Ok((vec![rows, cols], transposed));
    }
    Err(ExportError::Malformed(format!(
        "tensor `{}` has shape {:?}, expected [{rows}, {cols}]",
        tensor.name, tensor.shape
    )))
}

/// Normalize a bias to a flat `[len]` vector.
fn flatten_bias(tensor: &NamedTensor, len: usize) -> Result<(Vec<usize>, Vec<f32>), ExportError> {
    if tensor.values.len() != len {
        return Err(ExportError::Malformed(format!(
            "tensor `{}` has {} values, expected {len}",
            tensor.name,
            tensor.values.len()
        )));
    }
    Ok((vec![len], tensor.values.clone()))
}

/// Lower a trained model into a graph named `name`.
pub fn lower_model(model: &QueryLm, name: &str) -> Result<Graph, ExportError> {
    let config = model.config();
    let exported = model.export_tensors();
    let find = |tensor_name: &str| -> Result<&NamedTensor, ExportError> {
        exported
            .iter()
            .find(|t| t.name == tensor_name)
            .ok_or_else(|| ExportError::Malformed(format!("model is missing `{tensor_name}`")))
    };

    // (name, shape, values) in payload order
    let packed: Vec<(String, Vec<usize>, Vec<f32>)> = vec![
        {
            let (shape, values) =
                orient(find("embed.weight")?, config.vocab_size, config.n_embd)?;
            ("embed.weight".to_string(), shape, values)
        },
        {
            let (shape, values) = flatten_bias(find("embed.bias")?, config.n_embd)?;
            ("embed.bias".to_string(), shape, values)
        },
        {
            let (shape, values) =
                orient(find("hidden.weight")?, config.n_embd, config.n_hidden)?;
            ("hidden.weight".to_string(), shape, values)
        },
        {
            let (shape, values) = flatten_bias(find("hidden.bias")?, config.n_hidden)?;
            ("hidden.bias".to_string(), shape, values)
        },
        {
            let (shape, values) =
                orient(find("lm_head.weight")?, config.n_hidden, config.vocab_size)?;
            ("lm_head.weight".to_string(), shape, values)
        },
        {
            let (shape, values) = flatten_bias(find("lm_head.bias")?, config.vocab_size)?;
            ("lm_head.bias".to_string(), shape, values)
        },
    ];

    let mut tensors = Vec::with_capacity(packed.len());
    let mut data = Vec::new();
    for (tensor_name, shape, values) in packed {
        tensors.push(TensorSpec {
            name: tensor_name,
            shape,
            offset: data.len(),
            len: values.len(),
        });
        data.extend(values);
    }

    let node = |name: &str, op: Op, inputs: &[&str], output: &str| Node {
        name: name.to_string(),
        op,
        inputs: inputs.iter().map(|s| s.to_string()).collect(),
        outputs: vec![output.to_string()],
    };

    let graph = Graph {
        header: GraphHeader {
            name: name.to_string(),
            producer: PRODUCER.to_string(),
            inputs: vec!["input_ids".to_string()],
            outputs: vec!["logits".to_string()],
            nodes: vec![
                node("embed", Op::Embed, &["input_ids", "embed.weight"], "x0"),
                node("embed_bias", Op::Add, &["x0", "embed.bias"], "x1"),
                node("hidden", Op::MatMul, &["x1", "hidden.weight"], "x2"),
                node("hidden_bias", Op::Add, &["x2", "hidden.bias"], "x3"),
                node("act", Op::Relu, &["x3"], "x4"),
                node("lm_head", Op::MatMul, &["x4", "lm_head.weight"], "x5"),
                node("lm_head_bias", Op::Add, &["x5", "lm_head.bias"], "logits"),
            ],
            tensors,
        },
        data,
    };

    graph.validate()?;
    Ok(graph)
}

/// Lower a model and write it to `path` in one step.
pub fn export_model(model: &QueryLm, name: &str, path: &Path) -> Result<(), ExportError> {
    let graph = lower_model(model, name)?;
    write_graph(&graph, path)
}
