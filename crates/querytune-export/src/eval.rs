//! Reference graph evaluator
//!
//! Executes a graph on a single input tensor so exported artifacts can be
//! used for inference without the training library. Nodes are evaluated in
//! file order; graphs are written topologically sorted.

use crate::error::ExportError;
use crate::graph::{Graph, Op};
use std::collections::HashMap;

/// A value flowing through the graph: shape plus row-major data.
type Value = (Vec<usize>, Vec<f32>);

impl Graph {
    /// Run the graph on a single input tensor (bound to the first declared
    /// graph input, with shape `[input.len()]`) and return the values of
    /// the first declared output.
    pub fn execute(&self, input: &[f32]) -> Result<Vec<f32>, ExportError> {
        self.validate()?;

        let mut env: HashMap<String, Value> = HashMap::new();
        let input_name = &self.header.inputs[0];
        env.insert(input_name.clone(), (vec![input.len()], input.to_vec()));

        for spec in &self.header.tensors {
            let values = self.data[spec.offset..spec.offset + spec.len].to_vec();
            env.insert(spec.name.clone(), (spec.shape.clone(), values));
        }

        for node in &self.header.nodes {
            let result = self.eval_node(node.op, &node.inputs, &env, &node.name)?;
            let out_name = node.outputs.first().ok_or_else(|| {
                ExportError::Malformed(format!("node `{}` has no output", node.name))
            })?;
            env.insert(out_name.clone(), result);
        }

        let output_name = &self.header.outputs[0];
        let (_, values) = env.remove(output_name).ok_or_else(|| {
            ExportError::Malformed(format!("graph output `{output_name}` was never produced"))
        })?;
        Ok(values)
    }

    fn eval_node(
        &self,
        op: Op,
        inputs: &[String],
        env: &HashMap<String, Value>,
        node_name: &str,
    ) -> Result<Value, ExportError> {
        let operand = |i: usize| -> Result<&Value, ExportError> {
            let name = inputs.get(i).ok_or_else(|| {
                ExportError::Malformed(format!("node `{node_name}` missing operand {i}"))
            })?;
            env.get(name).ok_or_else(|| {
                ExportError::Malformed(format!("node `{node_name}` reads undefined `{name}`"))
            })
        };

        match op {
            Op::Identity => {
                let (shape, values) = operand(0)?;
                Ok((shape.clone(), values.clone()))
            }
            Op::Relu => {
                let (shape, values) = operand(0)?;
                Ok((shape.clone(), values.iter().map(|v| v.max(0.0)).collect()))
            }
            Op::Embed => {
                let (_, ids) = operand(0)?;
                let (table_shape, table) = operand(1)?;
                if table_shape.len() != 2 {
                    return Err(ExportError::Malformed(format!(
                        "node `{node_name}`: embedding table must be 2-D"
                    )));
                }
                let (vocab, dim) = (table_shape[0], table_shape[1]);
                let mut out = Vec::with_capacity(ids.len() * dim);
                for &id in ids {
                    let row = (id.max(0.0) as usize).min(vocab - 1);
                    out.extend_from_slice(&table[row * dim..(row + 1) * dim]);
                }
                Ok((vec![ids.len(), dim], out))
            }
            Op::MatMul => {
                let (x_shape, x) = operand(0)?;
                let (w_shape, w) = operand(1)?;
                if x_shape.len() != 2 || w_shape.len() != 2 || x_shape[1] != w_shape[0] {
                    return Err(ExportError::Malformed(format!(
                        "node `{node_name}`: matmul shape mismatch {x_shape:?} x {w_shape:?}"
                    )));
                }
                let (n, k, m) = (x_shape[0], x_shape[1], w_shape[1]);
                let mut out = vec![0.0f32; n * m];
                for row in 0..n {
                    for inner in 0..k {
                        let xv = x[row * k + inner];
                        if xv == 0.0 {
                            continue;
                        }
                        for col in 0..m {
                            out[row * m + col] += xv * w[inner * m + col];
                        }
                    }
                }
                Ok((vec![n, m], out))
            }
            Op::Add => {
                let (x_shape, x) = operand(0)?;
                let (b_shape, b) = operand(1)?;
                if x_shape == b_shape {
                    let out = x.iter().zip(b.iter()).map(|(a, c)| a + c).collect();
                    return Ok((x_shape.clone(), out));
                }
                // Row broadcast: [n, m] + [m]
                if x_shape.len() == 2 && b.len() == x_shape[1] {
                    let m = x_shape[1];
                    let out = x
                        .iter()
                        .enumerate()
                        .map(|(i, v)| v + b[i % m])
                        .collect();
                    return Ok((x_shape.clone(), out));
                }
                Err(ExportError::Malformed(format!(
                    "node `{node_name}`: add shape mismatch {x_shape:?} + {b_shape:?}"
                )))
            }
        }
    }
}
