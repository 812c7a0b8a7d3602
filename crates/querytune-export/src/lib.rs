//! Interchange graph export for querytune
//!
//! Defines the QTGF container: a serialized computation graph that can be
//! evaluated outside the training library. The file layout follows the
//! SafeTensors convention of a JSON header followed by raw tensor data:
//!
//! ```text
//! magic "QTGF" | version u32 LE | header_len u64 LE | JSON header | f32 LE payload
//! ```
//!
//! Three entry points matter to the pipeline:
//! - [`export_model`] lowers a trained model into a graph and writes it;
//! - [`write_placeholder`] writes the single-node identity graph used as
//!   the last-resort artifact;
//! - [`Graph::execute`] runs a graph on an input tensor, which is how the
//!   placeholder's passthrough guarantee is checked.

pub mod error;
pub mod eval;
pub mod format;
pub mod graph;
pub mod lower;
pub mod placeholder;

pub use error::ExportError;
pub use format::{read_graph, write_graph, FORMAT_VERSION, MAGIC};
pub use graph::{Graph, GraphHeader, Node, Op, TensorSpec};
pub use lower::{export_model, lower_model};
pub use placeholder::{identity_graph, write_placeholder};
