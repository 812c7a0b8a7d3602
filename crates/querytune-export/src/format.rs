//! QTGF container reader and writer
//!
//! Layout: `magic | version u32 LE | header_len u64 LE | JSON header |
//! f32 LE payload`. The writer creates missing parent directories; the
//! reader rejects bad magic, unknown versions, and short payloads.

use crate::error::ExportError;
use crate::graph::{Graph, GraphHeader};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// File magic
pub const MAGIC: &[u8; 4] = b"QTGF";
/// Current container version
pub const FORMAT_VERSION: u32 = 1;

/// Write a graph to `path`, creating parent directories if needed.
pub fn write_graph(graph: &Graph, path: &Path) -> Result<(), ExportError> {
    graph.validate()?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let header = serde_json::to_vec(&graph.header)?;

    let mut file = fs::File::create(path)?;
    file.write_all(MAGIC)?;
    file.write_all(&FORMAT_VERSION.to_le_bytes())?;
    file.write_all(&(header.len() as u64).to_le_bytes())?;
    file.write_all(&header)?;
    for value in &graph.data {
        file.write_all(&value.to_le_bytes())?;
    }
    file.flush()?;

    Ok(())
}

/// Read a graph back from `path`.
pub fn read_graph(path: &Path) -> Result<Graph, ExportError> {
    let mut file = fs::File::open(path)?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)?;
    if &magic != MAGIC {
        return Err(ExportError::BadMagic);
    }

    let mut version_bytes = [0u8; 4];
    file.read_exact(&mut version_bytes)?;
    let version = u32::from_le_bytes(version_bytes);
    if version != FORMAT_VERSION {
        return Err(ExportError::UnsupportedVersion(version));
    }

    let mut len_bytes = [0u8; 8];
    file.read_exact(&mut len_bytes)?;
    let header_len = u64::from_le_bytes(len_bytes) as usize;

    let mut header_bytes = vec![0u8; header_len];
    file.read_exact(&mut header_bytes)?;
    let header: GraphHeader = serde_json::from_slice(&header_bytes)?;

    let mut payload = Vec::new();
    file.read_to_end(&mut payload)?;
    let data: Vec<f32> = payload
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    let expected: usize = header.tensors.iter().map(|t| t.len).sum();
    if data.len() < expected {
        return Err(ExportError::TruncatedPayload {
            expected,
            actual: data.len(),
        });
    }

    let graph = Graph { header, data };
    graph.validate()?;
    Ok(graph)
}
