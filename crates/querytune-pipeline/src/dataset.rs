//! Training data loading and augmentation

use crate::error::DataError;
use crate::events::{EventSink, PipelineEvent};
use crate::profile::DomainProfile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Datasets smaller than this are padded with the profile's seed examples.
pub const MIN_EXAMPLES: usize = 5;

/// One question/answer training pair.
///
/// The JSON field names are capitalized to match the upstream data
/// producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Answer")]
    pub answer: String,
}

/// Load training examples from a JSON array file.
///
/// Unreadable or unparseable data is the one fatal condition in the
/// pipeline; there is nothing sensible to train on without it.
pub fn load_examples(path: &Path) -> Result<Vec<Example>, DataError> {
    let content = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Append the profile's seed examples when the dataset is too small.
///
/// Seeds are appended after the originals, preserving input order. Returns
/// the number of examples added.
pub fn augment(examples: &mut Vec<Example>, profile: DomainProfile, sink: &dyn EventSink) -> usize {
    if examples.len() >= MIN_EXAMPLES {
        return 0;
    }
    let seeds = profile.seed_examples();
    let added = seeds.len();
    examples.extend(seeds);
    sink.emit(PipelineEvent::ExamplesAugmented {
        added,
        total: examples.len(),
    });
    added
}
