//! Domain profiles
//!
//! A profile bundles the domain-specific constants: the default base model
//! identifier, the instruction task line, and the seed examples appended
//! when the training dataset is too small.

use crate::dataset::Example;
use clap::ValueEnum;

/// Supported fine-tuning domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DomainProfile {
    /// Company export data queries
    ExportData,
    /// Place and city data queries
    Places,
}

impl DomainProfile {
    /// Base model identifier used when none is given on the command line.
    pub fn default_model_id(&self) -> &'static str {
        match self {
            DomainProfile::ExportData => "qt-base-25m",
            DomainProfile::Places => "qt-small-8m",
        }
    }

    /// The task line placed between the instruction header and the
    /// question.
    pub fn task_line(&self) -> &'static str {
        match self {
            DomainProfile::ExportData => "Answer the following query about company export data:",
            DomainProfile::Places => "Answer the following query about place and city data:",
        }
    }

    /// Seed examples appended when the dataset has too few entries.
    pub fn seed_examples(&self) -> Vec<Example> {
        let example = |question: &str, answer: &str| Example {
            question: question.to_string(),
            answer: answer.to_string(),
        };
        match self {
            DomainProfile::ExportData => vec![
                example(
                    "What are the top export companies globally?",
                    r#"[{"name": "Example Corp", "export_volume": 1000}]"#,
                ),
                example(
                    "Which companies have the highest revenue?",
                    r#"[{"name": "Example Inc", "revenue": 5000}]"#,
                ),
            ],
            DomainProfile::Places => vec![
                example(
                    "What are the most popular places in New York?",
                    r#"[{"placeName": "Central Park", "popularity": 92, "cityName": "New York"}, {"placeName": "Times Square", "popularity": 88, "cityName": "New York"}]"#,
                ),
                example(
                    "Compare attractions in San Francisco",
                    r#"[{"placeName": "Golden Gate Bridge", "popularity": 95, "cityName": "San Francisco"}, {"placeName": "Fisherman's Wharf", "popularity": 85, "cityName": "San Francisco"}]"#,
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querytune_model::registry::catalog;

    #[test]
    fn test_default_model_ids_are_in_catalog() {
        for profile in [DomainProfile::ExportData, DomainProfile::Places] {
            assert!(catalog(profile.default_model_id()).is_some());
        }
    }

    #[test]
    fn test_seed_answers_are_valid_json() {
        for profile in [DomainProfile::ExportData, DomainProfile::Places] {
            for example in profile.seed_examples() {
                let parsed: serde_json::Value =
                    serde_json::from_str(&example.answer).expect("seed answer must parse");
                assert!(parsed.is_array());
            }
        }
    }
}
