//! Instruction prompt formatting

use crate::dataset::Example;
use crate::profile::DomainProfile;

const INSTRUCTION_HEADER: &str = "### Instruction:";
const RESPONSE_HEADER: &str = "### Response:";

/// Format one example into an instruction record.
///
/// The layout is fixed: instruction header, the profile's task line, the
/// question, a blank line, response header, the answer, and a trailing
/// newline.
pub fn format_example(example: &Example, profile: DomainProfile) -> String {
    format!(
        "{INSTRUCTION_HEADER}\n{}\n{}\n\n{RESPONSE_HEADER}\n{}\n",
        profile.task_line(),
        example.question,
        example.answer
    )
}

/// Format every example, preserving order.
pub fn format_dataset(examples: &[Example], profile: DomainProfile) -> Vec<String> {
    examples
        .iter()
        .map(|example| format_example(example, profile))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example() -> Example {
        Example {
            question: "Which companies export the most steel?".to_string(),
            answer: r#"[{"name": "Steelworks"}]"#.to_string(),
        }
    }

    #[test]
    fn test_format_layout_is_exact() {
        let record = format_example(&example(), DomainProfile::ExportData);
        assert_eq!(
            record,
            "### Instruction:\n\
             Answer the following query about company export data:\n\
             Which companies export the most steel?\n\
             \n\
             ### Response:\n\
             [{\"name\": \"Steelworks\"}]\n"
        );
    }

    #[test]
    fn test_format_dataset_preserves_count_and_order() {
        let examples = vec![example(), example()];
        let records = format_dataset(&examples, DomainProfile::Places);
        assert_eq!(records.len(), 2);
        assert!(records[0].contains("place and city data"));
    }
}
