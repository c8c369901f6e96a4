//! Question partitioning into demographic, free-text and quantitative sets.

use crate::models::{Question, QuestionKind};
use serde::Serialize;

/// Prompts of one administrator's questions, split by analytical kind.
///
/// Order within each set follows the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionPartition {
    pub demographic: Vec<String>,
    pub free_text: Vec<String>,
    pub quantitative: Vec<String>,
}

impl QuestionPartition {
    /// Prompts belonging to `kind`.
    pub fn prompts(&self, kind: QuestionKind) -> &[String] {
        match kind {
            QuestionKind::Demographic => &self.demographic,
            QuestionKind::FreeText => &self.free_text,
            QuestionKind::Quantitative => &self.quantitative,
        }
    }

    /// Partition a prompt falls into, if it is part of the schema.
    pub fn kind_of(&self, prompt: &str) -> Option<QuestionKind> {
        [
            QuestionKind::Demographic,
            QuestionKind::FreeText,
            QuestionKind::Quantitative,
        ]
        .into_iter()
        .find(|kind| self.prompts(*kind).iter().any(|p| p == prompt))
    }

    pub fn total(&self) -> usize {
        self.demographic.len() + self.free_text.len() + self.quantitative.len()
    }
}

/// Split questions into the three partitions.
pub fn partition_questions(questions: &[Question]) -> QuestionPartition {
    let mut partition = QuestionPartition::default();

    for question in questions {
        let prompt = question.prompt.clone();
        match QuestionKind::of(question) {
            QuestionKind::Demographic => partition.demographic.push(prompt),
            QuestionKind::FreeText => partition.free_text.push(prompt),
            QuestionKind::Quantitative => partition.quantitative.push(prompt),
        }
    }

    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;

    fn make(prompt: &str, q_type: QuestionType, is_demographic: bool) -> Question {
        Question {
            id: 0,
            admin_email: String::new(),
            prompt: prompt.to_string(),
            q_type,
            options: vec![],
            is_demographic,
        }
    }

    fn all_types() -> Vec<QuestionType> {
        vec![
            QuestionType::ShortAnswer,
            QuestionType::Paragraph,
            QuestionType::MultipleChoice,
            QuestionType::Rating1to5,
        ]
    }

    #[test]
    fn test_partition_complete_and_disjoint() {
        let mut questions = Vec::new();
        for (i, q_type) in all_types().into_iter().enumerate() {
            questions.push(make(&format!("q{}", i), q_type, false));
            questions.push(make(&format!("d{}", i), q_type, true));
        }

        let partition = partition_questions(&questions);

        assert_eq!(partition.total(), questions.len());
        for q in &questions {
            let hits = [
                &partition.demographic,
                &partition.free_text,
                &partition.quantitative,
            ]
            .iter()
            .filter(|set| set.contains(&q.prompt))
            .count();
            assert_eq!(hits, 1, "{} must be in exactly one partition", q.prompt);
        }
        assert_eq!(partition.demographic, vec!["d0", "d1", "d2", "d3"]);
        assert_eq!(partition.free_text, vec!["q0", "q1"]);
        assert_eq!(partition.quantitative, vec!["q2", "q3"]);
    }

    #[test]
    fn test_partition_preserves_input_order() {
        let questions = vec![
            make("Zeta", QuestionType::Rating1to5, false),
            make("Alpha", QuestionType::MultipleChoice, false),
        ];

        let partition = partition_questions(&questions);

        assert_eq!(partition.quantitative, vec!["Zeta", "Alpha"]);
        assert_eq!(partition.kind_of("Alpha"), Some(QuestionKind::Quantitative));
        assert_eq!(partition.kind_of("Missing"), None);
    }

    #[test]
    fn test_empty_schema() {
        let partition = partition_questions(&[]);
        assert_eq!(partition.total(), 0);
        assert!(partition.prompts(QuestionKind::FreeText).is_empty());
    }
}
