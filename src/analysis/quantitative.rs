//! Frequency distributions for multiple choice and rating questions.

use crate::analysis::table::ResponseTable;
use crate::models::{AnswerValue, ViewOutcome};
use serde::Serialize;
use std::collections::BTreeMap;

/// One distinct answer and how many responses gave it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: AnswerValue,
    pub count: usize,
}

/// Answer distribution for a single question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub prompt: String,
    /// Entries ordered by answer value ascending.
    pub entries: Vec<ValueCount>,
}

impl Distribution {
    /// Total answers counted.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// Count distinct values, keyed in ascending value order.
pub fn value_counts<'a, I>(values: I) -> BTreeMap<AnswerValue, usize>
where
    I: IntoIterator<Item = &'a AnswerValue>,
{
    let mut counts = BTreeMap::new();
    for value in values {
        *counts.entry(value.clone()).or_insert(0) += 1;
    }
    counts
}

/// Distribution of answers to `prompt`, sorted by value rather than count.
pub fn quantitative_distribution(prompt: &str, table: &ResponseTable) -> ViewOutcome<Distribution> {
    let values = table.non_null(prompt);

    if values.is_empty() {
        return ViewOutcome::NoData {
            prompt: prompt.to_string(),
        };
    }

    let entries = value_counts(values)
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();

    ViewOutcome::Ready(Distribution {
        prompt: prompt.to_string(),
        entries,
    })
}
