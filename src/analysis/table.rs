//! Response tabulation.
//!
//! Reshapes stored responses into a row-per-response table whose columns
//! are the union of every prompt answered in any response. Cells are typed
//! against the question that owns the prompt.

use crate::models::{AnswerValue, Question, QuestionType, Response};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// A tabulated response set. Missing cells are null.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseTable {
    /// Column prompts in first-seen order.
    columns: Vec<String>,
    /// One map per response; absent keys are null cells.
    rows: Vec<BTreeMap<String, AnswerValue>>,
    /// Cells dropped because they did not fit the declared question type.
    #[serde(skip)]
    rejected: usize,
}

impl ResponseTable {
    /// Column prompts.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of cells nulled during type validation.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn has_column(&self, prompt: &str) -> bool {
        self.columns.iter().any(|c| c == prompt)
    }

    /// Cell at the given row and column.
    #[cfg(test)]
    pub fn cell(&self, row: usize, prompt: &str) -> Option<&AnswerValue> {
        self.rows.get(row).and_then(|r| r.get(prompt))
    }

    /// Iterate the rows as prompt-to-value maps.
    pub fn rows(&self) -> impl Iterator<Item = &BTreeMap<String, AnswerValue>> {
        self.rows.iter()
    }

    /// Non-null values of one column, in row order.
    pub fn non_null(&self, prompt: &str) -> Vec<&AnswerValue> {
        self.rows.iter().filter_map(|r| r.get(prompt)).collect()
    }

    /// Sub-table restricted to `prompts`, dropping rows where every one of
    /// those columns is null.
    pub fn select_non_empty(&self, prompts: &[String]) -> ResponseTable {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                prompts
                    .iter()
                    .filter_map(|p| row.get(p).map(|v| (p.clone(), v.clone())))
                    .collect::<BTreeMap<_, _>>()
            })
            .filter(|row| !row.is_empty())
            .collect();

        ResponseTable {
            columns: prompts.to_vec(),
            rows,
            rejected: 0,
        }
    }
}

/// Build the table for one administrator's responses.
///
/// Prompts without a matching question are kept as columns and typed from
/// their JSON shape. Values that do not fit the declared type become nulls.
pub fn tabulate(questions: &[Question], responses: &[Response]) -> ResponseTable {
    let types: HashMap<&str, QuestionType> = questions
        .iter()
        .map(|q| (q.prompt.as_str(), q.q_type))
        .collect();

    let mut table = ResponseTable::default();

    for response in responses {
        let mut row = BTreeMap::new();

        for (prompt, raw) in &response.answers {
            if !table.has_column(prompt) {
                table.columns.push(prompt.clone());
            }

            let q_type = types.get(prompt.as_str()).copied();
            match AnswerValue::from_stored(raw, q_type) {
                Some(value) => {
                    row.insert(prompt.clone(), value);
                }
                None if !raw.is_null() => {
                    debug!(
                        "Response {}: answer to '{}' does not fit {:?}, treating as null",
                        response.id, prompt, q_type
                    );
                    table.rejected += 1;
                }
                None => {}
            }
        }

        table.rows.push(row);
    }

    debug!(
        "Tabulated {} responses into {} columns ({} cells rejected)",
        table.rows.len(),
        table.columns.len(),
        table.rejected
    );

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};
    use std::collections::HashSet;

    fn response(answers: Value) -> Response {
        let answers: Map<String, Value> = match answers {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Response {
            id: 0,
            admin_email: "admin@example.com".to_string(),
            answers,
        }
    }

    fn rating_question(prompt: &str) -> Question {
        Question {
            id: 1,
            admin_email: "admin@example.com".to_string(),
            prompt: prompt.to_string(),
            q_type: QuestionType::Rating1to5,
            options: vec![],
            is_demographic: false,
        }
    }

    #[test]
    fn test_columns_are_union_of_keys() {
        let responses = vec![
            response(json!({"A": "x", "B": "y"})),
            response(json!({"B": "z", "C": "w"})),
            response(json!({})),
        ];

        let table = tabulate(&[], &responses);

        let columns: HashSet<&str> = table.columns().iter().map(String::as_str).collect();
        assert_eq!(columns, HashSet::from(["A", "B", "C"]));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_missing_key_is_null_cell() {
        let responses = vec![
            response(json!({"A": "x"})),
            response(json!({"B": "y"})),
        ];

        let table = tabulate(&[], &responses);

        assert_eq!(table.cell(0, "A"), Some(&AnswerValue::Text("x".to_string())));
        assert_eq!(table.cell(0, "B"), None);
        assert_eq!(table.cell(1, "A"), None);
    }

    #[test]
    fn test_type_mismatch_is_nulled() {
        let questions = vec![rating_question("Comfort")];
        let responses = vec![
            response(json!({"Comfort": 4})),
            response(json!({"Comfort": "very"})),
            response(json!({"Comfort": null})),
        ];

        let table = tabulate(&questions, &responses);

        assert_eq!(table.non_null("Comfort"), vec![&AnswerValue::Rating(4)]);
        assert_eq!(table.rejected(), 1);
        assert!(table.has_column("Comfort"));
    }

    #[test]
    fn test_select_non_empty_drops_all_null_rows() {
        let responses = vec![
            response(json!({"Age": "18-25", "Comments": "ok"})),
            response(json!({"Comments": "fine"})),
            response(json!({"Town": "North"})),
        ];
        let table = tabulate(&[], &responses);

        let sub = table.select_non_empty(&["Age".to_string(), "Town".to_string()]);

        assert_eq!(sub.len(), 2);
        assert_eq!(sub.columns(), &["Age".to_string(), "Town".to_string()]);
        assert_eq!(sub.cell(0, "Comments"), None);
    }
}
