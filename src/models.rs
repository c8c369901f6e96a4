//! Data models for the survey analytics pipeline.
//!
//! This module contains the stored shapes (questions and responses as the
//! store returns them), the typed answer values reconstructed from them, and
//! the report structures the views are rendered from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Declared answer type of a question.
///
/// The serialized names are the strings the form builder stores in the
/// `q_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "Short Answer")]
    ShortAnswer,
    #[serde(rename = "Paragraph")]
    Paragraph,
    #[serde(rename = "Multiple Choice")]
    MultipleChoice,
    #[serde(rename = "Rating (1-5)")]
    Rating1to5,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::ShortAnswer => write!(f, "Short Answer"),
            QuestionType::Paragraph => write!(f, "Paragraph"),
            QuestionType::MultipleChoice => write!(f, "Multiple Choice"),
            QuestionType::Rating1to5 => write!(f, "Rating (1-5)"),
        }
    }
}

impl QuestionType {
    /// Free-text questions are the ones eligible for sentiment analysis.
    pub fn is_free_text(&self) -> bool {
        matches!(self, QuestionType::ShortAnswer | QuestionType::Paragraph)
    }
}

/// Option shown when a multiple choice question was saved without options.
pub const DEFAULT_OPTION: &str = "Option 1";

/// A question definition owned by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Store-assigned identifier.
    pub id: i64,
    /// Owning administrator.
    #[serde(default)]
    pub admin_email: String,
    /// Display text; doubles as the answer key in responses.
    pub prompt: String,
    /// Declared answer type.
    pub q_type: QuestionType,
    /// Choices for multiple choice questions (null in storage reads as empty).
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    /// Marks a profile field rather than survey content.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_demographic: bool,
}

impl Question {
    /// Options a respondent can actually pick from.
    pub fn effective_options(&self) -> Vec<String> {
        if self.options.is_empty() {
            vec![DEFAULT_OPTION.to_string()]
        } else {
            self.options.clone()
        }
    }
}

/// A stored response, answers untyped as they are at rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub id: i64,
    /// Administrator whose form was filled in.
    pub admin_email: String,
    /// Prompt to raw answer value.
    #[serde(default, deserialize_with = "null_as_default")]
    pub answers: Map<String, Value>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A typed answer cell.
///
/// Ordering is what the quantitative view sorts by: ratings numerically,
/// choices and text lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Rating(u8),
    Choice(String),
    Text(String),
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Rating(n) => write!(f, "{}", n),
            AnswerValue::Choice(s) | AnswerValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl AnswerValue {
    /// Convert a raw stored value using the originating question's type.
    ///
    /// Returns `None` for nulls and for values that do not fit the declared
    /// type. When the question is unknown (orphaned prompt) the value is
    /// typed from its JSON shape.
    pub fn from_stored(raw: &Value, q_type: Option<QuestionType>) -> Option<Self> {
        match (q_type, raw) {
            (_, Value::Null) => None,
            (Some(QuestionType::ShortAnswer | QuestionType::Paragraph), value) => {
                Some(AnswerValue::Text(json_text(value)))
            }
            (Some(QuestionType::MultipleChoice), Value::String(s)) => {
                Some(AnswerValue::Choice(s.clone()))
            }
            (Some(QuestionType::MultipleChoice), _) => None,
            (Some(QuestionType::Rating1to5), value) => parse_rating(value).map(AnswerValue::Rating),
            (None, Value::String(s)) => Some(AnswerValue::Text(s.clone())),
            (None, value) => Some(
                parse_rating(value)
                    .map(AnswerValue::Rating)
                    .unwrap_or_else(|| AnswerValue::Text(json_text(value))),
            ),
        }
    }
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Accepts integers 1..=5, either as JSON numbers or numeric strings.
///
/// Whole-number floats such as `4.0` count as integers.
pub fn parse_rating(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => i,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 {
                    return None;
                }
                f as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    if (1..=5).contains(&n) {
        Some(n as u8)
    } else {
        None
    }
}

/// Which analytical partition a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    Demographic,
    FreeText,
    Quantitative,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Demographic => write!(f, "demographic"),
            QuestionKind::FreeText => write!(f, "free-text"),
            QuestionKind::Quantitative => write!(f, "quantitative"),
        }
    }
}

impl QuestionKind {
    /// Demographic wins over the declared type.
    pub fn of(question: &Question) -> Self {
        if question.is_demographic {
            QuestionKind::Demographic
        } else if question.q_type.is_free_text() {
            QuestionKind::FreeText
        } else {
            QuestionKind::Quantitative
        }
    }
}

/// Sentiment label set, uppercased for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "POSITIVE"),
            SentimentLabel::Neutral => write!(f, "NEUTRAL"),
            SentimentLabel::Negative => write!(f, "NEGATIVE"),
        }
    }
}

impl SentimentLabel {
    /// Normalize a label as emitted by a sentiment model.
    ///
    /// `LABEL_n` follows the negative/neutral/positive index order used by
    /// the three-class multilingual models.
    pub fn from_model_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "POSITIVE" | "POS" | "LABEL_2" => Some(SentimentLabel::Positive),
            "NEUTRAL" | "NEU" | "LABEL_1" => Some(SentimentLabel::Neutral),
            "NEGATIVE" | "NEG" | "LABEL_0" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }
}

/// Outcome of one analytical view.
///
/// The empty states are informational, not errors.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewOutcome<T> {
    Ready(T),
    /// The selected question has no usable answers.
    NoData { prompt: String },
    /// The administrator has no questions in this partition.
    NoQuestionsOfType(QuestionKind),
}

impl<T> ViewOutcome<T> {
    #[allow(dead_code)] // Convenience for callers that only need the data
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewOutcome::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Whether the store answered the fetches for this report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreStatus {
    Available,
    Unavailable { reason: String },
}

impl StoreStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, StoreStatus::Available)
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Administrator the report is scoped to.
    pub admin: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Store availability during the fetch.
    pub store_status: StoreStatus,
    /// Number of questions in the schema.
    pub question_count: usize,
    /// Number of responses collected.
    pub response_count: usize,
    /// Sentiment model, when sentiment analysis ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier_model: Option<String>,
    /// Duration of the analysis in seconds.
    pub duration_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(prompt: &str, q_type: QuestionType, is_demographic: bool) -> Question {
        Question {
            id: 1,
            admin_email: "admin@example.com".to_string(),
            prompt: prompt.to_string(),
            q_type,
            options: vec![],
            is_demographic,
        }
    }

    #[test]
    fn test_question_deserialize_store_row() {
        let row = json!({
            "id": 7,
            "admin_email": "admin@example.com",
            "prompt": "Age Group",
            "q_type": "Multiple Choice",
            "options": null,
            "is_demographic": null
        });

        let q: Question = serde_json::from_value(row).unwrap();
        assert_eq!(q.q_type, QuestionType::MultipleChoice);
        assert!(q.options.is_empty());
        assert!(!q.is_demographic);
        assert_eq!(q.effective_options(), vec!["Option 1".to_string()]);
    }

    #[test]
    fn test_question_type_wire_names() {
        let q_type: QuestionType = serde_json::from_value(json!("Rating (1-5)")).unwrap();
        assert_eq!(q_type, QuestionType::Rating1to5);
        assert_eq!(
            serde_json::to_value(QuestionType::ShortAnswer).unwrap(),
            json!("Short Answer")
        );
    }

    #[test]
    fn test_question_kind_demographic_wins() {
        let q = question("Comments", QuestionType::Paragraph, true);
        assert_eq!(QuestionKind::of(&q), QuestionKind::Demographic);

        let q = question("Comfort", QuestionType::Rating1to5, false);
        assert_eq!(QuestionKind::of(&q), QuestionKind::Quantitative);

        let q = question("Name", QuestionType::ShortAnswer, false);
        assert_eq!(QuestionKind::of(&q), QuestionKind::FreeText);
    }

    #[test]
    fn test_answer_from_stored_typed() {
        assert_eq!(
            AnswerValue::from_stored(&json!(4), Some(QuestionType::Rating1to5)),
            Some(AnswerValue::Rating(4))
        );
        assert_eq!(
            AnswerValue::from_stored(&json!("5"), Some(QuestionType::Rating1to5)),
            Some(AnswerValue::Rating(5))
        );
        assert_eq!(
            AnswerValue::from_stored(&json!(9), Some(QuestionType::Rating1to5)),
            None
        );
        assert_eq!(
            AnswerValue::from_stored(&json!(3), Some(QuestionType::MultipleChoice)),
            None
        );
        assert_eq!(
            AnswerValue::from_stored(&json!(12), Some(QuestionType::ShortAnswer)),
            Some(AnswerValue::Text("12".to_string()))
        );
        assert_eq!(
            AnswerValue::from_stored(&Value::Null, Some(QuestionType::Paragraph)),
            None
        );
    }

    #[test]
    fn test_answer_from_stored_orphaned() {
        assert_eq!(
            AnswerValue::from_stored(&json!(2), None),
            Some(AnswerValue::Rating(2))
        );
        assert_eq!(
            AnswerValue::from_stored(&json!(true), None),
            Some(AnswerValue::Text("true".to_string()))
        );
    }

    #[test]
    fn test_parse_rating_whole_floats() {
        assert_eq!(parse_rating(&json!(4.0)), Some(4));
        assert_eq!(parse_rating(&json!(4.5)), None);
        assert_eq!(parse_rating(&json!(6.0)), None);
        assert_eq!(
            AnswerValue::from_stored(&json!(5.0), Some(QuestionType::Rating1to5)),
            Some(AnswerValue::Rating(5))
        );
    }

    #[test]
    fn test_answer_ordering() {
        let mut ratings = vec![
            AnswerValue::Rating(5),
            AnswerValue::Rating(1),
            AnswerValue::Rating(3),
        ];
        ratings.sort();
        assert_eq!(
            ratings,
            vec![
                AnswerValue::Rating(1),
                AnswerValue::Rating(3),
                AnswerValue::Rating(5)
            ]
        );

        assert!(AnswerValue::Choice("26-40".into()) > AnswerValue::Choice("18-25".into()));
    }

    #[test]
    fn test_sentiment_label_normalization() {
        assert_eq!(
            SentimentLabel::from_model_label("positive"),
            Some(SentimentLabel::Positive)
        );
        assert_eq!(
            SentimentLabel::from_model_label("LABEL_0"),
            Some(SentimentLabel::Negative)
        );
        assert_eq!(
            SentimentLabel::from_model_label("Neutral"),
            Some(SentimentLabel::Neutral)
        );
        assert_eq!(SentimentLabel::from_model_label("joy"), None);
        assert_eq!(SentimentLabel::Positive.to_string(), "POSITIVE");
    }
}
