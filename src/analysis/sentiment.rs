//! Sentiment aggregation over one free-text question.
//!
//! Every non-blank answer to the selected question is classified on its own,
//! serially. A failed classification marks that row and the pass continues.

use crate::analysis::table::ResponseTable;
use crate::classifier::SentimentClassifier;
use crate::error::ClassifierError;
use crate::models::{SentimentLabel, ViewOutcome};
use indicatif::ProgressBar;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Classification of a single answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRecord {
    /// Answer text as submitted.
    pub text: String,
    /// Predicted label; `None` when classification failed.
    pub label: Option<SentimentLabel>,
    /// Confidence rounded to 4 decimals.
    pub confidence: Option<f64>,
    /// Failure message for rows that could not be classified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SentimentRecord {
    fn failed(text: String, error: &ClassifierError) -> Self {
        Self {
            text,
            label: None,
            confidence: None,
            error: Some(error.to_string()),
        }
    }
}

/// Number of answers given one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: SentimentLabel,
    pub count: usize,
}

/// Summary statistics over the classified answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSummary {
    /// Answers successfully classified.
    pub total: usize,
    /// Answers whose classification failed.
    pub failed: usize,
    /// Per-label counts, most frequent first.
    pub counts: Vec<LabelCount>,
    /// Share of POSITIVE answers in percent (1 decimal), when any exist.
    pub positive_rate: Option<f64>,
}

impl SentimentSummary {
    /// Compute the summary from per-answer records.
    pub fn from_records(records: &[SentimentRecord]) -> Self {
        let mut by_label: HashMap<SentimentLabel, usize> = HashMap::new();
        let mut failed = 0;

        for record in records {
            match record.label {
                Some(label) => *by_label.entry(label).or_insert(0) += 1,
                None => failed += 1,
            }
        }

        let total = records.len() - failed;

        let mut counts: Vec<LabelCount> = by_label
            .into_iter()
            .map(|(label, count)| LabelCount { label, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.label.cmp(&b.label)));

        let positive_rate = counts
            .iter()
            .find(|c| c.label == SentimentLabel::Positive)
            .map(|c| round_to(c.count as f64 / total as f64 * 100.0, 1));

        Self {
            total,
            failed,
            counts,
            positive_rate,
        }
    }

    /// Count for a label, zero when absent.
    pub fn count(&self, label: SentimentLabel) -> usize {
        self.counts
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Result of the sentiment view for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentAnalysis {
    pub prompt: String,
    pub records: Vec<SentimentRecord>,
    pub summary: SentimentSummary,
}

/// Texts that will be sent to the classifier: non-null cells of the column,
/// as text, skipping blank and whitespace-only answers.
pub fn collect_texts(table: &ResponseTable, prompt: &str) -> Vec<String> {
    table
        .non_null(prompt)
        .into_iter()
        .map(|value| value.to_string())
        .filter(|text| !text.trim().is_empty())
        .collect()
}

/// Run the classifier over every usable answer to `prompt`.
///
/// Returns `NoData` without calling the classifier when no answers remain.
pub async fn analyze_sentiment(
    prompt: &str,
    table: &ResponseTable,
    classifier: &dyn SentimentClassifier,
    progress: Option<&ProgressBar>,
) -> ViewOutcome<SentimentAnalysis> {
    let texts = collect_texts(table, prompt);

    if texts.is_empty() {
        info!("No answers to '{}' to analyze", prompt);
        return ViewOutcome::NoData {
            prompt: prompt.to_string(),
        };
    }

    info!(
        "Classifying {} answers to '{}' with {}",
        texts.len(),
        prompt,
        classifier.model_name()
    );
    if let Some(pb) = progress {
        pb.set_length(texts.len() as u64);
    }

    let mut records = Vec::with_capacity(texts.len());
    for (index, text) in texts.into_iter().enumerate() {
        let record = match classify_one(classifier, &text).await {
            Ok((label, confidence)) => SentimentRecord {
                text,
                label: Some(label),
                confidence: Some(confidence),
                error: None,
            },
            Err(e) => {
                warn!("Classification failed for answer {}: {}", index + 1, e);
                SentimentRecord::failed(text, &e)
            }
        };
        records.push(record);

        if let Some(pb) = progress {
            pb.inc(1);
        }
    }

    let summary = SentimentSummary::from_records(&records);
    debug!(
        "Sentiment summary for '{}': {} classified, {} failed",
        prompt, summary.total, summary.failed
    );

    ViewOutcome::Ready(SentimentAnalysis {
        prompt: prompt.to_string(),
        records,
        summary,
    })
}

async fn classify_one(
    classifier: &dyn SentimentClassifier,
    text: &str,
) -> Result<(SentimentLabel, f64), ClassifierError> {
    let prediction = classifier.classify(text).await?;
    let label = SentimentLabel::from_model_label(&prediction.label)
        .ok_or_else(|| ClassifierError::UnknownLabel(prediction.label.clone()))?;
    Ok((label, round_to(prediction.score, 4)))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::table::tabulate;
    use crate::classifier::Prediction;
    use crate::models::Response;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Labels by keyword; errors on texts containing "boom".
    struct KeywordClassifier {
        calls: AtomicUsize,
    }

    impl KeywordClassifier {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SentimentClassifier for KeywordClassifier {
        async fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let lower = text.to_lowercase();
            if lower.contains("boom") {
                return Err(ClassifierError::EmptyPrediction);
            }
            let label = if lower.contains("great") || lower.contains("good") {
                "positive"
            } else if lower.contains("weird") {
                "sarcastic"
            } else {
                "NEGATIVE"
            };
            Ok(Prediction {
                label: label.to_string(),
                score: 0.987654,
            })
        }

        fn model_name(&self) -> &str {
            "keyword-stub"
        }
    }

    fn table_with(prompt: &str, answers: Vec<Value>) -> ResponseTable {
        let responses: Vec<Response> = answers
            .into_iter()
            .enumerate()
            .map(|(i, answer)| {
                let mut map = serde_json::Map::new();
                map.insert(prompt.to_string(), answer);
                Response {
                    id: i as i64,
                    admin_email: "admin@example.com".to_string(),
                    answers: map,
                }
            })
            .collect();
        tabulate(&[], &responses)
    }

    #[test]
    fn test_collect_texts_drops_null_and_blank() {
        let table = table_with(
            "Comments",
            vec![json!("Great ride"), json!(""), json!("   "), Value::Null, json!(42)],
        );

        let texts = collect_texts(&table, "Comments");
        assert_eq!(texts, vec!["Great ride".to_string(), "42".to_string()]);
    }

    #[tokio::test]
    async fn test_no_data_skips_classifier() {
        let table = table_with("Comments", vec![json!(""), json!("  \n")]);
        let classifier = KeywordClassifier::new();

        let outcome = analyze_sentiment("Comments", &table, &classifier, None).await;

        assert!(matches!(outcome, ViewOutcome::NoData { .. }));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_records_and_summary() {
        let table = table_with(
            "Comments",
            vec![
                json!("Great ride"),
                json!("Too crowded"),
                json!("Good driver"),
                json!("Late again"),
            ],
        );
        let classifier = KeywordClassifier::new();

        let outcome = analyze_sentiment("Comments", &table, &classifier, None).await;
        let analysis = outcome.ready().unwrap();

        assert_eq!(analysis.records.len(), 4);
        assert_eq!(analysis.records[0].text, "Great ride");
        assert_eq!(analysis.records[0].label, Some(SentimentLabel::Positive));
        assert_eq!(analysis.records[0].confidence, Some(0.9877));
        assert_eq!(analysis.records[1].label, Some(SentimentLabel::Negative));

        assert_eq!(analysis.summary.total, 4);
        assert_eq!(analysis.summary.count(SentimentLabel::Positive), 2);
        assert_eq!(analysis.summary.count(SentimentLabel::Negative), 2);
        assert_eq!(analysis.summary.positive_rate, Some(50.0));
    }

    #[tokio::test]
    async fn test_failures_are_isolated() {
        let table = table_with(
            "Comments",
            vec![json!("boom"), json!("Great"), json!("weird vibe")],
        );
        let classifier = KeywordClassifier::new();

        let outcome = analyze_sentiment("Comments", &table, &classifier, None).await;
        let analysis = outcome.ready().unwrap();

        assert_eq!(analysis.records.len(), 3);
        assert!(analysis.records[0].label.is_none());
        assert!(analysis.records[0].error.is_some());
        assert!(analysis.records[2]
            .error
            .as_deref()
            .unwrap()
            .contains("sarcastic"));
        assert_eq!(analysis.summary.total, 1);
        assert_eq!(analysis.summary.failed, 2);
        assert_eq!(analysis.summary.positive_rate, Some(100.0));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let table = table_with(
            "Comments",
            vec![json!("Great"), json!("Bad"), json!("Good enough")],
        );
        let classifier = KeywordClassifier::new();

        let first = analyze_sentiment("Comments", &table, &classifier, None).await;
        let second = analyze_sentiment("Comments", &table, &classifier, None).await;

        assert_eq!(first.ready(), second.ready());
    }

    #[test]
    fn test_positive_rate_absent_without_positive() {
        let records = vec![SentimentRecord {
            text: "meh".to_string(),
            label: Some(SentimentLabel::Neutral),
            confidence: Some(0.5),
            error: None,
        }];

        let summary = SentimentSummary::from_records(&records);
        assert_eq!(summary.positive_rate, None);
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn test_positive_rate_rounding() {
        let label = |l| SentimentRecord {
            text: String::new(),
            label: Some(l),
            confidence: Some(0.9),
            error: None,
        };
        let records = vec![
            label(SentimentLabel::Positive),
            label(SentimentLabel::Negative),
            label(SentimentLabel::Negative),
        ];

        let summary = SentimentSummary::from_records(&records);
        assert_eq!(summary.positive_rate, Some(33.3));
        assert_eq!(summary.counts[0].label, SentimentLabel::Negative);
    }

    #[test]
    fn test_classify_with_blocking_runtime() {
        let classifier = KeywordClassifier::new();
        let result = tokio_test::block_on(classify_one(&classifier, "good"));
        assert_eq!(result.unwrap(), (SentimentLabel::Positive, 0.9877));
    }
}
