//! Report assembly.
//!
//! Takes one administrator's snapshot, tabulates it, partitions the schema
//! and runs the requested views. Sentiment runs only for the one selected
//! free-text question.

use crate::analysis::{
    analyze_sentiment, demographic_breakdown, partition_questions, quantitative_distribution,
    tabulate, DemographicBreakdown, Distribution, QuestionPartition, SentimentAnalysis,
};
use crate::classifier::SentimentClassifier;
use crate::cli::View;
use crate::models::{QuestionKind, ReportMetadata, ViewOutcome};
use crate::store::SurveySnapshot;
use anyhow::{bail, Result};
use chrono::Utc;
use indicatif::ProgressBar;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// What to compute for this invocation.
#[derive(Debug, Clone)]
pub struct DashboardRequest {
    pub view: View,
    /// Selected prompt for the sentiment and quantitative views.
    pub question: Option<String>,
    pub chart_max_distinct: usize,
}

/// The complete survey report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    /// Schema split by analytical kind.
    pub questions: QuestionPartition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<ViewOutcome<SentimentAnalysis>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quantitative: Vec<ViewOutcome<Distribution>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographics: Option<ViewOutcome<DemographicBreakdown>>,
}

impl Report {
    /// Whether any response existed to analyze.
    pub fn has_responses(&self) -> bool {
        self.metadata.response_count > 0
    }
}

/// Does the view need the sentiment classifier?
pub fn needs_classifier(view: View) -> bool {
    view == View::Sentiment
}

/// Pick the prompt to analyze: the requested one if it belongs to `kind`,
/// otherwise the first of that kind.
fn select_question(
    partition: &QuestionPartition,
    kind: QuestionKind,
    requested: Option<&str>,
) -> Result<Option<String>> {
    let prompts = partition.prompts(kind);

    match requested {
        Some(prompt) if prompts.iter().any(|p| p == prompt) => Ok(Some(prompt.to_string())),
        Some(prompt) => match partition.kind_of(prompt) {
            Some(other) => bail!("'{}' is a {} question, not {}", prompt, other, kind),
            None => bail!("No question with prompt '{}' in this survey", prompt),
        },
        None => Ok(prompts.first().cloned()),
    }
}

/// Build the report for `request` from an already fetched snapshot.
pub async fn build_report(
    snapshot: &SurveySnapshot,
    request: &DashboardRequest,
    classifier: Option<&dyn SentimentClassifier>,
    progress: Option<&ProgressBar>,
) -> Result<Report> {
    let start_time = Instant::now();
    let questions = partition_questions(&snapshot.questions);

    let mut report = Report {
        metadata: ReportMetadata {
            admin: snapshot.admin.clone(),
            generated_at: Utc::now(),
            store_status: snapshot.status.clone(),
            question_count: snapshot.questions.len(),
            response_count: snapshot.responses.len(),
            classifier_model: None,
            duration_seconds: 0.0,
        },
        questions,
        sentiment: None,
        quantitative: Vec::new(),
        demographics: None,
    };

    if !snapshot.status.is_available() {
        warn!("Store unavailable for {}, views reflect missing data", snapshot.admin);
    }

    if !snapshot.has_responses() {
        info!("No responses for {}, skipping analysis", snapshot.admin);
        return Ok(report);
    }

    let table = tabulate(&snapshot.questions, &snapshot.responses);
    debug!(
        "Table has columns {:?}, {} cells rejected",
        table.columns(),
        table.rejected()
    );

    match request.view {
        View::Sentiment => {
            let selected = select_question(
                &report.questions,
                QuestionKind::FreeText,
                request.question.as_deref(),
            )?;
            report.sentiment = Some(match (selected, classifier) {
                (None, _) => ViewOutcome::NoQuestionsOfType(QuestionKind::FreeText),
                (Some(prompt), Some(classifier)) => {
                    report.metadata.classifier_model = Some(classifier.model_name().to_string());
                    analyze_sentiment(&prompt, &table, classifier, progress).await
                }
                (Some(_), None) => bail!("Sentiment view requires a classifier"),
            });
        }
        View::Quantitative => {
            let selected = select_question(
                &report.questions,
                QuestionKind::Quantitative,
                request.question.as_deref(),
            )?;
            report.quantitative.push(match selected {
                Some(prompt) => quantitative_distribution(&prompt, &table),
                None => ViewOutcome::NoQuestionsOfType(QuestionKind::Quantitative),
            });
        }
        View::Demographics => {
            report.demographics = Some(demographic_breakdown(
                &report.questions.demographic,
                &table,
                request.chart_max_distinct,
            ));
        }
        View::Overview => {
            if report.questions.quantitative.is_empty() {
                report
                    .quantitative
                    .push(ViewOutcome::NoQuestionsOfType(QuestionKind::Quantitative));
            }
            for prompt in &report.questions.quantitative {
                report
                    .quantitative
                    .push(quantitative_distribution(prompt, &table));
            }
            report.demographics = Some(demographic_breakdown(
                &report.questions.demographic,
                &table,
                request.chart_max_distinct,
            ));
        }
    }

    report.metadata.duration_seconds = start_time.elapsed().as_secs_f64();
    Ok(report)
}
