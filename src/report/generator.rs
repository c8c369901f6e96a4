//! Markdown and JSON report generation.
//!
//! Charts are rendered as text bars so the Markdown stays readable in a
//! terminal as well as in a viewer.

use crate::analysis::demographic::DemographicQuestion;
use crate::analysis::quantitative::ValueCount;
use crate::analysis::{
    DemographicBreakdown, DemographicChart, Distribution, QuestionPartition, SentimentAnalysis,
};
use crate::config::ReportConfig;
use crate::dashboard::Report;
use crate::models::{QuestionKind, ReportMetadata, StoreStatus, ViewOutcome};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# Survey Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_questions_section(&report.questions));

    if !report.has_responses() {
        output.push_str(&no_responses_notice(&report.metadata.store_status));
        output.push_str(&generate_footer());
        return output;
    }

    if let Some(ref sentiment) = report.sentiment {
        output.push_str(&generate_sentiment_section(sentiment, options));
    }

    if !report.quantitative.is_empty() {
        output.push_str("## Quantitative Results\n\n");
        for outcome in &report.quantitative {
            output.push_str(&generate_distribution_block(outcome, options));
        }
    }

    if let Some(ref demographics) = report.demographics {
        output.push_str(&generate_demographics_section(demographics, options));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Administrator:** {}\n", metadata.admin));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Questions:** {}\n", metadata.question_count));
    section.push_str(&format!("- **Responses:** {}\n", metadata.response_count));
    if let Some(ref model) = metadata.classifier_model {
        section.push_str(&format!("- **Sentiment Model:** `{}`\n", model));
    }
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    if let StoreStatus::Unavailable { ref reason } = metadata.store_status {
        section.push_str(&format!(
            "\n> ⚠️ **Store unavailable:** {}. Results below may be incomplete.\n",
            reason
        ));
    }
    section.push('\n');

    section
}

/// List the schema grouped by kind.
fn generate_questions_section(partition: &QuestionPartition) -> String {
    let mut section = String::new();

    section.push_str("## Questions\n\n");
    for (title, kind) in [
        ("Free-text", QuestionKind::FreeText),
        ("Quantitative", QuestionKind::Quantitative),
        ("Demographic", QuestionKind::Demographic),
    ] {
        let prompts = partition.prompts(kind);
        if prompts.is_empty() {
            section.push_str(&format!("- **{}:** _none_\n", title));
        } else {
            section.push_str(&format!("- **{}:** {}\n", title, prompts.join(", ")));
        }
    }
    section.push('\n');

    section
}

fn no_responses_notice(status: &StoreStatus) -> String {
    match status {
        StoreStatus::Available => "No feedback has been submitted yet.\n\n".to_string(),
        StoreStatus::Unavailable { .. } => {
            "No responses could be loaded because the store was unavailable.\n\n".to_string()
        }
    }
}

fn empty_state(outcome_kind: &str, prompt: Option<&str>, kind: Option<QuestionKind>) -> String {
    match (prompt, kind) {
        (Some(prompt), _) => format!("_No answers submitted for \"{}\" yet._\n\n", prompt),
        (None, Some(QuestionKind::FreeText)) => {
            "_No text-based questions available._\n\n".to_string()
        }
        (None, Some(QuestionKind::Quantitative)) => {
            "_No multiple choice or rating questions available._\n\n".to_string()
        }
        (None, Some(QuestionKind::Demographic)) => {
            "_No demographic questions have been created yet._\n\n".to_string()
        }
        (None, None) => format!("_No {} data._\n\n", outcome_kind),
    }
}

/// Generate the sentiment analysis section.
fn generate_sentiment_section(
    outcome: &ViewOutcome<SentimentAnalysis>,
    options: &ReportConfig,
) -> String {
    let mut section = String::new();

    section.push_str("## Sentiment Analysis\n\n");

    let analysis = match outcome {
        ViewOutcome::Ready(analysis) => analysis,
        ViewOutcome::NoData { prompt } => {
            section.push_str(&empty_state("sentiment", Some(prompt.as_str()), None));
            return section;
        }
        ViewOutcome::NoQuestionsOfType(kind) => {
            section.push_str(&empty_state("sentiment", None, Some(*kind)));
            return section;
        }
    };
    let summary = &analysis.summary;

    section.push_str(&format!("**Question:** {}\n\n", analysis.prompt));

    section.push_str("### Sentiment Distribution\n\n");
    section.push_str("| Sentiment | Count | |\n");
    section.push_str("|:---|:---:|:---|\n");
    let max = summary.counts.iter().map(|c| c.count).max().unwrap_or(0);
    for count in &summary.counts {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            count.label,
            count.count,
            bar(count.count, max, options.bar_width)
        ));
    }
    section.push('\n');

    section.push_str("### Metrics\n\n");
    section.push_str(&format!("- **Total Analyzed:** {}\n", summary.total));
    if let Some(rate) = summary.positive_rate {
        section.push_str(&format!("- **Positive Rate:** {:.1}%\n", rate));
    }
    if summary.failed > 0 {
        section.push_str(&format!(
            "- **Classification Failed:** {}\n",
            summary.failed
        ));
    }
    section.push('\n');

    if options.include_raw_results {
        section.push_str("### Raw Results\n\n");
        section.push_str("| Feedback | Sentiment | Confidence |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for record in &analysis.records {
            let (label, confidence) = match (record.label, record.confidence) {
                (Some(label), Some(confidence)) => {
                    (label.to_string(), format!("{:.4}", confidence))
                }
                _ => (
                    "FAILED".to_string(),
                    cell(record.error.as_deref().unwrap_or("")),
                ),
            };
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                cell(&record.text),
                label,
                confidence
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate one quantitative distribution block.
fn generate_distribution_block(
    outcome: &ViewOutcome<Distribution>,
    options: &ReportConfig,
) -> String {
    let mut block = String::new();

    let distribution = match outcome {
        ViewOutcome::Ready(distribution) => distribution,
        ViewOutcome::NoData { prompt } => {
            block.push_str(&format!("### {}\n\n", prompt));
            block.push_str(&empty_state("quantitative", Some(prompt.as_str()), None));
            return block;
        }
        ViewOutcome::NoQuestionsOfType(kind) => {
            block.push_str(&empty_state("quantitative", None, Some(*kind)));
            return block;
        }
    };

    block.push_str(&format!("### {}\n\n", distribution.prompt));
    block.push_str(&value_table(&distribution.entries, "Votes", options.bar_width));
    block.push_str(&format!("*Total answers: {}*\n\n", distribution.total()));

    block
}

/// Generate the demographics section.
fn generate_demographics_section(
    outcome: &ViewOutcome<DemographicBreakdown>,
    options: &ReportConfig,
) -> String {
    let mut section = String::new();

    section.push_str("## Demographics\n\n");

    let breakdown = match outcome {
        ViewOutcome::Ready(breakdown) => breakdown,
        ViewOutcome::NoData { prompt } => {
            section.push_str(&empty_state("demographic", Some(prompt.as_str()), None));
            return section;
        }
        ViewOutcome::NoQuestionsOfType(kind) => {
            section.push_str(&empty_state("demographic", None, Some(*kind)));
            return section;
        }
    };

    section.push_str("### Respondent Profile\n\n");
    if breakdown.table.is_empty() {
        section.push_str("_No respondent has answered a demographic question yet._\n\n");
    } else {
        let columns = breakdown.table.columns();
        section.push_str(&format!(
            "| {} |\n",
            columns.iter().map(|c| cell(c)).collect::<Vec<_>>().join(" | ")
        ));
        section.push_str(&format!("|{}\n", ":---|".repeat(columns.len())));
        for row in breakdown.table.rows() {
            let cells: Vec<String> = columns
                .iter()
                .map(|c| row.get(c).map(|v| cell(&v.to_string())).unwrap_or_default())
                .collect();
            section.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        section.push('\n');
    }

    section.push_str("### Demographic Breakdown\n\n");
    for question in &breakdown.questions {
        section.push_str(&generate_demographic_block(question, options));
    }

    section
}

fn generate_demographic_block(question: &DemographicQuestion, options: &ReportConfig) -> String {
    let mut block = String::new();

    block.push_str(&format!("#### {}\n\n", question.prompt));
    match &question.chart {
        DemographicChart::Chart { entries } if entries.is_empty() => {
            block.push_str("_No answers yet._\n\n");
        }
        DemographicChart::Chart { entries } => {
            block.push_str(&value_table(entries, "Count", options.bar_width));
        }
        DemographicChart::Suppressed { distinct } => {
            block.push_str(&format!(
                "*(Too many unique entries to graph: {} distinct values)*\n\n",
                distinct
            ));
        }
    }

    block
}

fn value_table(entries: &[ValueCount], count_header: &str, bar_width: usize) -> String {
    let mut table = String::new();
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);

    table.push_str(&format!("| Answer | {} | |\n", count_header));
    table.push_str("|:---|:---:|:---|\n");
    for entry in entries {
        table.push_str(&format!(
            "| {} | {} | {} |\n",
            cell(&entry.value.to_string()),
            entry.count,
            bar(entry.count, max, bar_width)
        ));
    }
    table.push('\n');

    table
}

/// Text bar scaled so `max` fills `width`; any non-zero count shows.
fn bar(count: usize, max: usize, width: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let len = ((count * width) + max - 1) / max;
    "█".repeat(len.max(1))
}

/// Escape a value for a Markdown table cell.
fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by SurveyScope*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
