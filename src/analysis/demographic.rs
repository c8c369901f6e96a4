//! Demographic breakdowns.
//!
//! Each demographic question gets its own distribution; questions with too
//! many distinct answers are flagged instead of charted.

use crate::analysis::quantitative::{value_counts, ValueCount};
use crate::analysis::table::ResponseTable;
use crate::models::{QuestionKind, ViewOutcome};
use serde::Serialize;
use std::cmp::Reverse;
use tracing::debug;

/// Distinct-value count at which a chart is no longer readable.
pub const CHART_MAX_DISTINCT: usize = 20;

/// Display policy for one demographic question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DemographicChart {
    /// Distribution ordered by count, most frequent first.
    Chart { entries: Vec<ValueCount> },
    /// Too many distinct values to visualize.
    Suppressed { distinct: usize },
}

impl DemographicChart {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, DemographicChart::Suppressed { .. })
    }
}

/// Breakdown for a single demographic prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemographicQuestion {
    pub prompt: String,
    pub chart: DemographicChart,
}

/// Demographic sub-table plus per-question breakdowns.
#[derive(Debug, Clone, Serialize)]
pub struct DemographicBreakdown {
    /// Responses restricted to demographic columns, all-null rows dropped.
    pub table: ResponseTable,
    pub questions: Vec<DemographicQuestion>,
}

/// Break down every demographic question independently.
///
/// A question is charted when it has fewer than `max_distinct` distinct
/// values.
pub fn demographic_breakdown(
    prompts: &[String],
    table: &ResponseTable,
    max_distinct: usize,
) -> ViewOutcome<DemographicBreakdown> {
    if prompts.is_empty() {
        return ViewOutcome::NoQuestionsOfType(QuestionKind::Demographic);
    }

    let sub_table = table.select_non_empty(prompts);
    debug!(
        "Demographic sub-table: {} of {} rows have at least one answer",
        sub_table.len(),
        table.len()
    );

    let questions = prompts
        .iter()
        .map(|prompt| DemographicQuestion {
            prompt: prompt.clone(),
            chart: chart_for(&sub_table, prompt, max_distinct),
        })
        .collect();

    ViewOutcome::Ready(DemographicBreakdown {
        table: sub_table,
        questions,
    })
}

fn chart_for(table: &ResponseTable, prompt: &str, max_distinct: usize) -> DemographicChart {
    let counts = value_counts(table.non_null(prompt));

    if counts.len() >= max_distinct {
        debug!(
            "'{}' has {} distinct values, suppressing chart",
            prompt,
            counts.len()
        );
        return DemographicChart::Suppressed {
            distinct: counts.len(),
        };
    }

    // Ascending value order from the map is the tie-break under a stable sort.
    let mut entries: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount { value, count })
        .collect();
    entries.sort_by_key(|e| Reverse(e.count));

    DemographicChart::Chart { entries }
}
