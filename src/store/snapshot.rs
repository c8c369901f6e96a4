//! One administrator's survey data, fetched once per invocation.

use super::{ResponseStore, SchemaStore};
use crate::models::{Question, Response, StoreStatus};
use tracing::{info, warn};

/// Immutable view of the store the analyses read from.
///
/// A failed fetch leaves the affected sequence empty and records the
/// failure in `status`, so an outage is reported distinctly from an empty
/// survey.
#[derive(Debug, Clone)]
pub struct SurveySnapshot {
    pub admin: String,
    pub questions: Vec<Question>,
    pub responses: Vec<Response>,
    pub status: StoreStatus,
}

impl SurveySnapshot {
    /// Fetch questions and responses for `admin`. Never fails.
    pub async fn fetch(
        admin: &str,
        schema_store: &dyn SchemaStore,
        response_store: &dyn ResponseStore,
    ) -> Self {
        let mut failures = Vec::new();

        let questions = match schema_store.get_questions(admin).await {
            Ok(questions) => questions,
            Err(e) => {
                warn!("Failed to fetch questions for {}: {}", admin, e);
                failures.push(format!("questions: {}", e));
                Vec::new()
            }
        };

        let responses = match response_store.get_responses(admin).await {
            Ok(responses) => responses,
            Err(e) => {
                warn!("Failed to fetch responses for {}: {}", admin, e);
                failures.push(format!("responses: {}", e));
                Vec::new()
            }
        };

        let status = if failures.is_empty() {
            StoreStatus::Available
        } else {
            StoreStatus::Unavailable {
                reason: failures.join("; "),
            }
        };

        info!(
            "Loaded {} questions and {} responses for {}",
            questions.len(),
            responses.len(),
            admin
        );

        Self {
            admin: admin.to_string(),
            questions,
            responses,
            status,
        }
    }

    /// No responses have been submitted (or none could be fetched).
    pub fn has_responses(&self) -> bool {
        !self.responses.is_empty()
    }
}
