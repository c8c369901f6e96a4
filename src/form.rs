//! Public survey form: answer validation, submission and share links.
//!
//! Respondents are anonymous; a submission is tagged with the administrator
//! the link points at, never with an authenticated identity.

use crate::error::SubmissionError;
use crate::models::{parse_rating, Question, QuestionType};
use crate::store::{ResponseStore, SchemaStore};
use anyhow::{Context, Result};
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Value a rating slider starts at.
pub const DEFAULT_RATING: u8 = 3;

/// Build the anonymous survey link for an administrator.
pub fn share_link(base_url: &str, admin: &str) -> Result<String> {
    let url = Url::parse_with_params(base_url, &[("admin", admin)])
        .with_context(|| format!("Invalid form base URL: {}", base_url))?;
    Ok(url.to_string())
}

/// Check a raw submission against the survey schema and fill in the values
/// an untouched form widget would submit.
///
/// The result has exactly one entry per question, keyed by prompt.
pub fn validate_submission(
    questions: &[Question],
    raw: &Value,
) -> Result<Map<String, Value>, SubmissionError> {
    if questions.is_empty() {
        return Err(SubmissionError::SurveyClosed);
    }

    let given = raw.as_object().ok_or(SubmissionError::NotAnObject)?;

    if let Some(unknown) = given
        .keys()
        .find(|key| !questions.iter().any(|q| &q.prompt == *key))
    {
        return Err(SubmissionError::UnknownQuestion(unknown.clone()));
    }

    let mut answers = Map::new();
    for question in questions {
        let value = validate_answer(question, given.get(&question.prompt))?;
        answers.insert(question.prompt.clone(), value);
    }

    Ok(answers)
}

fn validate_answer(question: &Question, raw: Option<&Value>) -> Result<Value, SubmissionError> {
    let prompt = || question.prompt.clone();

    match question.q_type {
        QuestionType::ShortAnswer | QuestionType::Paragraph => match raw {
            None | Some(Value::Null) => Ok(Value::String(String::new())),
            Some(Value::String(s)) => Ok(Value::String(s.clone())),
            Some(_) => Err(SubmissionError::InvalidAnswer {
                prompt: prompt(),
                expected: "text",
            }),
        },
        QuestionType::MultipleChoice => {
            let options = question.effective_options();
            match raw {
                None | Some(Value::Null) => Ok(Value::String(options[0].clone())),
                Some(Value::String(s)) if options.contains(s) => Ok(Value::String(s.clone())),
                Some(Value::String(s)) => Err(SubmissionError::UnknownOption {
                    prompt: prompt(),
                    value: s.clone(),
                }),
                Some(_) => Err(SubmissionError::InvalidAnswer {
                    prompt: prompt(),
                    expected: "one of the listed options",
                }),
            }
        }
        QuestionType::Rating1to5 => match raw {
            None | Some(Value::Null) => Ok(Value::from(DEFAULT_RATING)),
            Some(value) => parse_rating(value)
                .map(Value::from)
                .ok_or(SubmissionError::InvalidAnswer {
                    prompt: prompt(),
                    expected: "an integer from 1 to 5",
                }),
        },
    }
}

/// Validate and store one anonymous submission for `admin`'s survey.
///
/// Returns the answers as stored.
pub async fn submit_response(
    admin: Option<&str>,
    raw: &Value,
    schema_store: &dyn SchemaStore,
    response_store: &dyn ResponseStore,
) -> Result<Map<String, Value>> {
    let admin = admin
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or(SubmissionError::MissingAdmin)?;

    // An outage must not read as a closed survey
    let questions = schema_store.get_questions(admin).await.map_err(|e| {
        warn!("Failed to fetch form for {}: {}", admin, e);
        SubmissionError::StoreUnavailable(e.to_string())
    })?;

    let answers = validate_submission(&questions, raw)?;

    response_store
        .insert_response(admin, &answers)
        .await
        .map_err(|e| {
            warn!("Failed to store response for {}: {}", admin, e);
            SubmissionError::StoreUnavailable(e.to_string())
        })?;

    info!("Stored response with {} answers for {}", answers.len(), admin);
    Ok(answers)
}

/// Whether a submission failed because the store could not be reached.
pub fn is_store_outage(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<SubmissionError>(),
        Some(SubmissionError::StoreUnavailable(_))
    )
}
