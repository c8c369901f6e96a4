//! Error types for the store, classifier and form boundaries.

use thiserror::Error;

/// Failure talking to the survey store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store API key not set: export {0}")]
    MissingApiKey(String),

    #[error("Cannot connect to store at {0}")]
    Connect(String),

    #[error("Store request timed out after {0}s")]
    Timeout(u64),

    #[error("Store API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode {table} rows: {source}")]
    Decode {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Store request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure classifying a single text.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Cannot connect to inference endpoint at {0}")]
    Connect(String),

    #[error("Inference request timed out after {0}s")]
    Timeout(u64),

    #[error("Inference API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse inference response: {0}")]
    Decode(String),

    #[error("Model returned no prediction")]
    EmptyPrediction,

    #[error("Unknown sentiment label: {0}")]
    UnknownLabel(String),

    #[error("Inference request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A public form submission that does not fit the survey schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("This survey is currently closed or has no questions")]
    SurveyClosed,

    #[error("Invalid survey link: no administrator given")]
    MissingAdmin,

    #[error("Answers must be a JSON object keyed by question prompt")]
    NotAnObject,

    #[error("Unknown question: {0}")]
    UnknownQuestion(String),

    #[error("Answer to '{prompt}' must be {expected}")]
    InvalidAnswer {
        prompt: String,
        expected: &'static str,
    },

    #[error("'{value}' is not an option of '{prompt}'")]
    UnknownOption { prompt: String, value: String },

    #[error("Survey store unavailable: {0}")]
    StoreUnavailable(String),
}
