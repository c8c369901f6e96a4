//! Sentiment classification capability.
//!
//! The aggregator only sees the [`SentimentClassifier`] trait; the HTTP
//! inference client is constructed once in `main` and passed by reference.

pub mod inference;

pub use inference::{InferenceClassifier, InferenceConfig};

use crate::error::ClassifierError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw model prediction for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

/// Text to label + confidence. Stateless between calls.
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classify a single text.
    async fn classify(&self, text: &str) -> Result<Prediction, ClassifierError>;

    /// Model identifier shown in reports.
    fn model_name(&self) -> &str;
}
