//! HTTP sentiment classifier.
//!
//! Talks to a Hugging Face style text-classification endpoint:
//! `POST {url}/models/{model}` with `{"inputs": text}`. The endpoint answers
//! with either a flat list of `{label, score}` or a list of such lists (one
//! per input); the highest-scoring prediction wins.

use super::{Prediction, SentimentClassifier};
use crate::error::ClassifierError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the inference client.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub url: String,
    pub model: String,
    /// Bearer token, if the endpoint needs one.
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            url: "https://api-inference.huggingface.co".to_string(),
            model: "distilbert/distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            api_key: None,
            timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<Prediction>>),
    Flat(Vec<Prediction>),
}

impl InferenceResponse {
    fn best(self) -> Option<Prediction> {
        let predictions = match self {
            InferenceResponse::Nested(batches) => batches.into_iter().next()?,
            InferenceResponse::Flat(predictions) => predictions,
        };

        predictions
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
    }
}

/// Sentiment classifier backed by a remote inference endpoint.
pub struct InferenceClassifier {
    config: InferenceConfig,
    http_client: reqwest::Client,
}

impl InferenceClassifier {
    /// Build the client. Done once per process.
    pub fn new(config: InferenceConfig) -> Result<Self, ClassifierError> {
        info!(
            "Initializing sentiment classifier {} at {}",
            config.model, config.url
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}",
            self.config.url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl SentimentClassifier for InferenceClassifier {
    async fn classify(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let url = self.endpoint();
        debug!("Classifying {} chars via {}", text.len(), url);

        let mut request = self
            .http_client
            .post(&url)
            .json(&InferenceRequest { inputs: text });
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout(self.config.timeout_seconds)
            } else if e.is_connect() {
                ClassifierError::Connect(self.config.url.clone())
            } else {
                ClassifierError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status { status, body });
        }

        let body = response.text().await?;
        let parsed: InferenceResponse =
            serde_json::from_str(&body).map_err(|e| ClassifierError::Decode(e.to_string()))?;

        parsed.best().ok_or(ClassifierError::EmptyPrediction)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
