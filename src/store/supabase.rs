//! PostgREST client for the Supabase-hosted survey tables.

use super::{ResponseStore, SchemaStore};
use crate::error::StoreError;
use crate::models::{Question, Response};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for the store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    pub api_key: String,
    pub questions_table: String,
    pub responses_table: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize)]
struct NewResponse<'a> {
    admin_email: &'a str,
    answers: &'a Map<String, Value>,
}

/// Store client speaking the PostgREST dialect.
pub struct SupabaseStore {
    config: StoreConfig,
    http_client: reqwest::Client,
}

impl SupabaseStore {
    /// Create a new store client.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        info!("Connecting to survey store at {}", config.url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.url.trim_end_matches('/'), table)
    }

    fn map_send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.config.timeout_seconds)
        } else if e.is_connect() {
            StoreError::Connect(self.config.url.clone())
        } else {
            StoreError::Http(e)
        }
    }

    /// `SELECT *` from `table` filtered to one administrator, ordered by id.
    async fn select_for_admin<T: DeserializeOwned>(
        &self,
        table: &str,
        admin: &str,
    ) -> Result<Vec<T>, StoreError> {
        let url = self.table_url(table);
        debug!("Fetching {} rows for {}", table, admin);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .query(&[
                ("select", "*".to_string()),
                ("admin_email", format!("eq.{}", admin)),
                ("order", "id.asc".to_string()),
            ])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let rows: Vec<T> = response.json().await.map_err(|source| StoreError::Decode {
            table: table.to_string(),
            source,
        })?;
        debug!("Fetched {} rows from {}", rows.len(), table);

        Ok(rows)
    }
}

#[async_trait]
impl SchemaStore for SupabaseStore {
    async fn get_questions(&self, admin: &str) -> Result<Vec<Question>, StoreError> {
        self.select_for_admin(&self.config.questions_table, admin).await
    }
}

#[async_trait]
impl ResponseStore for SupabaseStore {
    async fn get_responses(&self, admin: &str) -> Result<Vec<Response>, StoreError> {
        self.select_for_admin(&self.config.responses_table, admin).await
    }

    async fn insert_response(
        &self,
        admin: &str,
        answers: &Map<String, Value>,
    ) -> Result<(), StoreError> {
        let url = self.table_url(&self.config.responses_table);
        info!("Submitting response to {}", admin);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
            .header("Prefer", "return=minimal")
            .json(&NewResponse {
                admin_email: admin,
                answers,
            })
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionType;
    use mockito::Matcher;
    use serde_json::json;

    fn store_for(url: String) -> SupabaseStore {
        SupabaseStore::new(StoreConfig {
            url,
            api_key: "anon-key".to_string(),
            questions_table: "form_questions".to_string(),
            responses_table: "form_responses".to_string(),
            timeout_seconds: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_questions_scoped_to_admin() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/form_questions")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("admin_email".into(), "eq.ana@example.com".into()),
                Matcher::UrlEncoded("order".into(), "id.asc".into()),
            ]))
            .match_header("apikey", "anon-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"id": 1, "admin_email": "ana@example.com", "prompt": "Comfort",
                     "q_type": "Rating (1-5)", "options": null, "is_demographic": false},
                    {"id": 2, "admin_email": "ana@example.com", "prompt": "Age Group",
                     "q_type": "Multiple Choice", "options": ["18-25", "26-40"],
                     "is_demographic": true}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let store = store_for(server.url());
        let questions = store.get_questions("ana@example.com").await.unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].q_type, QuestionType::Rating1to5);
        assert!(questions[1].is_demographic);
        assert_eq!(questions[1].options, vec!["18-25", "26-40"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_responses_decodes_answers() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/form_responses")
            .match_query(Matcher::UrlEncoded(
                "admin_email".into(),
                "eq.ana@example.com".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {"id": 10, "admin_email": "ana@example.com",
                     "answers": {"Comfort": 5, "Comments": "Great ride"}},
                    {"id": 11, "admin_email": "ana@example.com", "answers": null}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let store = store_for(server.url());
        let responses = store.get_responses("ana@example.com").await.unwrap();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].answers["Comfort"], json!(5));
        assert!(responses[1].answers.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/form_questions")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let store = store_for(server.url());
        let err = store.get_questions("ana@example.com").await.unwrap_err();

        assert!(matches!(err, StoreError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn test_insert_response_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/form_responses")
            .match_header("prefer", "return=minimal")
            .match_body(Matcher::Json(json!({
                "admin_email": "ana@example.com",
                "answers": {"Comfort": 4}
            })))
            .with_status(201)
            .create_async()
            .await;

        let store = store_for(server.url());
        let mut answers = Map::new();
        answers.insert("Comfort".to_string(), json!(4));

        store
            .insert_response("ana@example.com", &answers)
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
