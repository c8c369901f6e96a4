//! Survey store access.
//!
//! Question definitions and responses live in a remote store reached over
//! its REST query API. Every call is scoped to one administrator.

pub mod snapshot;
pub mod supabase;

pub use snapshot::SurveySnapshot;
pub use supabase::{StoreConfig, SupabaseStore};

use crate::error::StoreError;
use crate::models::{Question, Response};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Fetches question definitions.
#[async_trait]
pub trait SchemaStore: Send + Sync {
    /// Questions owned by `admin`, in creation order.
    async fn get_questions(&self, admin: &str) -> Result<Vec<Question>, StoreError>;
}

/// Fetches and inserts responses.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Responses submitted to `admin`'s survey.
    async fn get_responses(&self, admin: &str) -> Result<Vec<Response>, StoreError>;

    /// Store one anonymous submission against `admin`'s survey.
    async fn insert_response(
        &self,
        admin: &str,
        answers: &Map<String, Value>,
    ) -> Result<(), StoreError>;
}
