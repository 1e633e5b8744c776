use async_trait::async_trait;
use crate::domain::{
    error::ValidationError,
    models::{IngestionRecord, LatestExecutionQuery, QueryStatus, ResultPage},
};

#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn start_query(&self, query: &str, database: &str, output_location: &str) -> Result<String, ValidationError>;

    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus, ValidationError>;

    async fn query_results(&self, execution_id: &str, next_token: Option<String>) -> Result<ResultPage, ValidationError>;
}

#[async_trait]
pub trait IngestionLog: Send + Sync {
    async fn latest_execution(&self, query: &LatestExecutionQuery) -> Result<Option<IngestionRecord>, ValidationError>;
}
