use async_trait::async_trait;
use aws_sdk_dynamodb::{types::AttributeValue, Client};
use std::collections::HashMap;
use tracing::{debug, error};
use crate::domain::{
    error::ValidationError,
    models::{IngestionRecord, LatestExecutionQuery},
    ports::IngestionLog,
};

const KEY_CONDITION: &str = "#hk = :hk AND #sk <= :sk";

pub struct DynamoIngestionRepository {
    client: Client,
}

impl DynamoIngestionRepository {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IngestionLog for DynamoIngestionRepository {
    async fn latest_execution(&self, query: &LatestExecutionQuery) -> Result<Option<IngestionRecord>, ValidationError> {
        debug!(
            "Querying {} for {} = '{}' and {} <= {}",
            query.table, query.hash_key, query.ingestor_name, query.sort_key, query.not_after
        );

        let response = self.client
            .query()
            .table_name(&query.table)
            .key_condition_expression(KEY_CONDITION)
            .expression_attribute_names("#hk", &query.hash_key)
            .expression_attribute_names("#sk", &query.sort_key)
            .expression_attribute_values(":hk", AttributeValue::S(query.ingestor_name.clone()))
            .expression_attribute_values(":sk", AttributeValue::S(query.not_after.clone()))
            .scan_index_forward(!query.newest_first)
            .limit(1)
            .send()
            .await
            .map_err(|e| {
                error!("Query for ingestor {} failed: {}", query.ingestor_name, e);
                ValidationError::Database(e.to_string())
            })?;

        response
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(record_from_item)
            .transpose()
    }
}

pub fn record_from_item(item: HashMap<String, AttributeValue>) -> Result<IngestionRecord, ValidationError> {
    serde_dynamo::from_item(item)
        .map_err(|e| ValidationError::MalformedResult(format!("ingestion record: {}", e)))
}
