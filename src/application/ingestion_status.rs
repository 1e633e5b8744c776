use std::sync::Arc;
use tracing::{info, debug, error, warn};
use crate::domain::{
    error::ValidationError,
    models::{IngestionRecord, LatestExecutionQuery},
    ports::IngestionLog,
};

/// Where and how ingestion runs are tracked.
#[derive(Debug, Clone)]
pub struct TrackingTable {
    pub table: String,
    pub hash_key: String,
    pub sort_key: String,
    pub newest_first: bool,
}

pub struct IngestionStatusService {
    log: Arc<dyn IngestionLog>,
    tracking: TrackingTable,
}

impl IngestionStatusService {
    pub fn new(log: Arc<dyn IngestionLog>, tracking: TrackingTable) -> Self {
        Self { log, tracking }
    }

    /// Looks up the latest run recorded at or before `now_millis` for every
    /// table. Any failed lookup aborts the whole batch.
    pub async fn latest_statuses(&self, prefix: &str, tables: &[String], now_millis: &str) -> Result<Vec<IngestionRecord>, ValidationError> {
        let ingestors = ingestor_names(prefix, tables);
        info!("Looking up {} ingestor(s) in {}", ingestors.len(), self.tracking.table);

        let mut records = Vec::with_capacity(ingestors.len());
        for ingestor_name in ingestors {
            let query = LatestExecutionQuery {
                table: self.tracking.table.clone(),
                hash_key: self.tracking.hash_key.clone(),
                sort_key: self.tracking.sort_key.clone(),
                ingestor_name,
                not_after: now_millis.to_string(),
                newest_first: self.tracking.newest_first,
            };

            let record = self.log.latest_execution(&query).await
                .map_err(|e| {
                    error!("Failed to look up ingestor {}: {}", query.ingestor_name, e);
                    e
                })?;

            match record {
                Some(record) => {
                    debug!("{}: status {} at {}", query.ingestor_name, record.status, record.execution_time);
                    records.push(record);
                }
                None => warn!("No execution recorded for ingestor {}", query.ingestor_name),
            }
        }

        info!("Found {} ingestion record(s)", records.len());
        Ok(records)
    }
}

pub fn ingestor_names(prefix: &str, tables: &[String]) -> Vec<String> {
    tables
        .iter()
        .map(|table| format!("{}_{}", prefix, table))
        .collect()
}

pub fn now_epoch_millis() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryLog {
        records: HashMap<String, IngestionRecord>,
        failing: Option<String>,
        seen: Mutex<Vec<LatestExecutionQuery>>,
    }

    #[async_trait]
    impl IngestionLog for InMemoryLog {
        async fn latest_execution(&self, query: &LatestExecutionQuery) -> Result<Option<IngestionRecord>, ValidationError> {
            self.seen.lock().unwrap().push(query.clone());
            if self.failing.as_deref() == Some(query.ingestor_name.as_str()) {
                return Err(ValidationError::Database("throttled".to_string()));
            }
            Ok(self.records.get(&query.ingestor_name).cloned())
        }
    }

    fn tracking() -> TrackingTable {
        TrackingTable {
            table: "ingestion_tracking".to_string(),
            hash_key: "ingestor_name".to_string(),
            sort_key: "execution_time".to_string(),
            newest_first: true,
        }
    }

    fn record(table: &str, status: &str) -> IngestionRecord {
        IngestionRecord {
            table_name: table.to_string(),
            status: status.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn ingestor_names_join_prefix_and_table() {
        let names = ingestor_names("pipe-", &["ingest_a".to_string(), "ingest_b".to_string()]);
        assert_eq!(names, vec!["pipe-_ingest_a", "pipe-_ingest_b"]);
    }

    #[test]
    fn now_is_epoch_millis() {
        let now: i64 = now_epoch_millis().parse().unwrap();
        assert!(now > 1_600_000_000_000);
    }

    #[tokio::test]
    async fn queries_each_ingestor_once_with_cutoff() {
        let log = Arc::new(InMemoryLog {
            records: HashMap::from([
                ("pipe-_ingest_a".to_string(), record("ingest_a", "SUCCESS")),
                ("pipe-_ingest_b".to_string(), record("ingest_b", "FAILED")),
            ]),
            ..Default::default()
        });
        let service = IngestionStatusService::new(log.clone(), tracking());

        let records = service
            .latest_statuses("pipe-", &["ingest_a".to_string(), "ingest_b".to_string()], "1700000000000")
            .await
            .unwrap();

        assert_eq!(records, vec![record("ingest_a", "SUCCESS"), record("ingest_b", "FAILED")]);
        let seen = log.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|q| q.not_after == "1700000000000" && q.newest_first));
    }

    #[tokio::test]
    async fn missing_ingestor_contributes_no_row() {
        let log = Arc::new(InMemoryLog::default());
        let service = IngestionStatusService::new(log, tracking());

        let records = service
            .latest_statuses("pipe-", &["ingest_a".to_string()], "1700000000000")
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn one_failed_lookup_aborts_the_batch() {
        let log = Arc::new(InMemoryLog {
            records: HashMap::from([("pipe-_ingest_a".to_string(), record("ingest_a", "SUCCESS"))]),
            failing: Some("pipe-_ingest_b".to_string()),
            ..Default::default()
        });
        let service = IngestionStatusService::new(log, tracking());

        let result = service
            .latest_statuses("pipe-", &["ingest_a".to_string(), "ingest_b".to_string()], "1700000000000")
            .await;
        assert!(matches!(result, Err(ValidationError::Database(_))));
    }
}
