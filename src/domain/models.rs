use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Dev,
    Qa,
    Prd,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Qa => "qa",
            Environment::Prd => "prd",
        }
    }
}

/// Backend a validation run is executed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Athena,
    Ddb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCount {
    pub table: String,
    pub count: u64,
}

/// Latest entry of the ingestion-tracking table for one ingestor.
///
/// Attributes absent from the stored item fall back to their zero value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionRecord {
    pub ingestor_name: String,
    pub execution_time: String,
    #[serde(rename = "last_execution_as_date")]
    pub last_execution_date: String,
    pub data_load: String,
    pub src_sys: String,
    pub status: String,
    pub status_message: String,
    pub table_name: String,
    pub total_rows: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    Unknown(String),
}

impl QueryState {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Queued | QueryState::Running)
    }
}

impl From<&str> for QueryState {
    fn from(state: &str) -> Self {
        match state {
            "QUEUED" => QueryState::Queued,
            "RUNNING" => QueryState::Running,
            "SUCCEEDED" => QueryState::Succeeded,
            "FAILED" => QueryState::Failed,
            "CANCELLED" => QueryState::Cancelled,
            other => QueryState::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryState::Queued => f.write_str("QUEUED"),
            QueryState::Running => f.write_str("RUNNING"),
            QueryState::Succeeded => f.write_str("SUCCEEDED"),
            QueryState::Failed => f.write_str("FAILED"),
            QueryState::Cancelled => f.write_str("CANCELLED"),
            QueryState::Unknown(other) => f.write_str(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryStatus {
    pub state: QueryState,
    pub reason: Option<String>,
}

/// One page of query results as returned by the engine, header row included
/// on the first page. `None` cells are SQL nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub rows: Vec<Vec<Option<String>>>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestExecutionQuery {
    pub table: String,
    pub hash_key: String,
    pub sort_key: String,
    pub ingestor_name: String,
    pub not_after: String,
    pub newest_first: bool,
}
