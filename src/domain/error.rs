use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid table list: {0}")]
    TableList(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Query {execution_id} ended in state {state}: {reason}")]
    QueryFailed {
        execution_id: String,
        state: String,
        reason: String,
    },

    #[error("Query {execution_id} still {state} after {polls} status checks")]
    PollTimeout {
        execution_id: String,
        state: String,
        polls: u32,
    },

    #[error("Malformed result: {0}")]
    MalformedResult(String),

    #[error("Result count mismatch: {expected} tables but {actual} result rows")]
    ResultCountMismatch { expected: usize, actual: usize },

    #[error("Database error: {0}")]
    Database(String),
}
