use std::sync::Arc;
use std::time::Duration;
use tracing::{info, debug, error, warn};
use crate::domain::{
    error::ValidationError,
    models::{QueryState, RowCount},
    ports::QueryEngine,
};

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    /// Upper bound on status checks; `None` polls until a terminal state.
    pub max_polls: Option<u32>,
}

pub struct AthenaValidationService {
    engine: Arc<dyn QueryEngine>,
    poll: PollSettings,
}

impl AthenaValidationService {
    pub fn new(engine: Arc<dyn QueryEngine>, poll: PollSettings) -> Self {
        Self { engine, poll }
    }

    pub async fn count_rows(&self, tables: &[String], database: &str, output_location: &str) -> Result<Vec<RowCount>, ValidationError> {
        info!("Counting rows of {} table(s) in {}", tables.len(), database);

        // Step 1: Build the union-all row count statement
        let query = row_count_query(tables)?;
        debug!("Step 1: Built row count query: {}", query);

        // Step 2: Submit it
        debug!("Step 2: Submitting query, results go to {}", output_location);
        let execution_id = self.engine.start_query(&query, database, output_location).await
            .map_err(|e| {
                error!("Failed to submit row count query: {}", e);
                e
            })?;

        // Step 3: Wait for a terminal state
        debug!("Step 3: Polling query {} every {:?}", execution_id, self.poll.interval);
        self.wait_for_completion(&execution_id).await?;

        // Step 4: Fetch and flatten every result page
        debug!("Step 4: Fetching results of {}", execution_id);
        let rows = self.fetch_rows(&execution_id).await?;
        info!("Fetched {} result row(s) for query {}", rows.len(), execution_id);

        // Step 5: Pair results with the requested tables
        assemble_row_counts(tables, rows)
    }

    pub async fn wait_for_completion(&self, execution_id: &str) -> Result<(), ValidationError> {
        let mut polls = 0u32;
        loop {
            let status = self.engine.query_status(execution_id).await?;
            polls += 1;

            match status.state {
                QueryState::Succeeded => {
                    info!("Query {} exits with status = SUCCEEDED", execution_id);
                    return Ok(());
                }
                ref state if state.is_pending() => {
                    if self.poll.max_polls.is_some_and(|max| polls >= max) {
                        warn!("Query {} still {} after {} checks, giving up", execution_id, state, polls);
                        return Err(ValidationError::PollTimeout {
                            execution_id: execution_id.to_string(),
                            state: state.to_string(),
                            polls,
                        });
                    }
                    info!("Waiting... query status = {}", state);
                    tokio::time::sleep(self.poll.interval).await;
                }
                state => {
                    let reason = status.reason.unwrap_or_else(|| "no reason given".to_string());
                    error!("Query {} ended in state {}: {}", execution_id, state, reason);
                    return Err(ValidationError::QueryFailed {
                        execution_id: execution_id.to_string(),
                        state: state.to_string(),
                        reason,
                    });
                }
            }
        }
    }

    async fn fetch_rows(&self, execution_id: &str) -> Result<Vec<Vec<String>>, ValidationError> {
        let mut rows = Vec::new();
        let mut next_token = None;
        let mut first_page = true;

        loop {
            let page = self.engine.query_results(execution_id, next_token).await?;
            debug!("Result page with {} row(s)", page.rows.len());

            let skip = if first_page { 1 } else { 0 };
            for (index, row) in page.rows.into_iter().enumerate().skip(skip) {
                let fields = row
                    .into_iter()
                    .map(|cell| {
                        cell.ok_or_else(|| ValidationError::MalformedResult(format!("null cell in result row {}", index)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                rows.push(fields);
            }

            first_page = false;
            next_token = page.next_token;
            if next_token.is_none() {
                break;
            }
        }

        Ok(rows)
    }
}

pub fn row_count_query(tables: &[String]) -> Result<String, ValidationError> {
    if tables.is_empty() {
        return Err(ValidationError::TableList("no tables to count".to_string()));
    }

    Ok(tables
        .iter()
        .map(|table| format!("select '{}', count(*) from {}", table, table))
        .collect::<Vec<_>>()
        .join(" union all "))
}

/// Pairs result rows with tables by position; the engine returns union-all
/// branches in submission order.
pub fn assemble_row_counts(tables: &[String], rows: Vec<Vec<String>>) -> Result<Vec<RowCount>, ValidationError> {
    if tables.len() != rows.len() {
        error!("Requested {} table(s) but got {} result row(s)", tables.len(), rows.len());
        return Err(ValidationError::ResultCountMismatch {
            expected: tables.len(),
            actual: rows.len(),
        });
    }

    rows.into_iter()
        .map(|row| {
            let [table, count]: [String; 2] = row.try_into().map_err(|row: Vec<String>| {
                ValidationError::MalformedResult(format!("expected 2 fields, got {}", row.len()))
            })?;
            let count = count.trim().parse::<u64>().map_err(|_| {
                ValidationError::MalformedResult(format!("row count '{}' for {} is not a number", count, table))
            })?;
            Ok(RowCount { table, count })
        })
        .collect()
}
