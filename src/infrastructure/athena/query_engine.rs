use async_trait::async_trait;
use aws_sdk_athena::{
    types::{QueryExecutionContext, ResultConfiguration},
    Client,
};
use tracing::{debug, info, error};
use crate::domain::{
    error::ValidationError,
    models::{QueryState, QueryStatus, ResultPage},
    ports::QueryEngine,
};

pub struct AthenaQueryEngine {
    client: Client,
}

impl AthenaQueryEngine {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryEngine for AthenaQueryEngine {
    async fn start_query(&self, query: &str, database: &str, output_location: &str) -> Result<String, ValidationError> {
        debug!("Submitting query to database {}: {}", database, query);

        let response = self.client
            .start_query_execution()
            .query_string(query)
            .query_execution_context(QueryExecutionContext::builder().database(database).build())
            .result_configuration(ResultConfiguration::builder().output_location(output_location).build())
            .send()
            .await
            .map_err(|e| {
                error!("Cannot start an Athena query: {}", e);
                ValidationError::Query(e.to_string())
            })?;

        let execution_id = response
            .query_execution_id()
            .ok_or_else(|| ValidationError::Query("Athena returned no query execution id".to_string()))?
            .to_string();

        info!("StartQueryExecution returned query id {}", execution_id);
        Ok(execution_id)
    }

    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus, ValidationError> {
        let response = self.client
            .get_query_execution()
            .query_execution_id(execution_id)
            .send()
            .await
            .map_err(|e| ValidationError::Query(e.to_string()))?;

        let status = response
            .query_execution()
            .and_then(|execution| execution.status())
            .ok_or_else(|| ValidationError::Query(format!("no status reported for query {}", execution_id)))?;

        let state = status
            .state()
            .map(|state| QueryState::from(state.as_str()))
            .ok_or_else(|| ValidationError::Query(format!("no state reported for query {}", execution_id)))?;

        Ok(QueryStatus {
            state,
            reason: status.state_change_reason().map(str::to_string),
        })
    }

    async fn query_results(&self, execution_id: &str, next_token: Option<String>) -> Result<ResultPage, ValidationError> {
        let response = self.client
            .get_query_results()
            .query_execution_id(execution_id)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ValidationError::Query(e.to_string()))?;

        let rows = response
            .result_set()
            .map(|result_set| {
                result_set
                    .rows()
                    .iter()
                    .map(|row| {
                        row.data()
                            .iter()
                            .map(|datum| datum.var_char_value().map(str::to_string))
                            .collect()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ResultPage {
            rows,
            next_token: response.next_token().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_athena::operation::{
        get_query_execution::GetQueryExecutionOutput,
        get_query_results::GetQueryResultsOutput,
        start_query_execution::StartQueryExecutionOutput,
    };
    use aws_sdk_athena::types::{
        Datum, QueryExecution, QueryExecutionState, QueryExecutionStatus, ResultSet, Row,
    };
    use aws_smithy_mocks::{mock, mock_client};
    use std::sync::Arc;
    use std::time::Duration;
    use crate::application::athena_validation::{AthenaValidationService, PollSettings};
    use crate::domain::models::RowCount;

    fn row(cells: &[Option<&str>]) -> Row {
        cells
            .iter()
            .fold(Row::builder(), |row, cell| {
                let datum = match cell {
                    Some(value) => Datum::builder().var_char_value(*value).build(),
                    None => Datum::builder().build(),
                };
                row.data(datum)
            })
            .build()
    }

    fn page(rows: Vec<Row>, next_token: Option<&str>) -> GetQueryResultsOutput {
        GetQueryResultsOutput::builder()
            .result_set(ResultSet::builder().set_rows(Some(rows)).build())
            .set_next_token(next_token.map(str::to_string))
            .build()
    }

    fn execution(status: QueryExecutionStatus) -> GetQueryExecutionOutput {
        GetQueryExecutionOutput::builder()
            .query_execution(QueryExecution::builder().status(status).build())
            .build()
    }

    #[tokio::test]
    async fn submits_query_with_database_and_output_location() {
        let start_rule = mock!(aws_sdk_athena::Client::start_query_execution)
            .match_requests(|req| {
                req.query_string() == Some("select 'sales_orders', count(*) from sales_orders")
                    && req.query_execution_context().and_then(|c| c.database()) == Some("lake_dev")
                    && req.result_configuration().and_then(|r| r.output_location())
                        == Some("s3://athena-results-dev/")
            })
            .then_output(|| StartQueryExecutionOutput::builder().query_execution_id("exec-1").build());
        let engine = AthenaQueryEngine::new(mock_client!(aws_sdk_athena, [&start_rule]));

        let execution_id = engine
            .start_query("select 'sales_orders', count(*) from sales_orders", "lake_dev", "s3://athena-results-dev/")
            .await
            .unwrap();

        assert_eq!(execution_id, "exec-1");
        assert_eq!(start_rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn missing_execution_id_is_a_query_error() {
        let start_rule = mock!(aws_sdk_athena::Client::start_query_execution)
            .then_output(|| StartQueryExecutionOutput::builder().build());
        let engine = AthenaQueryEngine::new(mock_client!(aws_sdk_athena, [&start_rule]));

        let result = engine.start_query("select 1", "lake_dev", "s3://out/").await;
        assert!(matches!(result, Err(ValidationError::Query(_))));
    }

    #[tokio::test]
    async fn failed_state_carries_reason() {
        let status_rule = mock!(aws_sdk_athena::Client::get_query_execution)
            .match_requests(|req| req.query_execution_id() == Some("exec-1"))
            .then_output(|| {
                execution(
                    QueryExecutionStatus::builder()
                        .state(QueryExecutionState::Failed)
                        .state_change_reason("SYNTAX_ERROR: line 1:8")
                        .build(),
                )
            });
        let engine = AthenaQueryEngine::new(mock_client!(aws_sdk_athena, [&status_rule]));

        let status = engine.query_status("exec-1").await.unwrap();

        assert_eq!(status.state, QueryState::Failed);
        assert_eq!(status.reason.as_deref(), Some("SYNTAX_ERROR: line 1:8"));
    }

    #[tokio::test]
    async fn status_without_state_is_a_query_error() {
        let status_rule = mock!(aws_sdk_athena::Client::get_query_execution)
            .then_output(|| execution(QueryExecutionStatus::builder().build()));
        let engine = AthenaQueryEngine::new(mock_client!(aws_sdk_athena, [&status_rule]));

        assert!(matches!(
            engine.query_status("exec-1").await,
            Err(ValidationError::Query(_))
        ));
    }

    #[tokio::test]
    async fn result_pages_follow_next_token_and_keep_nulls() {
        let first_rule = mock!(aws_sdk_athena::Client::get_query_results)
            .match_requests(|req| req.query_execution_id() == Some("exec-1") && req.next_token().is_none())
            .then_output(|| {
                page(
                    vec![row(&[Some("_col0"), Some("_col1")]), row(&[Some("orders"), None])],
                    Some("page-2"),
                )
            });
        let second_rule = mock!(aws_sdk_athena::Client::get_query_results)
            .match_requests(|req| req.next_token() == Some("page-2"))
            .then_output(|| page(vec![row(&[Some("customers"), Some("0")])], None));
        let engine = AthenaQueryEngine::new(mock_client!(aws_sdk_athena, [&first_rule, &second_rule]));

        let first = engine.query_results("exec-1", None).await.unwrap();
        assert_eq!(
            first.rows,
            vec![
                vec![Some("_col0".to_string()), Some("_col1".to_string())],
                vec![Some("orders".to_string()), None],
            ]
        );
        assert_eq!(first.next_token.as_deref(), Some("page-2"));

        let second = engine.query_results("exec-1", first.next_token).await.unwrap();
        assert_eq!(second.rows, vec![vec![Some("customers".to_string()), Some("0".to_string())]]);
        assert_eq!(second.next_token, None);
    }

    #[tokio::test]
    async fn row_counts_over_two_result_pages() {
        let start_rule = mock!(aws_sdk_athena::Client::start_query_execution)
            .then_output(|| StartQueryExecutionOutput::builder().query_execution_id("exec-1").build());
        let running_rule = mock!(aws_sdk_athena::Client::get_query_execution)
            .then_output(|| execution(QueryExecutionStatus::builder().state(QueryExecutionState::Running).build()));
        let succeeded_rule = mock!(aws_sdk_athena::Client::get_query_execution)
            .then_output(|| execution(QueryExecutionStatus::builder().state(QueryExecutionState::Succeeded).build()));
        let first_rule = mock!(aws_sdk_athena::Client::get_query_results)
            .match_requests(|req| req.next_token().is_none())
            .then_output(|| {
                page(
                    vec![row(&[Some("_col0"), Some("_col1")]), row(&[Some("sales_orders"), Some("10")])],
                    Some("page-2"),
                )
            });
        let second_rule = mock!(aws_sdk_athena::Client::get_query_results)
            .match_requests(|req| req.next_token() == Some("page-2"))
            .then_output(|| page(vec![row(&[Some("sales_customers"), Some("0")])], None));

        let client = mock_client!(
            aws_sdk_athena,
            [&start_rule, &running_rule, &succeeded_rule, &first_rule, &second_rule]
        );
        let service = AthenaValidationService::new(
            Arc::new(AthenaQueryEngine::new(client)),
            PollSettings { interval: Duration::ZERO, max_polls: None },
        );

        let counts = service
            .count_rows(
                &["sales_orders".to_string(), "sales_customers".to_string()],
                "lake_dev",
                "s3://athena-results-dev/",
            )
            .await
            .unwrap();

        assert_eq!(
            counts,
            vec![
                RowCount { table: "sales_orders".to_string(), count: 10 },
                RowCount { table: "sales_customers".to_string(), count: 0 },
            ]
        );
        assert_eq!(running_rule.num_calls(), 1);
        assert_eq!(second_rule.num_calls(), 1);
    }
}
