use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, debug};
use crate::{
    application::{
        athena_validation::{AthenaValidationService, PollSettings},
        ingestion_status::{now_epoch_millis, IngestionStatusService, TrackingTable},
    },
    config::Configuration,
    domain::{
        error::ValidationError,
        models::{Backend, IngestionRecord, RowCount},
        ports::{IngestionLog, QueryEngine},
    },
    infrastructure::{
        athena::query_engine::AthenaQueryEngine,
        aws,
        dynamodb::ingestion_repo::DynamoIngestionRepository,
        parsers::table_list::read_table_list,
        report::csv_writer::{write_ingestion_records, write_row_counts},
    },
};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub backend: Backend,
    pub tables_path: PathBuf,
    pub output_path: PathBuf,
    pub ddb_prefix: String,
    pub poll: PollSettings,
}

/// One validation run: table list in, CSV report out.
pub struct ValidationRunner {
    config: Configuration,
    options: RunOptions,
}

impl ValidationRunner {
    pub fn new(config: Configuration, options: RunOptions) -> Self {
        Self { config, options }
    }

    pub async fn run(&self) -> Result<(), ValidationError> {
        let sdk_config = aws::load_sdk_config(&self.config.region).await;
        debug!("AWS region: {:?}", sdk_config.region());

        match self.options.backend {
            Backend::Athena => {
                info!("Running Athena-based validation...");
                let engine = Arc::new(AthenaQueryEngine::new(aws::athena_client(&sdk_config)));
                self.run_athena(engine).await?;
            }
            Backend::Ddb => {
                info!("Running DDB-based validation...");
                let log = Arc::new(DynamoIngestionRepository::new(aws::dynamodb_client(&sdk_config)));
                self.run_ddb(log, &now_epoch_millis()).await?;
            }
        }

        info!("Done running validation!");
        Ok(())
    }

    pub async fn run_athena(&self, engine: Arc<dyn QueryEngine>) -> Result<Vec<RowCount>, ValidationError> {
        let tables = read_table_list(&self.options.tables_path, Backend::Athena)?;

        let service = AthenaValidationService::new(engine, self.options.poll);
        let counts = service
            .count_rows(&tables, &self.config.athena_database, &self.config.athena_output_bucket)
            .await?;

        write_row_counts(&self.options.output_path, &counts)?;
        Ok(counts)
    }

    pub async fn run_ddb(&self, log: Arc<dyn IngestionLog>, now_millis: &str) -> Result<Vec<IngestionRecord>, ValidationError> {
        let tracking = TrackingTable {
            table: self.config.require_ddb_table()?.to_string(),
            hash_key: self.config.ddb_hash_key.clone(),
            sort_key: self.config.ddb_sort_key.clone(),
            newest_first: self.config.ddb_newest_first,
        };
        let tables = read_table_list(&self.options.tables_path, Backend::Ddb)?;

        let service = IngestionStatusService::new(log, tracking);
        let records = service
            .latest_statuses(&self.options.ddb_prefix, &tables, now_millis)
            .await?;

        write_ingestion_records(&self.options.output_path, &records)?;
        info!("Done writing DDB query result");
        Ok(records)
    }
}
