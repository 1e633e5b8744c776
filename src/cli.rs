use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use crate::{
    application::athena_validation::PollSettings,
    domain::models::{Backend, Environment},
    runner::RunOptions,
};

/// Row-count and ingestion-status checks against Athena and DynamoDB
///
/// Options are GNU-style long flags (`--env prd`, `--svc ddb`). Single-dash
/// spellings such as `-env prd` are not accepted.
#[derive(Parser, Debug)]
#[command(name = "data_validation", version)]
pub struct Cli {
    /// Deployment environment
    #[arg(long, value_enum, default_value_t = Environment::Dev)]
    pub env: Environment,

    /// Backend to validate against
    #[arg(long, value_enum, default_value_t = Backend::Athena)]
    pub svc: Backend,

    /// Table list, relative to the config directory
    #[arg(long, default_value = "tables.csv")]
    pub tables: PathBuf,

    /// Prefix of ingestor names in the tracking table
    #[arg(long, alias = "ddbPrefix", default_value = "pipe-")]
    pub ddb_prefix: String,

    /// Report file, relative to the result directory
    #[arg(long, default_value = "results.csv")]
    pub output: PathBuf,

    #[arg(long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Configuration file name without extension
    #[arg(long, default_value = "el")]
    pub config_name: String,

    #[arg(long, default_value = "result")]
    pub result_dir: PathBuf,

    /// Seconds between Athena status checks
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval: u64,

    /// Give up after this many status checks
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_polls: Option<u32>,
}

impl Cli {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            backend: self.svc,
            tables_path: self.config_dir.join(&self.tables),
            output_path: self.result_dir.join(&self.output),
            ddb_prefix: self.ddb_prefix.clone(),
            poll: PollSettings {
                interval: Duration::from_secs(self.poll_interval),
                max_polls: self.max_polls,
            },
        }
    }
}
