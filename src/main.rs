use clap::Parser;
use data_validation::{
    cli::Cli,
    config::{default_settings, Configuration, Settings},
    domain::error::ValidationError,
    runner::ValidationRunner,
};
use std::process::ExitCode;
use tracing::{info, debug, error};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "data_validation=debug,aws_config=warn,aws_sdk_athena=warn,aws_sdk_dynamodb=warn,aws_smithy_runtime=warn";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();
    debug!("Arguments: {:?}", cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Validation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ValidationError> {
    let settings = Settings::load(&cli.config_dir, &cli.config_name, default_settings())?;
    let config = Configuration::resolve(&settings, cli.env)?;
    info!("Validating {} in region {}", cli.env.as_str(), config.region);

    ValidationRunner::new(config, cli.run_options()).run().await
}
