use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::{debug, info};

/// Shared SDK configuration for the given region. `AWS_ENDPOINT_URL` points
/// every client at a custom endpoint such as LocalStack.
pub async fn load_sdk_config(region: &str) -> SdkConfig {
    debug!("Loading AWS configuration for region {}", region);
    let mut builder = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()));

    if let Ok(endpoint_url) = std::env::var("AWS_ENDPOINT_URL") {
        info!("Using custom AWS endpoint: {}", endpoint_url);
        builder = builder.endpoint_url(endpoint_url);
    }

    builder.load().await
}

pub fn athena_client(sdk_config: &SdkConfig) -> aws_sdk_athena::Client {
    aws_sdk_athena::Client::new(sdk_config)
}

pub fn dynamodb_client(sdk_config: &SdkConfig) -> aws_sdk_dynamodb::Client {
    aws_sdk_dynamodb::Client::new(sdk_config)
}
