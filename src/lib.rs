/// AWS samples - thin clients for DynamoDB, S3 and SQS plus a table dispatch Lambda.
///
/// The crate provides:
/// 1. Table operations (create/delete table, put/get/scan/query/update/delete item,
///    buffered batch writes, paginated scans)
/// 2. Object-store operations (create/list buckets, upload and download files)
/// 3. Queue operations (create/get/list queues, single and batch sends, receive with
///    acknowledgement, delete queues)
/// 4. A Lambda function that maps `{operation, tableName, payload}` onto one table call
///
/// Each service sits behind an async trait (`TableBackend`, `ObjectStore`,
/// `QueueService`) implemented over the AWS SDK, so the operations can run against
/// any implementation of those traits.
///
/// # Example
///
/// ```no_run
/// use aws_samples::core::config::AppConfig;
/// use aws_samples::core::resource::load_sdk_config;
/// use aws_samples::dynamodb::{self, DynamoTableBackend};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     aws_samples::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let sdk_config = load_sdk_config(&config).await;
///     let backend = DynamoTableBackend::new(&sdk_config);
///
///     let page = dynamodb::scan(&backend, &config.table_name).await?;
///     for item in page.items {
///         println!("{}", serde_json::Value::Object(item));
///     }
///     Ok(())
/// }
/// ```
pub mod core;
pub mod dispatch;
pub mod dynamodb;
pub mod errors;
pub mod s3;
pub mod sqs;

pub use errors::{AwsSampleError, AwsSampleResult};

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this more than
/// once keeps the first subscriber.
///
/// # Example
///
/// ```
/// aws_samples::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
