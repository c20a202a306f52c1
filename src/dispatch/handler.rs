use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{debug, error, info};

use super::{DispatchRequest, dispatch};
use crate::core::config::AppConfig;
use crate::core::resource::load_sdk_config;
use crate::dynamodb::{DynamoTableBackend, TableBackend};
use crate::errors::AwsSampleResult;

pub use self::function_handler as handler;

/// Parses `event` and dispatches it against `backend`.
pub async fn handle_event<B: TableBackend + ?Sized>(
    backend: &B,
    event: &Value,
) -> AwsSampleResult<Value> {
    let request = DispatchRequest::from_event(event)?;
    dispatch(backend, request).await
}

/// Lambda handler for the table dispatch function.
///
/// # Errors
///
/// Returns an error for unrecognized operations, malformed payloads and provider failures.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();
    info!(
        "Received event: {}",
        serde_json::to_string_pretty(&payload).unwrap_or_default()
    );
    debug!(request_id = %context.request_id, "Invocation context");

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e)
    })?;
    let sdk_config = load_sdk_config(&config).await;
    let backend = DynamoTableBackend::new(&sdk_config);

    handle_event(&backend, &payload).await.map_err(|e| {
        error!("Dispatch failed: {}", e);
        Error::from(e)
    })
}
