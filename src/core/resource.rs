//! Resource factory: turns an [`AppConfig`] into authenticated, region-bound service handles.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use strum::{Display, EnumString};
use tracing::info;

use super::config::AppConfig;
use crate::dynamodb::DynamoTableBackend;
use crate::s3::S3ObjectStore;
use crate::sqs::SqsQueueService;

/// Managed services the samples know how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ServiceName {
    Dynamodb,
    S3,
    Sqs,
}

/// A backend bound to one service.
pub enum ServiceHandle {
    Database(DynamoTableBackend),
    ObjectStore(S3ObjectStore),
    Queue(SqsQueueService),
}

impl std::fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ServiceHandle::Database(_) => ServiceName::Dynamodb,
            ServiceHandle::ObjectStore(_) => ServiceName::S3,
            ServiceHandle::Queue(_) => ServiceName::Sqs,
        };
        write!(f, "ServiceHandle({name})")
    }
}

/// Loads the shared SDK configuration for the configured region and optional endpoint.
pub async fn load_sdk_config(config: &AppConfig) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        info!(endpoint = %endpoint, "Using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}

/// Builds the backend for `service` from an already-loaded SDK configuration.
#[must_use]
pub fn create_aws_resource(sdk_config: &SdkConfig, service: ServiceName) -> ServiceHandle {
    match service {
        ServiceName::Dynamodb => ServiceHandle::Database(DynamoTableBackend::new(sdk_config)),
        // Emulators such as LocalStack only resolve path-style bucket addressing
        ServiceName::S3 => ServiceHandle::ObjectStore(S3ObjectStore::new(
            sdk_config,
            sdk_config.endpoint_url().is_some(),
        )),
        ServiceName::Sqs => ServiceHandle::Queue(SqsQueueService::new(sdk_config)),
    }
}
