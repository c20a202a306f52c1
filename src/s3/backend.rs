//! Provider seam for object storage and its S3 implementation.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::{ByteStream, DateTimeFormat};
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use tracing::debug;

use crate::errors::{AwsSampleError, AwsSampleResult};

/// Region where buckets are created without a location constraint.
const LEGACY_REGION: &str = "us-east-1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    pub name: String,
    pub creation_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketLocation {
    pub bucket: String,
    pub location: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn create_bucket(&self, bucket: &str, region: &str) -> AwsSampleResult<BucketLocation>;

    async fn list_buckets(&self) -> AwsSampleResult<Vec<BucketSummary>>;

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> AwsSampleResult<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> AwsSampleResult<Vec<u8>>;
}

/// [`ObjectStore`] over the AWS SDK S3 client.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: S3Client,
}

impl S3ObjectStore {
    #[must_use]
    pub fn new(sdk_config: &SdkConfig, force_path_style: bool) -> Self {
        let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(force_path_style)
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
        }
    }

    #[must_use]
    pub const fn from_client(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn create_bucket(&self, bucket: &str, region: &str) -> AwsSampleResult<BucketLocation> {
        let mut request = self.client.create_bucket().bucket(bucket);

        if region != LEGACY_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        let output = request.send().await?;

        Ok(BucketLocation {
            bucket: bucket.to_string(),
            location: output.location().map(ToString::to_string),
        })
    }

    async fn list_buckets(&self) -> AwsSampleResult<Vec<BucketSummary>> {
        let output = self.client.list_buckets().send().await?;

        Ok(output
            .buckets()
            .iter()
            .map(|b| BucketSummary {
                name: b.name().unwrap_or_default().to_string(),
                creation_date: b
                    .creation_date()
                    .and_then(|d| d.fmt(DateTimeFormat::DateTime).ok()),
            })
            .collect())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> AwsSampleResult<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await?;

        debug!(bucket = %bucket, key = %key, size, "Stored object");
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> AwsSampleResult<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| AwsSampleError::AwsError(format!("S3 body read failed: {e}")))?
            .into_bytes();

        Ok(bytes.to_vec())
    }
}
