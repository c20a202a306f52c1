//! Object-store operations backed by S3
//!
//! These mirror the sample script: failures are logged and reported through the
//! return value (`None` / `false`) rather than as errors.

pub mod backend;

use std::path::Path;

use tracing::{error, info};

pub use backend::{BucketLocation, BucketSummary, ObjectStore, S3ObjectStore};

use crate::core::config::DEFAULT_REGION;
use crate::errors::AwsSampleResult;

/// Creates `bucket` in `region`, or in [`DEFAULT_REGION`] when none is given.
///
/// Returns `None` if the provider rejects the request.
pub async fn create_bucket<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    region: Option<&str>,
) -> Option<BucketLocation> {
    let region = region.unwrap_or(DEFAULT_REGION);

    match store.create_bucket(bucket, region).await {
        Ok(location) => {
            info!(bucket = %bucket, region = %region, "Bucket created");
            Some(location)
        }
        Err(e) => {
            error!(bucket = %bucket, region = %region, "Error {}", e);
            None
        }
    }
}

/// Logs every bucket and returns the listing; a failed listing is logged and empty.
pub async fn list_all_bucket<S: ObjectStore + ?Sized>(store: &S) -> Vec<BucketSummary> {
    match store.list_buckets().await {
        Ok(buckets) => {
            for bucket in &buckets {
                info!(bucket = ?bucket, "Bucket info");
                info!(name = %bucket.name, "Bucket name");
            }
            buckets
        }
        Err(e) => {
            error!("Error {}", e);
            Vec::new()
        }
    }
}

fn default_object_name(file_name: &Path) -> String {
    file_name.to_string_lossy().replace('\\', "/")
}

async fn try_upload<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    file_name: &Path,
    object_name: &str,
) -> AwsSampleResult<usize> {
    let body = tokio::fs::read(file_name).await?;
    let size = body.len();
    store.put_object(bucket, object_name, body).await?;
    Ok(size)
}

/// Uploads a local file; the object name defaults to the file name.
///
/// Returns `true` when the file was uploaded, `false` otherwise.
pub async fn upload_file<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    file_name: impl AsRef<Path>,
    object_name: Option<&str>,
) -> bool {
    let file_name = file_name.as_ref();
    let object_name = object_name.map_or_else(|| default_object_name(file_name), ToString::to_string);

    match try_upload(store, bucket, file_name, &object_name).await {
        Ok(size) => {
            info!(bucket = %bucket, object = %object_name, size, "Uploaded file");
            true
        }
        Err(e) => {
            error!(bucket = %bucket, object = %object_name, "{}", e);
            false
        }
    }
}

async fn try_download<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    file_name: &Path,
    object_name: &str,
) -> AwsSampleResult<usize> {
    let body = store.get_object(bucket, object_name).await?;
    tokio::fs::write(file_name, &body).await?;
    Ok(body.len())
}

/// Downloads `object_name` into the local `file_name`.
///
/// Returns `true` when the file was written, `false` otherwise.
pub async fn download_file<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    file_name: impl AsRef<Path>,
    object_name: &str,
) -> bool {
    let file_name = file_name.as_ref();

    match try_download(store, bucket, file_name, object_name).await {
        Ok(size) => {
            info!(bucket = %bucket, object = %object_name, size, "Downloaded file");
            true
        }
        Err(e) => {
            error!(bucket = %bucket, object = %object_name, "{}", e);
            false
        }
    }
}
