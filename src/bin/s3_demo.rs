//! Creates a bucket, lists buckets, then uploads a file and downloads it back.

use anyhow::Result;
use aws_samples::core::config::AppConfig;
use aws_samples::core::resource::{ServiceHandle, ServiceName, create_aws_resource, load_sdk_config};
use aws_samples::s3;
use tracing::info;

const UPLOAD_FILE: &str = "resources/s3test.txt";
const DOWNLOAD_FILE: &str = "download.txt";

#[tokio::main]
async fn main() -> Result<()> {
    aws_samples::setup_logging();

    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;
    let sdk_config = load_sdk_config(&config).await;
    let ServiceHandle::ObjectStore(store) = create_aws_resource(&sdk_config, ServiceName::S3) else {
        anyhow::bail!("resource factory returned the wrong service");
    };
    let bucket = config.bucket_name.as_str();

    if let Some(location) = s3::create_bucket(&store, bucket, None).await {
        info!(?location, "Bucket created");
    }

    s3::list_all_bucket(&store).await;

    let uploaded = s3::upload_file(&store, bucket, UPLOAD_FILE, None).await;
    info!(uploaded, "File upload result");

    let downloaded = s3::download_file(&store, bucket, DOWNLOAD_FILE, UPLOAD_FILE).await;
    info!(downloaded, "File download result");

    Ok(())
}
