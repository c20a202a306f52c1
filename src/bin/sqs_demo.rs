//! Queue walkthrough: create, list, send, batch send, receive, delete.

use anyhow::{Context, Result};
use aws_samples::core::config::AppConfig;
use aws_samples::core::resource::{ServiceHandle, ServiceName, create_aws_resource, load_sdk_config};
use aws_samples::sqs::{self, BatchEntry, MessageAttribute};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    aws_samples::setup_logging();

    let config = AppConfig::from_env().map_err(anyhow::Error::msg)?;
    let sdk_config = load_sdk_config(&config).await;
    let ServiceHandle::Queue(svc) = create_aws_resource(&sdk_config, ServiceName::Sqs) else {
        anyhow::bail!("resource factory returned the wrong service");
    };

    info!("-----------create queues-----------");
    let mut queues = Vec::new();
    for name in &config.queue_names {
        let queue = sqs::create_queue(&svc, name).await?;
        info!(
            url = %queue.url,
            delay_seconds = queue.attribute("DelaySeconds").unwrap_or(""),
            "Created queue"
        );
        queues.push(queue);
    }
    let first = queues.first().context("no queues configured")?;
    let last = queues.last().context("no queues configured")?;

    info!("-----------list queues-----------");
    sqs::list_all_queue(&svc).await?;

    info!("-----------send message-----------");
    let receipt = sqs::send_message(&svc, first, "test message", None).await?;
    info!(
        message_id = receipt.message_id.as_deref().unwrap_or(""),
        md5 = receipt.md5_of_body.as_deref().unwrap_or(""),
        "Sent message"
    );

    info!("-----------send message batch-----------");
    let entries = vec![
        BatchEntry::with_id("1", "world1"),
        BatchEntry::with_id("2", "boto3").attribute("Author", MessageAttribute::string("TestUser")),
    ];
    let results = sqs::send_messages(&svc, last, entries).await?;
    // Failed entries could be re-submitted here
    info!(successful = ?results.successful, failed = ?results.failed, "Batch sent");

    info!("-----------receive messages-----------");
    let received = sqs::receive_message(&svc, last).await?;
    info!(count = received.len(), "Processed messages");

    info!("-----------delete queues-----------");
    sqs::delete_queues(&svc, &queues).await?;

    Ok(())
}
