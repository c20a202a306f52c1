//! Queue operations backed by SQS

pub mod backend;
pub mod types;

use std::collections::HashSet;

use tracing::{error, info, warn};

pub use backend::{QueueService, SqsQueueService};
pub use types::{
    BatchEntry, BatchFailure, BatchSendResult, BatchSuccess, MessageAttribute, MessageAttributes,
    QueueHandle, ReceivedMessage, SendReceipt, queue_name_from_url,
};

use crate::errors::{AwsSampleError, AwsSampleResult};

/// Provider cap on messages returned by one receive call.
pub const MAX_RECEIVE: i32 = 10;

/// Provider cap on entries in one batch send.
pub const MAX_BATCH_ENTRIES: usize = 10;

fn logged<T>(result: AwsSampleResult<T>, operation: &str) -> AwsSampleResult<T> {
    result.map_err(|e| {
        error!(operation, "Error {}", e);
        e
    })
}

async fn resolve<Q: QueueService + ?Sized>(
    svc: &Q,
    name: String,
    url: String,
) -> AwsSampleResult<QueueHandle> {
    let attributes = svc.queue_attributes(&url).await?;
    Ok(QueueHandle {
        name,
        url,
        attributes,
    })
}

/// Creates `name` and returns its handle with attributes.
pub async fn create_queue<Q: QueueService + ?Sized>(
    svc: &Q,
    name: &str,
) -> AwsSampleResult<QueueHandle> {
    let result = async {
        let url = svc.create_queue(name).await?;
        resolve(svc, name.to_string(), url).await
    }
    .await;

    let handle = logged(result, "create_queue")?;
    info!(queue = %handle.name, url = %handle.url, "Queue created");
    Ok(handle)
}

/// Looks up an existing queue by name.
pub async fn get_queue<Q: QueueService + ?Sized>(
    svc: &Q,
    name: &str,
) -> AwsSampleResult<QueueHandle> {
    let result = async {
        let url = svc.get_queue_url(name).await?;
        resolve(svc, name.to_string(), url).await
    }
    .await;

    logged(result, "get_queue")
}

/// Resolves every queue in the account and logs its URL and ARN-derived name.
pub async fn list_all_queue<Q: QueueService + ?Sized>(
    svc: &Q,
) -> AwsSampleResult<Vec<QueueHandle>> {
    let result = async {
        let mut handles = Vec::new();
        for url in svc.list_queue_urls().await? {
            let name = queue_name_from_url(&url);
            handles.push(resolve(svc, name, url).await?);
        }
        Ok::<_, AwsSampleError>(handles)
    }
    .await;

    let handles = logged(result, "list_queues")?;
    for handle in &handles {
        info!(url = %handle.url, "Queue URL");
        info!(name = handle.arn_name().unwrap_or(""), "Queue ARN name");
    }
    Ok(handles)
}

pub async fn send_message<Q: QueueService + ?Sized>(
    svc: &Q,
    queue: &QueueHandle,
    body: &str,
    attributes: Option<MessageAttributes>,
) -> AwsSampleResult<SendReceipt> {
    logged(
        svc.send_message(&queue.url, body, attributes).await,
        "send_message",
    )
}

fn validate_entries(entries: &[BatchEntry]) -> AwsSampleResult<()> {
    if entries.is_empty() || entries.len() > MAX_BATCH_ENTRIES {
        return Err(AwsSampleError::GeneralError(format!(
            "batch send takes 1 to {MAX_BATCH_ENTRIES} entries, got {}",
            entries.len()
        )));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = entries.iter().find(|e| !seen.insert(e.id.as_str())) {
        return Err(AwsSampleError::GeneralError(format!(
            "duplicate batch entry id {}",
            dup.id
        )));
    }
    Ok(())
}

/// Sends `entries` in one request.
///
/// The result lists successful and failed entries; failures are not retried here.
pub async fn send_messages<Q: QueueService + ?Sized>(
    svc: &Q,
    queue: &QueueHandle,
    entries: Vec<BatchEntry>,
) -> AwsSampleResult<BatchSendResult> {
    logged(validate_entries(&entries), "send_messages")?;

    let result = logged(
        svc.send_message_batch(&queue.url, entries).await,
        "send_messages",
    )?;

    for failure in &result.failed {
        warn!(
            id = %failure.id,
            code = %failure.code,
            sender_fault = failure.sender_fault,
            "Batch entry failed"
        );
    }
    Ok(result)
}

/// Receives up to [`MAX_RECEIVE`] messages, logging and then deleting each one.
///
/// A queue with few messages may return fewer than requested, or none; callers that need
/// more should call again. A failed delete is logged and the remaining messages are still
/// processed.
pub async fn receive_message<Q: QueueService + ?Sized>(
    svc: &Q,
    queue: &QueueHandle,
) -> AwsSampleResult<Vec<ReceivedMessage>> {
    let messages = logged(
        svc.receive_messages(&queue.url, MAX_RECEIVE).await,
        "receive_message",
    )?;

    for message in &messages {
        info!(message = ?message, "Received message");
        info!(
            "messageBody:{}, authorText:{}",
            message.body,
            message.author_text()
        );

        if let Err(e) = svc.delete_message(&queue.url, &message.receipt_handle).await {
            error!(queue = %queue.name, "Failed to delete message: {}", e);
        }
    }

    Ok(messages)
}

/// Deletes each queue in order, stopping at the first failure.
pub async fn delete_queues<Q: QueueService + ?Sized>(
    svc: &Q,
    queues: &[QueueHandle],
) -> AwsSampleResult<()> {
    for queue in queues {
        logged(svc.delete_queue(&queue.url).await, "delete_queue")?;
        info!(queue = %queue.name, "Queue deleted");
    }
    Ok(())
}
