//! Provider seam for queues and its SQS implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::Client as SqsClient;
use aws_sdk_sqs::types::{MessageAttributeValue, QueueAttributeName, SendMessageBatchRequestEntry};

use super::types::{
    BatchEntry, BatchFailure, BatchSendResult, BatchSuccess, MessageAttribute, MessageAttributes,
    ReceivedMessage, SendReceipt,
};
use crate::errors::{AwsSampleError, AwsSampleResult};

#[async_trait]
pub trait QueueService: Send + Sync {
    /// Creates the queue (or returns the existing one) and yields its URL.
    async fn create_queue(&self, name: &str) -> AwsSampleResult<String>;

    async fn get_queue_url(&self, name: &str) -> AwsSampleResult<String>;

    async fn queue_attributes(&self, queue_url: &str) -> AwsSampleResult<HashMap<String, String>>;

    async fn list_queue_urls(&self) -> AwsSampleResult<Vec<String>>;

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        attributes: Option<MessageAttributes>,
    ) -> AwsSampleResult<SendReceipt>;

    async fn send_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<BatchEntry>,
    ) -> AwsSampleResult<BatchSendResult>;

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
    ) -> AwsSampleResult<Vec<ReceivedMessage>>;

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> AwsSampleResult<()>;

    async fn delete_queue(&self, queue_url: &str) -> AwsSampleResult<()>;
}

/// [`QueueService`] over the AWS SDK SQS client.
#[derive(Clone)]
pub struct SqsQueueService {
    client: Arc<SqsClient>,
}

impl SqsQueueService {
    #[must_use]
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Arc::new(SqsClient::new(sdk_config)),
        }
    }

    #[must_use]
    pub const fn from_client(client: Arc<SqsClient>) -> Self {
        Self { client }
    }
}

fn to_provider_attributes(
    attributes: MessageAttributes,
) -> AwsSampleResult<HashMap<String, MessageAttributeValue>> {
    attributes
        .into_iter()
        .map(|(name, attribute)| -> AwsSampleResult<(String, MessageAttributeValue)> {
            let value = MessageAttributeValue::builder()
                .data_type(attribute.data_type)
                .string_value(attribute.string_value)
                .build()
                .map_err(|e| {
                    AwsSampleError::GeneralError(format!("Failed to build attribute {name}: {e}"))
                })?;
            Ok((name, value))
        })
        .collect()
}

fn from_provider_attributes(
    attributes: Option<&HashMap<String, MessageAttributeValue>>,
) -> MessageAttributes {
    attributes
        .map(|map| {
            map.iter()
                .map(|(name, value)| {
                    (
                        name.clone(),
                        MessageAttribute {
                            data_type: value.data_type().to_string(),
                            string_value: value.string_value().unwrap_or_default().to_string(),
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn missing_url(name: &str) -> AwsSampleError {
    AwsSampleError::AwsError(format!("provider returned no URL for queue {name}"))
}

#[async_trait]
impl QueueService for SqsQueueService {
    async fn create_queue(&self, name: &str) -> AwsSampleResult<String> {
        let output = self.client.create_queue().queue_name(name).send().await?;
        output
            .queue_url()
            .map(ToString::to_string)
            .ok_or_else(|| missing_url(name))
    }

    async fn get_queue_url(&self, name: &str) -> AwsSampleResult<String> {
        let output = self.client.get_queue_url().queue_name(name).send().await?;
        output
            .queue_url()
            .map(ToString::to_string)
            .ok_or_else(|| missing_url(name))
    }

    async fn queue_attributes(&self, queue_url: &str) -> AwsSampleResult<HashMap<String, String>> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(queue_url)
            .attribute_names(QueueAttributeName::All)
            .send()
            .await?;

        Ok(output
            .attributes()
            .map(|map| {
                map.iter()
                    .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_queue_urls(&self) -> AwsSampleResult<Vec<String>> {
        let mut urls = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_queues()
                .set_next_token(next_token.take())
                .send()
                .await?;

            urls.extend(output.queue_urls().iter().cloned());

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(urls)
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        attributes: Option<MessageAttributes>,
    ) -> AwsSampleResult<SendReceipt> {
        let attributes = attributes.map(to_provider_attributes).transpose()?;

        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .set_message_attributes(attributes)
            .send()
            .await?;

        Ok(SendReceipt {
            message_id: output.message_id().map(ToString::to_string),
            md5_of_body: output.md5_of_message_body().map(ToString::to_string),
        })
    }

    async fn send_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<BatchEntry>,
    ) -> AwsSampleResult<BatchSendResult> {
        let entries = entries
            .into_iter()
            .map(|entry| -> AwsSampleResult<SendMessageBatchRequestEntry> {
                let attributes = entry.attributes.map(to_provider_attributes).transpose()?;
                Ok(SendMessageBatchRequestEntry::builder()
                    .id(entry.id)
                    .message_body(entry.body)
                    .set_message_attributes(attributes)
                    .build()?)
            })
            .collect::<AwsSampleResult<Vec<_>>>()?;

        let output = self
            .client
            .send_message_batch()
            .queue_url(queue_url)
            .set_entries(Some(entries))
            .send()
            .await?;

        Ok(BatchSendResult {
            successful: output
                .successful()
                .iter()
                .map(|s| BatchSuccess {
                    id: s.id().to_string(),
                    message_id: s.message_id().to_string(),
                })
                .collect(),
            failed: output
                .failed()
                .iter()
                .map(|f| BatchFailure {
                    id: f.id().to_string(),
                    code: f.code().to_string(),
                    message: f.message().map(ToString::to_string),
                    sender_fault: f.sender_fault(),
                })
                .collect(),
        })
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
    ) -> AwsSampleResult<Vec<ReceivedMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages)
            .message_attribute_names("All")
            .send()
            .await?;

        Ok(output
            .messages()
            .iter()
            .filter_map(|msg| {
                let receipt_handle = msg.receipt_handle()?.to_string();
                Some(ReceivedMessage {
                    message_id: msg.message_id().map(ToString::to_string),
                    body: msg.body().unwrap_or_default().to_string(),
                    receipt_handle,
                    attributes: from_provider_attributes(msg.message_attributes()),
                })
            })
            .collect())
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> AwsSampleResult<()> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await?;
        Ok(())
    }

    async fn delete_queue(&self, queue_url: &str) -> AwsSampleResult<()> {
        self.client.delete_queue().queue_url(queue_url).send().await?;
        Ok(())
    }
}
