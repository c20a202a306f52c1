//! Buffered batch writes.
//!
//! `BatchWriter` groups single puts into `BatchWriteItem` requests of at most
//! [`MAX_BATCH_SIZE`] items and re-submits whatever the provider reports as
//! unprocessed, backing off between attempts.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use super::backend::TableBackend;
use super::types::{Item, key_of};
use crate::errors::{AwsSampleError, AwsSampleResult};

/// Provider limit on put requests per `BatchWriteItem` call.
pub const MAX_BATCH_SIZE: usize = 25;

const MAX_RESUBMITS: usize = 5;

enum FlushError {
    Provider(AwsSampleError),
    Unprocessed(usize),
}

pub struct BatchWriter<'a, B: TableBackend + ?Sized> {
    backend: &'a B,
    table_name: String,
    key_attributes: Vec<String>,
    buffer: Vec<Item>,
    written: usize,
}

impl<'a, B: TableBackend + ?Sized> BatchWriter<'a, B> {
    pub fn new(backend: &'a B, table_name: impl Into<String>) -> Self {
        Self {
            backend,
            table_name: table_name.into(),
            key_attributes: Vec::new(),
            buffer: Vec::with_capacity(MAX_BATCH_SIZE),
            written: 0,
        }
    }

    /// Deduplicates buffered puts on these key attributes; a later put for the same key
    /// replaces the earlier one, since a single request may not carry duplicate keys.
    #[must_use]
    pub fn overwrite_by_keys(mut self, key_attributes: Vec<String>) -> Self {
        self.key_attributes = key_attributes;
        self
    }

    /// Number of items the provider has accepted so far.
    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Buffers `item`, flushing once a full batch has accumulated.
    pub async fn put_item(&mut self, item: Item) -> AwsSampleResult<()> {
        if !self.key_attributes.is_empty() {
            let key = key_of(&item, &self.key_attributes)?;
            if let Some(pos) = self
                .buffer
                .iter()
                .position(|buffered| key_of(buffered, &self.key_attributes).ok().as_ref() == Some(&key))
            {
                self.buffer.remove(pos);
            }
        }

        self.buffer.push(item);

        if self.buffer.len() >= MAX_BATCH_SIZE {
            self.flush().await?;
        }
        Ok(())
    }

    /// Writes everything buffered so far.
    pub async fn flush(&mut self) -> AwsSampleResult<()> {
        while !self.buffer.is_empty() {
            let take = self.buffer.len().min(MAX_BATCH_SIZE);
            let chunk: Vec<Item> = self.buffer.drain(..take).collect();
            let count = chunk.len();
            self.write_chunk(chunk).await?;
            self.written += count;
            debug!(table = %self.table_name, count, "Flushed batch");
        }
        Ok(())
    }

    /// Flushes the remainder and returns the total number of items written.
    pub async fn close(mut self) -> AwsSampleResult<usize> {
        self.flush().await?;
        Ok(self.written)
    }

    async fn write_chunk(&self, chunk: Vec<Item>) -> AwsSampleResult<()> {
        let pending = &Mutex::new(chunk);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(25)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(MAX_RESUBMITS);

        let attempt = move || async move {
            let mut guard = pending.lock().await;
            let unprocessed = self
                .backend
                .batch_write(&self.table_name, guard.clone())
                .await
                .map_err(FlushError::Provider)?;

            if unprocessed.is_empty() {
                return Ok(());
            }

            let left = unprocessed.len();
            warn!(table = %self.table_name, left, "Re-submitting unprocessed items");
            *guard = unprocessed;
            Err(FlushError::Unprocessed(left))
        };

        RetryIf::start(strategy, attempt, |e: &FlushError| {
            matches!(e, FlushError::Unprocessed(_))
        })
        .await
        .map_err(|e| match e {
            FlushError::Provider(err) => err,
            FlushError::Unprocessed(left) => AwsSampleError::AwsError(format!(
                "{left} items still unprocessed after {MAX_RESUBMITS} re-submissions"
            )),
        })
    }
}
