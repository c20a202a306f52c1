//! Table operations used by the demo flow and the dispatch function.
//!
//! Every operation logs a provider failure and hands it back to the caller.

use std::time::Duration;

use serde_json::{Value, json};
use tokio::time::{Instant, sleep};
use tracing::{error, info};

use super::backend::TableBackend;
use super::batch::BatchWriter;
use super::scan::ScanPager;
use super::types::{Item, Key, PutOutcome, ScanPage, TableDescription, TableSpec, TableStatus};
use crate::errors::{AwsSampleError, AwsSampleResult};

/// Interval between `describe_table` polls while waiting for a new table.
pub const TABLE_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Size of the fixed demonstration set written by [`batch_put_item`].
pub const DEMO_BATCH_SIZE: usize = 50;

fn logged<T>(result: AwsSampleResult<T>, operation: &str, table_name: &str) -> AwsSampleResult<T> {
    result.map_err(|e| {
        error!(table = %table_name, operation, "{}", e);
        e
    })
}

/// Creates the table described by `spec` and blocks until it reports `ACTIVE`.
#[tracing::instrument(level = "info", skip(backend, spec), fields(table = %spec.table_name))]
pub async fn create_table<B: TableBackend + ?Sized>(
    backend: &B,
    spec: &TableSpec,
    wait_timeout: Duration,
) -> AwsSampleResult<TableDescription> {
    logged(spec.validate(), "create_table", &spec.table_name)?;

    let created = logged(
        backend.create_table(spec).await,
        "create_table",
        &spec.table_name,
    )?;
    info!(status = ?created.status, "Create table issued");

    logged(
        wait_until_active(backend, &spec.table_name, wait_timeout, TABLE_POLL_INTERVAL).await,
        "wait_table_exists",
        &spec.table_name,
    )
}

/// Polls `describe_table` until the table is active or `timeout` elapses.
pub async fn wait_until_active<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> AwsSampleResult<TableDescription> {
    let deadline = Instant::now() + timeout;

    loop {
        let description = backend.describe_table(table_name).await?;
        if description.status == TableStatus::Active {
            return Ok(description);
        }

        if Instant::now() + poll_interval > deadline {
            return Err(AwsSampleError::GeneralError(format!(
                "table {table_name} not active after {}s (last status {:?})",
                timeout.as_secs(),
                description.status
            )));
        }
        sleep(poll_interval).await;
    }
}

/// Issues the delete without waiting for it to finish.
pub async fn delete_table<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
) -> AwsSampleResult<()> {
    logged(
        backend.delete_table(table_name).await,
        "delete_table",
        table_name,
    )?;
    info!(table = %table_name, "Delete table issued");
    Ok(())
}

/// Unconditional upsert keyed by the item's key attributes.
pub async fn put_item<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
    item: Item,
) -> AwsSampleResult<PutOutcome> {
    let previous = logged(
        backend.put_item(table_name, item).await,
        "put_item",
        table_name,
    )?;
    Ok(PutOutcome { previous })
}

/// One item of the fixed demonstration set.
#[must_use]
pub fn demo_user(index: usize) -> Item {
    let mut item = Item::new();
    item.insert("accountType".into(), json!("anonymous"));
    item.insert("userId".into(), json!(format!("user{index}")));
    item.insert("firstName".into(), json!("unknown"));
    item.insert("lastName".into(), json!("unknown"));
    item
}

/// Writes the 50-item demonstration set through a [`BatchWriter`].
pub async fn batch_put_item<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
) -> AwsSampleResult<usize> {
    let result = async {
        let mut writer =
            BatchWriter::new(backend, table_name).overwrite_by_keys(vec!["userId".to_string()]);
        for i in 0..DEMO_BATCH_SIZE {
            writer.put_item(demo_user(i)).await?;
        }
        writer.close().await
    }
    .await;

    let written = logged(result, "batch_put_item", table_name)?;
    info!(table = %table_name, written, "Batch put finished");
    Ok(written)
}

/// Point read by exact key; a missing item is `Ok(None)`.
pub async fn get_item<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
    key: Key,
) -> AwsSampleResult<Option<Item>> {
    logged(
        backend.get_item(table_name, key).await,
        "get_item",
        table_name,
    )
}

/// First page of an unfiltered scan. Use [`scan_pages`] to walk the whole table.
pub async fn scan<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
) -> AwsSampleResult<ScanPage> {
    logged(
        backend.scan_page(table_name, None).await,
        "scan",
        table_name,
    )
}

#[must_use]
pub fn scan_pages<'a, B: TableBackend + ?Sized>(
    backend: &'a B,
    table_name: &str,
) -> ScanPager<'a, B> {
    ScanPager::new(backend, table_name)
}

/// Every item in the table, following pagination to the end.
pub async fn scan_all<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
) -> AwsSampleResult<Vec<Item>> {
    logged(
        scan_pages(backend, table_name).collect_items().await,
        "scan_all",
        table_name,
    )
}

/// Equality query on one key attribute.
pub async fn get_item_by_query<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
    key_attribute: &str,
    value: Value,
) -> AwsSampleResult<Vec<Item>> {
    logged(
        backend.query_eq(table_name, key_attribute, value).await,
        "query",
        table_name,
    )
}

/// Applies `update_expression` with `values`; there is no concurrency check.
pub async fn update_item<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
    key: Key,
    update_expression: &str,
    values: Item,
) -> AwsSampleResult<Option<Item>> {
    logged(
        backend
            .update_item(table_name, key, update_expression, values)
            .await,
        "update_item",
        table_name,
    )
}

pub async fn delete_item<B: TableBackend + ?Sized>(
    backend: &B,
    table_name: &str,
    key: Key,
) -> AwsSampleResult<Option<Item>> {
    logged(
        backend.delete_item(table_name, key).await,
        "delete_item",
        table_name,
    )
}
