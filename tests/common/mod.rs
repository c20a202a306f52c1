//! In-memory backends that record every provider call.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use aws_samples::dynamodb::{
    Item, Key, ScanPage, TableBackend, TableDescription, TableSpec, TableStatus,
};
use aws_samples::errors::{AwsSampleError, AwsSampleResult};
use aws_samples::s3::{BucketLocation, BucketSummary, ObjectStore};
use aws_samples::sqs::{
    BatchEntry, BatchFailure, BatchSendResult, BatchSuccess, MessageAttributes, QueueService,
    ReceivedMessage, SendReceipt,
};
use serde_json::Value;

pub fn item(value: Value) -> Item {
    value.as_object().cloned().expect("test item must be an object")
}

// ============================================================================
// Tables
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum TableCall {
    CreateTable(String),
    DescribeTable(String),
    DeleteTable(String),
    PutItem { table: String, item: Item },
    GetItem { table: String, key: Key },
    DeleteItem { table: String, key: Key },
    ScanPage { table: String, start: Option<Key> },
    QueryEq { table: String, attribute: String, value: Value },
    UpdateItem { table: String, key: Key, expression: String, values: Item },
    BatchWrite { table: String, items: Vec<Item> },
}

struct FakeTable {
    key_attributes: Vec<String>,
    items: BTreeMap<String, Item>,
    describes_until_active: usize,
}

impl FakeTable {
    fn key_of(&self, item: &Item) -> AwsSampleResult<(String, Key)> {
        let mut key = Key::new();
        for name in &self.key_attributes {
            let value = item.get(name).ok_or_else(|| {
                AwsSampleError::AwsError(format!("ValidationException: missing key {name}"))
            })?;
            key.insert(name.clone(), value.clone());
        }
        Ok((Value::Object(key.clone()).to_string(), key))
    }
}

#[derive(Default)]
pub struct FakeTables {
    tables: Mutex<HashMap<String, FakeTable>>,
    calls: Mutex<Vec<TableCall>>,
    page_size: Mutex<Option<usize>>,
    unprocessed_next_batch: Mutex<usize>,
    describes_until_active: Mutex<usize>,
    fail_all: Mutex<Option<String>>,
}

impl FakeTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake with an existing table keyed on `key_attributes`.
    pub fn with_table(table_name: &str, key_attributes: &[&str]) -> Self {
        let fake = Self::new();
        fake.tables.lock().unwrap().insert(
            table_name.to_string(),
            FakeTable {
                key_attributes: key_attributes.iter().map(ToString::to_string).collect(),
                items: BTreeMap::new(),
                describes_until_active: 0,
            },
        );
        fake
    }

    pub fn set_page_size(&self, size: usize) {
        *self.page_size.lock().unwrap() = Some(size);
    }

    /// The next batch write reports its last `count` items as unprocessed.
    pub fn leave_unprocessed_next_batch(&self, count: usize) {
        *self.unprocessed_next_batch.lock().unwrap() = count;
    }

    /// Newly created tables report `CREATING` for this many describes.
    pub fn set_describes_until_active(&self, count: usize) {
        *self.describes_until_active.lock().unwrap() = count;
    }

    pub fn fail_all(&self, message: &str) {
        *self.fail_all.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<TableCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn item_count(&self, table_name: &str) -> usize {
        self.tables
            .lock()
            .unwrap()
            .get(table_name)
            .map_or(0, |t| t.items.len())
    }

    pub fn has_table(&self, table_name: &str) -> bool {
        self.tables.lock().unwrap().contains_key(table_name)
    }

    fn record(&self, call: TableCall) -> AwsSampleResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.fail_all.lock().unwrap().as_ref() {
            Some(message) => Err(AwsSampleError::AwsError(message.clone())),
            None => Ok(()),
        }
    }

    fn with_table_mut<T>(
        &self,
        table_name: &str,
        f: impl FnOnce(&mut FakeTable) -> AwsSampleResult<T>,
    ) -> AwsSampleResult<T> {
        let mut tables = self.tables.lock().unwrap();
        let table = tables.get_mut(table_name).ok_or_else(|| {
            AwsSampleError::AwsError(format!(
                "ResourceNotFoundException: table {table_name} not found"
            ))
        })?;
        f(table)
    }
}

fn apply_set_expression(target: &mut Item, expression: &str, values: &Item) -> AwsSampleResult<Item> {
    let assignments = expression
        .trim()
        .strip_prefix("SET ")
        .ok_or_else(|| AwsSampleError::AwsError("ValidationException: only SET supported".into()))?;

    let mut updated = Item::new();
    for assignment in assignments.split(',') {
        let (name, placeholder) = assignment
            .split_once('=')
            .ok_or_else(|| AwsSampleError::AwsError("ValidationException: bad SET".into()))?;
        let value = values.get(placeholder.trim()).ok_or_else(|| {
            AwsSampleError::AwsError(format!("ValidationException: {} undefined", placeholder.trim()))
        })?;
        target.insert(name.trim().to_string(), value.clone());
        updated.insert(name.trim().to_string(), value.clone());
    }
    Ok(updated)
}

#[async_trait]
impl TableBackend for FakeTables {
    async fn create_table(&self, spec: &TableSpec) -> AwsSampleResult<TableDescription> {
        self.record(TableCall::CreateTable(spec.table_name.clone()))?;
        let describes_until_active = *self.describes_until_active.lock().unwrap();
        let mut tables = self.tables.lock().unwrap();
        if tables.contains_key(&spec.table_name) {
            return Err(AwsSampleError::AwsError(
                "ResourceInUseException: table already exists".into(),
            ));
        }
        tables.insert(
            spec.table_name.clone(),
            FakeTable {
                key_attributes: spec.key_attribute_names(),
                items: BTreeMap::new(),
                describes_until_active,
            },
        );
        Ok(TableDescription {
            table_name: spec.table_name.clone(),
            status: TableStatus::Creating,
            item_count: Some(0),
        })
    }

    async fn describe_table(&self, table_name: &str) -> AwsSampleResult<TableDescription> {
        self.record(TableCall::DescribeTable(table_name.to_string()))?;
        self.with_table_mut(table_name, |table| {
            let status = if table.describes_until_active == 0 {
                TableStatus::Active
            } else {
                table.describes_until_active -= 1;
                TableStatus::Creating
            };
            Ok(TableDescription {
                table_name: table_name.to_string(),
                status,
                item_count: Some(table.items.len() as i64),
            })
        })
    }

    async fn delete_table(&self, table_name: &str) -> AwsSampleResult<()> {
        self.record(TableCall::DeleteTable(table_name.to_string()))?;
        self.tables
            .lock()
            .unwrap()
            .remove(table_name)
            .map(|_| ())
            .ok_or_else(|| AwsSampleError::AwsError("ResourceNotFoundException".into()))
    }

    async fn put_item(&self, table_name: &str, item: Item) -> AwsSampleResult<Option<Item>> {
        self.record(TableCall::PutItem {
            table: table_name.to_string(),
            item: item.clone(),
        })?;
        self.with_table_mut(table_name, |table| {
            let (id, _) = table.key_of(&item)?;
            Ok(table.items.insert(id, item))
        })
    }

    async fn get_item(&self, table_name: &str, key: Key) -> AwsSampleResult<Option<Item>> {
        self.record(TableCall::GetItem {
            table: table_name.to_string(),
            key: key.clone(),
        })?;
        self.with_table_mut(table_name, |table| {
            let (id, _) = table.key_of(&key)?;
            Ok(table.items.get(&id).cloned())
        })
    }

    async fn delete_item(&self, table_name: &str, key: Key) -> AwsSampleResult<Option<Item>> {
        self.record(TableCall::DeleteItem {
            table: table_name.to_string(),
            key: key.clone(),
        })?;
        self.with_table_mut(table_name, |table| {
            let (id, _) = table.key_of(&key)?;
            Ok(table.items.remove(&id))
        })
    }

    async fn scan_page(
        &self,
        table_name: &str,
        exclusive_start_key: Option<Key>,
    ) -> AwsSampleResult<ScanPage> {
        self.record(TableCall::ScanPage {
            table: table_name.to_string(),
            start: exclusive_start_key.clone(),
        })?;
        let page_size = self.page_size.lock().unwrap().unwrap_or(usize::MAX);
        self.with_table_mut(table_name, |table| {
            let after = exclusive_start_key
                .map(|k| table.key_of(&k).map(|(id, _)| id))
                .transpose()?;
            let remaining: Vec<(&String, &Item)> = table
                .items
                .iter()
                .filter(|(id, _)| after.as_ref().is_none_or(|a| *id > a))
                .collect();

            let items: Vec<Item> = remaining
                .iter()
                .take(page_size)
                .map(|(_, item)| (*item).clone())
                .collect();
            let last_evaluated_key = if remaining.len() > items.len() {
                items.last().map(|i| table.key_of(i)).transpose()?.map(|(_, k)| k)
            } else {
                None
            };
            Ok(ScanPage {
                items,
                last_evaluated_key,
            })
        })
    }

    async fn query_eq(
        &self,
        table_name: &str,
        attribute: &str,
        value: Value,
    ) -> AwsSampleResult<Vec<Item>> {
        self.record(TableCall::QueryEq {
            table: table_name.to_string(),
            attribute: attribute.to_string(),
            value: value.clone(),
        })?;
        self.with_table_mut(table_name, |table| {
            Ok(table
                .items
                .values()
                .filter(|item| item.get(attribute) == Some(&value))
                .cloned()
                .collect())
        })
    }

    async fn update_item(
        &self,
        table_name: &str,
        key: Key,
        update_expression: &str,
        values: Item,
    ) -> AwsSampleResult<Option<Item>> {
        self.record(TableCall::UpdateItem {
            table: table_name.to_string(),
            key: key.clone(),
            expression: update_expression.to_string(),
            values: values.clone(),
        })?;
        self.with_table_mut(table_name, |table| {
            let (id, key) = table.key_of(&key)?;
            let target = table.items.entry(id).or_insert(key);
            let updated = apply_set_expression(target, update_expression, &values)?;
            Ok(Some(updated))
        })
    }

    async fn batch_write(&self, table_name: &str, items: Vec<Item>) -> AwsSampleResult<Vec<Item>> {
        self.record(TableCall::BatchWrite {
            table: table_name.to_string(),
            items: items.clone(),
        })?;
        let unprocessed_count = std::mem::take(&mut *self.unprocessed_next_batch.lock().unwrap());
        let split = items.len().saturating_sub(unprocessed_count);
        let mut items = items;
        let unprocessed = items.split_off(split);

        self.with_table_mut(table_name, |table| {
            for item in items {
                let (id, _) = table.key_of(&item)?;
                table.items.insert(id, item);
            }
            Ok(())
        })?;
        Ok(unprocessed)
    }
}

// ============================================================================
// Object store
// ============================================================================

#[derive(Default)]
pub struct FakeObjectStore {
    buckets: Mutex<BTreeMap<String, (String, HashMap<String, Vec<u8>>)>>,
    fail_create: Mutex<bool>,
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(&self) {
        *self.fail_create.lock().unwrap() = true;
    }

    pub fn bucket_region(&self, bucket: &str) -> Option<String> {
        self.buckets.lock().unwrap().get(bucket).map(|(r, _)| r.clone())
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|(_, objects)| objects.get(key).cloned())
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn create_bucket(&self, bucket: &str, region: &str) -> AwsSampleResult<BucketLocation> {
        if *self.fail_create.lock().unwrap() {
            return Err(AwsSampleError::AwsError("AccessDenied".into()));
        }
        let mut buckets = self.buckets.lock().unwrap();
        if buckets.contains_key(bucket) {
            return Err(AwsSampleError::AwsError("BucketAlreadyOwnedByYou".into()));
        }
        buckets.insert(bucket.to_string(), (region.to_string(), HashMap::new()));
        Ok(BucketLocation {
            bucket: bucket.to_string(),
            location: Some(format!("http://{bucket}.s3.amazonaws.com/")),
        })
    }

    async fn list_buckets(&self) -> AwsSampleResult<Vec<BucketSummary>> {
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .keys()
            .map(|name| BucketSummary {
                name: name.clone(),
                creation_date: None,
            })
            .collect())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> AwsSampleResult<()> {
        let mut buckets = self.buckets.lock().unwrap();
        let (_, objects) = buckets
            .get_mut(bucket)
            .ok_or_else(|| AwsSampleError::AwsError("NoSuchBucket".into()))?;
        objects.insert(key.to_string(), body);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> AwsSampleResult<Vec<u8>> {
        self.object(bucket, key)
            .ok_or_else(|| AwsSampleError::AwsError("NoSuchKey".into()))
    }
}

// ============================================================================
// Queues
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    SendMessage { url: String, body: String },
    SendBatch { url: String, ids: Vec<String> },
    Receive { url: String, max: i32 },
    DeleteMessage { url: String, receipt_handle: String },
    DeleteQueue(String),
}

#[derive(Default)]
pub struct FakeQueues {
    queues: Mutex<BTreeMap<String, Vec<ReceivedMessage>>>,
    calls: Mutex<Vec<QueueCall>>,
    failing_ids: Mutex<Vec<String>>,
    next_id: Mutex<u64>,
}

impl FakeQueues {
    pub const ACCOUNT_URL: &'static str = "http://localhost:4566/000000000000";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn url_for(name: &str) -> String {
        format!("{}/{name}", Self::ACCOUNT_URL)
    }

    /// Batch entries with this id are reported as failed.
    pub fn fail_entry(&self, id: &str) {
        self.failing_ids.lock().unwrap().push(id.to_string());
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn depth(&self, name: &str) -> usize {
        self.queues
            .lock()
            .unwrap()
            .get(&Self::url_for(name))
            .map_or(0, Vec::len)
    }

    fn next_message_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("msg-{next}")
    }

    fn enqueue(
        &self,
        url: &str,
        body: &str,
        attributes: Option<MessageAttributes>,
    ) -> AwsSampleResult<String> {
        let message_id = self.next_message_id();
        let mut queues = self.queues.lock().unwrap();
        let queue = queues
            .get_mut(url)
            .ok_or_else(|| AwsSampleError::AwsError("AWS.SimpleQueueService.NonExistentQueue".into()))?;
        queue.push(ReceivedMessage {
            message_id: Some(message_id.clone()),
            body: body.to_string(),
            receipt_handle: format!("receipt-{message_id}"),
            attributes: attributes.unwrap_or_default(),
        });
        Ok(message_id)
    }
}

#[async_trait]
impl QueueService for FakeQueues {
    async fn create_queue(&self, name: &str) -> AwsSampleResult<String> {
        let url = Self::url_for(name);
        self.queues.lock().unwrap().entry(url.clone()).or_default();
        Ok(url)
    }

    async fn get_queue_url(&self, name: &str) -> AwsSampleResult<String> {
        let url = Self::url_for(name);
        if self.queues.lock().unwrap().contains_key(&url) {
            Ok(url)
        } else {
            Err(AwsSampleError::AwsError(
                "AWS.SimpleQueueService.NonExistentQueue".into(),
            ))
        }
    }

    async fn queue_attributes(&self, queue_url: &str) -> AwsSampleResult<HashMap<String, String>> {
        let name = queue_url.rsplit('/').next().unwrap_or_default();
        Ok(HashMap::from([
            (
                "QueueArn".to_string(),
                format!("arn:aws:sqs:ap-northeast-1:000000000000:{name}"),
            ),
            ("DelaySeconds".to_string(), "0".to_string()),
        ]))
    }

    async fn list_queue_urls(&self) -> AwsSampleResult<Vec<String>> {
        Ok(self.queues.lock().unwrap().keys().cloned().collect())
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        attributes: Option<MessageAttributes>,
    ) -> AwsSampleResult<SendReceipt> {
        self.calls.lock().unwrap().push(QueueCall::SendMessage {
            url: queue_url.to_string(),
            body: body.to_string(),
        });
        let message_id = self.enqueue(queue_url, body, attributes)?;
        Ok(SendReceipt {
            message_id: Some(message_id),
            md5_of_body: Some(format!("md5-{}", body.len())),
        })
    }

    async fn send_message_batch(
        &self,
        queue_url: &str,
        entries: Vec<BatchEntry>,
    ) -> AwsSampleResult<BatchSendResult> {
        self.calls.lock().unwrap().push(QueueCall::SendBatch {
            url: queue_url.to_string(),
            ids: entries.iter().map(|e| e.id.clone()).collect(),
        });
        let failing = self.failing_ids.lock().unwrap().clone();

        let mut result = BatchSendResult::default();
        for entry in entries {
            if failing.contains(&entry.id) {
                result.failed.push(BatchFailure {
                    id: entry.id,
                    code: "InternalError".into(),
                    message: Some("try again".into()),
                    sender_fault: false,
                });
                continue;
            }
            let message_id = self.enqueue(queue_url, &entry.body, entry.attributes)?;
            result.successful.push(BatchSuccess {
                id: entry.id,
                message_id,
            });
        }
        Ok(result)
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
    ) -> AwsSampleResult<Vec<ReceivedMessage>> {
        self.calls.lock().unwrap().push(QueueCall::Receive {
            url: queue_url.to_string(),
            max: max_messages,
        });
        let queues = self.queues.lock().unwrap();
        let queue = queues
            .get(queue_url)
            .ok_or_else(|| AwsSampleError::AwsError("AWS.SimpleQueueService.NonExistentQueue".into()))?;
        let max = usize::try_from(max_messages).unwrap_or(0);
        Ok(queue.iter().take(max).cloned().collect())
    }

    async fn delete_message(&self, queue_url: &str, receipt_handle: &str) -> AwsSampleResult<()> {
        self.calls.lock().unwrap().push(QueueCall::DeleteMessage {
            url: queue_url.to_string(),
            receipt_handle: receipt_handle.to_string(),
        });
        let mut queues = self.queues.lock().unwrap();
        if let Some(queue) = queues.get_mut(queue_url) {
            queue.retain(|m| m.receipt_handle != receipt_handle);
        }
        Ok(())
    }

    async fn delete_queue(&self, queue_url: &str) -> AwsSampleResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(QueueCall::DeleteQueue(queue_url.to_string()));
        self.queues
            .lock()
            .unwrap()
            .remove(queue_url)
            .map(|_| ())
            .ok_or_else(|| AwsSampleError::AwsError("AWS.SimpleQueueService.NonExistentQueue".into()))
    }
}
