//! Provider seam for table operations and its DynamoDB implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::{self as ddb, AttributeValue, ReturnValue};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;

use super::types::{
    Item, Key, KeyRole, ScalarType, ScanPage, TableDescription, TableSpec, TableStatus,
};
use crate::errors::AwsSampleResult;

type AttributeMap = HashMap<String, AttributeValue>;

/// The raw table calls a provider has to offer.
#[async_trait]
pub trait TableBackend: Send + Sync {
    async fn create_table(&self, spec: &TableSpec) -> AwsSampleResult<TableDescription>;

    async fn describe_table(&self, table_name: &str) -> AwsSampleResult<TableDescription>;

    async fn delete_table(&self, table_name: &str) -> AwsSampleResult<()>;

    /// Returns the replaced item, if any.
    async fn put_item(&self, table_name: &str, item: Item) -> AwsSampleResult<Option<Item>>;

    async fn get_item(&self, table_name: &str, key: Key) -> AwsSampleResult<Option<Item>>;

    /// Returns the removed item, if any.
    async fn delete_item(&self, table_name: &str, key: Key) -> AwsSampleResult<Option<Item>>;

    async fn scan_page(
        &self,
        table_name: &str,
        exclusive_start_key: Option<Key>,
    ) -> AwsSampleResult<ScanPage>;

    async fn query_eq(
        &self,
        table_name: &str,
        attribute: &str,
        value: Value,
    ) -> AwsSampleResult<Vec<Item>>;

    /// Returns the attributes the update wrote.
    async fn update_item(
        &self,
        table_name: &str,
        key: Key,
        update_expression: &str,
        values: Item,
    ) -> AwsSampleResult<Option<Item>>;

    /// Writes up to 25 items in one request and returns the ones the provider did not process.
    async fn batch_write(&self, table_name: &str, items: Vec<Item>) -> AwsSampleResult<Vec<Item>>;
}

/// [`TableBackend`] over the AWS SDK DynamoDB client.
#[derive(Clone)]
pub struct DynamoTableBackend {
    client: Arc<DynamoDbClient>,
}

impl DynamoTableBackend {
    #[must_use]
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Arc::new(DynamoDbClient::new(sdk_config)),
        }
    }

    #[must_use]
    pub const fn from_client(client: Arc<DynamoDbClient>) -> Self {
        Self { client }
    }
}

/// JSON has no byte type, so binary attributes travel as `{"B": "<base64>"}` and
/// binary sets as `{"BS": ["<base64>", ..]}`, the tags DynamoDB JSON uses.
const BINARY_TAG: &str = "B";
const BINARY_SET_TAG: &str = "BS";

fn binary_to_tagged(value: AttributeValue) -> AttributeValue {
    match value {
        AttributeValue::B(blob) => AttributeValue::M(HashMap::from([(
            BINARY_TAG.to_string(),
            AttributeValue::S(BASE64.encode(blob.into_inner())),
        )])),
        AttributeValue::Bs(blobs) => AttributeValue::M(HashMap::from([(
            BINARY_SET_TAG.to_string(),
            AttributeValue::Ss(blobs.iter().map(|b| BASE64.encode(b)).collect()),
        )])),
        AttributeValue::L(list) => {
            AttributeValue::L(list.into_iter().map(binary_to_tagged).collect())
        }
        AttributeValue::M(map) => AttributeValue::M(
            map.into_iter()
                .map(|(k, v)| (k, binary_to_tagged(v)))
                .collect(),
        ),
        other => other,
    }
}

fn decode_binary(value: &AttributeValue) -> Option<Blob> {
    match value {
        AttributeValue::S(encoded) => BASE64.decode(encoded).ok().map(Blob::new),
        _ => None,
    }
}

fn decode_binary_set(value: &AttributeValue) -> Option<Vec<Blob>> {
    match value {
        AttributeValue::L(list) if !list.is_empty() => list.iter().map(decode_binary).collect(),
        AttributeValue::Ss(list) => list
            .iter()
            .map(|s| BASE64.decode(s).ok().map(Blob::new))
            .collect(),
        _ => None,
    }
}

/// Inverse of [`binary_to_tagged`]. A single-key map whose payload does not decode is
/// left as an ordinary map.
fn tagged_to_binary(value: AttributeValue) -> AttributeValue {
    match value {
        AttributeValue::M(map) => {
            if map.len() == 1 {
                if let Some(blob) = map.get(BINARY_TAG).and_then(decode_binary) {
                    return AttributeValue::B(blob);
                }
                if let Some(blobs) = map.get(BINARY_SET_TAG).and_then(decode_binary_set) {
                    return AttributeValue::Bs(blobs);
                }
            }
            AttributeValue::M(
                map.into_iter()
                    .map(|(k, v)| (k, tagged_to_binary(v)))
                    .collect(),
            )
        }
        AttributeValue::L(list) => {
            AttributeValue::L(list.into_iter().map(tagged_to_binary).collect())
        }
        other => other,
    }
}

fn to_attribute_map(item: Item) -> AwsSampleResult<AttributeMap> {
    let map: AttributeMap = serde_dynamo::to_item(Value::Object(item))?;
    Ok(map
        .into_iter()
        .map(|(k, v)| (k, tagged_to_binary(v)))
        .collect())
}

fn from_attribute_map(map: &AttributeMap) -> AwsSampleResult<Item> {
    let tagged: AttributeMap = map
        .iter()
        .map(|(k, v)| (k.clone(), binary_to_tagged(v.clone())))
        .collect();
    Ok(serde_dynamo::from_item(tagged)?)
}

fn to_attribute_value(value: Value) -> AwsSampleResult<AttributeValue> {
    let value: AttributeValue = serde_dynamo::to_attribute_value(value)?;
    Ok(tagged_to_binary(value))
}

fn describe(table: Option<&ddb::TableDescription>, fallback_name: &str) -> TableDescription {
    TableDescription {
        table_name: table
            .and_then(|t| t.table_name())
            .unwrap_or(fallback_name)
            .to_string(),
        status: table
            .and_then(|t| t.table_status())
            .map_or(TableStatus::Other("UNKNOWN".to_string()), |s| {
                TableStatus::from_provider(s.as_str())
            }),
        item_count: table.and_then(ddb::TableDescription::item_count),
    }
}

impl From<ScalarType> for ddb::ScalarAttributeType {
    fn from(value: ScalarType) -> Self {
        match value {
            ScalarType::String => ddb::ScalarAttributeType::S,
            ScalarType::Number => ddb::ScalarAttributeType::N,
            ScalarType::Binary => ddb::ScalarAttributeType::B,
        }
    }
}

impl From<KeyRole> for ddb::KeyType {
    fn from(value: KeyRole) -> Self {
        match value {
            KeyRole::Hash => ddb::KeyType::Hash,
            KeyRole::Range => ddb::KeyType::Range,
        }
    }
}

#[async_trait]
impl TableBackend for DynamoTableBackend {
    async fn create_table(&self, spec: &TableSpec) -> AwsSampleResult<TableDescription> {
        let key_schema = spec
            .key_schema
            .iter()
            .map(|k| {
                ddb::KeySchemaElement::builder()
                    .attribute_name(&k.attribute_name)
                    .key_type(k.key_type.into())
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let attribute_definitions = spec
            .attribute_definitions
            .iter()
            .map(|d| {
                ddb::AttributeDefinition::builder()
                    .attribute_name(&d.attribute_name)
                    .attribute_type(d.attribute_type.into())
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let throughput = ddb::ProvisionedThroughput::builder()
            .read_capacity_units(spec.throughput.read_capacity_units)
            .write_capacity_units(spec.throughput.write_capacity_units)
            .build()?;

        let output = self
            .client
            .create_table()
            .table_name(&spec.table_name)
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(attribute_definitions))
            .provisioned_throughput(throughput)
            .send()
            .await?;

        Ok(describe(output.table_description(), &spec.table_name))
    }

    async fn describe_table(&self, table_name: &str) -> AwsSampleResult<TableDescription> {
        let output = self
            .client
            .describe_table()
            .table_name(table_name)
            .send()
            .await?;

        Ok(describe(output.table(), table_name))
    }

    async fn delete_table(&self, table_name: &str) -> AwsSampleResult<()> {
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await?;
        Ok(())
    }

    async fn put_item(&self, table_name: &str, item: Item) -> AwsSampleResult<Option<Item>> {
        let output = self
            .client
            .put_item()
            .table_name(table_name)
            .set_item(Some(to_attribute_map(item)?))
            .return_values(ReturnValue::AllOld)
            .send()
            .await?;

        output.attributes().map(from_attribute_map).transpose()
    }

    async fn get_item(&self, table_name: &str, key: Key) -> AwsSampleResult<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(table_name)
            .set_key(Some(to_attribute_map(key)?))
            .send()
            .await?;

        output.item().map(from_attribute_map).transpose()
    }

    async fn delete_item(&self, table_name: &str, key: Key) -> AwsSampleResult<Option<Item>> {
        let output = self
            .client
            .delete_item()
            .table_name(table_name)
            .set_key(Some(to_attribute_map(key)?))
            .return_values(ReturnValue::AllOld)
            .send()
            .await?;

        output.attributes().map(from_attribute_map).transpose()
    }

    async fn scan_page(
        &self,
        table_name: &str,
        exclusive_start_key: Option<Key>,
    ) -> AwsSampleResult<ScanPage> {
        let start_key = exclusive_start_key.map(to_attribute_map).transpose()?;

        let output = self
            .client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(start_key)
            .send()
            .await?;

        Ok(ScanPage {
            items: output
                .items()
                .iter()
                .map(from_attribute_map)
                .collect::<AwsSampleResult<Vec<_>>>()?,
            last_evaluated_key: output
                .last_evaluated_key()
                .map(from_attribute_map)
                .transpose()?,
        })
    }

    async fn query_eq(
        &self,
        table_name: &str,
        attribute: &str,
        value: Value,
    ) -> AwsSampleResult<Vec<Item>> {
        let value = to_attribute_value(value)?;

        let output = self
            .client
            .query()
            .table_name(table_name)
            .key_condition_expression("#k = :v")
            .expression_attribute_names("#k", attribute)
            .expression_attribute_values(":v", value)
            .send()
            .await?;

        output.items().iter().map(from_attribute_map).collect()
    }

    async fn update_item(
        &self,
        table_name: &str,
        key: Key,
        update_expression: &str,
        values: Item,
    ) -> AwsSampleResult<Option<Item>> {
        let values = if values.is_empty() {
            None
        } else {
            Some(to_attribute_map(values)?)
        };

        let output = self
            .client
            .update_item()
            .table_name(table_name)
            .set_key(Some(to_attribute_map(key)?))
            .update_expression(update_expression)
            .set_expression_attribute_values(values)
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await?;

        output.attributes().map(from_attribute_map).transpose()
    }

    async fn batch_write(&self, table_name: &str, items: Vec<Item>) -> AwsSampleResult<Vec<Item>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let requests = items
            .into_iter()
            .map(|item| -> AwsSampleResult<ddb::WriteRequest> {
                let put = ddb::PutRequest::builder()
                    .set_item(Some(to_attribute_map(item)?))
                    .build()?;
                Ok(ddb::WriteRequest::builder().put_request(put).build())
            })
            .collect::<AwsSampleResult<Vec<_>>>()?;

        let output = self
            .client
            .batch_write_item()
            .request_items(table_name, requests)
            .send()
            .await?;

        let Some(unprocessed) = output
            .unprocessed_items()
            .and_then(|tables| tables.get(table_name))
        else {
            return Ok(Vec::new());
        };

        unprocessed
            .iter()
            .filter_map(ddb::WriteRequest::put_request)
            .map(|put| from_attribute_map(put.item()))
            .collect()
    }
}
