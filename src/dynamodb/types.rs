use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AwsSampleError, AwsSampleResult};

/// A freeform item: attribute name to scalar or nested value.
pub type Item = serde_json::Map<String, Value>;

/// The key attributes of an item.
pub type Key = Item;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    #[serde(rename = "S")]
    String,
    #[serde(rename = "N")]
    Number,
    #[serde(rename = "B")]
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyRole {
    /// Partition key
    #[serde(rename = "HASH")]
    Hash,
    /// Sort key
    #[serde(rename = "RANGE")]
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaEntry {
    pub attribute_name: String,
    pub key_type: KeyRole,
}

impl KeySchemaEntry {
    pub fn hash(name: impl Into<String>) -> Self {
        Self {
            attribute_name: name.into(),
            key_type: KeyRole::Hash,
        }
    }

    pub fn range(name: impl Into<String>) -> Self {
        Self {
            attribute_name: name.into(),
            key_type: KeyRole::Range,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    pub attribute_name: String,
    pub attribute_type: ScalarType,
}

impl AttributeDefinition {
    pub fn new(name: impl Into<String>, attribute_type: ScalarType) -> Self {
        Self {
            attribute_name: name.into(),
            attribute_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisionedThroughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

/// Everything needed to create a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub table_name: String,
    pub key_schema: Vec<KeySchemaEntry>,
    pub attribute_definitions: Vec<AttributeDefinition>,
    pub throughput: ProvisionedThroughput,
}

impl TableSpec {
    /// Checks the key layout the provider would otherwise reject.
    ///
    /// # Errors
    ///
    /// Returns `GeneralError` when there is not exactly one partition key, more than one
    /// sort key, a key without an attribute definition, or a definition no key uses.
    pub fn validate(&self) -> AwsSampleResult<()> {
        let hash_count = self
            .key_schema
            .iter()
            .filter(|k| k.key_type == KeyRole::Hash)
            .count();
        if hash_count != 1 {
            return Err(AwsSampleError::GeneralError(format!(
                "table {} needs exactly one partition key, found {hash_count}",
                self.table_name
            )));
        }

        let range_count = self.key_schema.len() - hash_count;
        if range_count > 1 {
            return Err(AwsSampleError::GeneralError(format!(
                "table {} has {range_count} sort keys, at most one allowed",
                self.table_name
            )));
        }

        for key in &self.key_schema {
            if !self
                .attribute_definitions
                .iter()
                .any(|d| d.attribute_name == key.attribute_name)
            {
                return Err(AwsSampleError::GeneralError(format!(
                    "key attribute {} has no attribute definition",
                    key.attribute_name
                )));
            }
        }

        // Without secondary indexes every definition must belong to the key schema
        for definition in &self.attribute_definitions {
            if !self
                .key_schema
                .iter()
                .any(|k| k.attribute_name == definition.attribute_name)
            {
                return Err(AwsSampleError::GeneralError(format!(
                    "attribute definition {} is not part of the key schema",
                    definition.attribute_name
                )));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn key_attribute_names(&self) -> Vec<String> {
        self.key_schema
            .iter()
            .map(|k| k.attribute_name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    Other(String),
}

impl TableStatus {
    #[must_use]
    pub fn from_provider(status: &str) -> Self {
        match status {
            "CREATING" => TableStatus::Creating,
            "ACTIVE" => TableStatus::Active,
            "UPDATING" => TableStatus::Updating,
            "DELETING" => TableStatus::Deleting,
            other => TableStatus::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescription {
    pub table_name: String,
    pub status: TableStatus,
    pub item_count: Option<i64>,
}

/// One response page of a scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// Present when the provider has more results after this page.
    pub last_evaluated_key: Option<Key>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PutOutcome {
    /// The item that was replaced, if any.
    pub previous: Option<Item>,
}

/// Projects `item` onto `key_attributes`, failing if one is missing.
pub fn key_of(item: &Item, key_attributes: &[String]) -> AwsSampleResult<Key> {
    key_attributes
        .iter()
        .map(|name| {
            item.get(name)
                .map(|v| (name.clone(), v.clone()))
                .ok_or_else(|| {
                    AwsSampleError::GeneralError(format!("item is missing key attribute {name}"))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_spec() -> TableSpec {
        TableSpec {
            table_name: "Person".into(),
            key_schema: vec![KeySchemaEntry::hash("userId")],
            attribute_definitions: vec![AttributeDefinition::new("userId", ScalarType::String)],
            throughput: ProvisionedThroughput {
                read_capacity_units: 1,
                write_capacity_units: 1,
            },
        }
    }

    #[test]
    fn valid_spec_passes() {
        assert!(person_spec().validate().is_ok());
    }

    #[test]
    fn unused_definition_is_rejected() {
        let mut spec = person_spec();
        spec.attribute_definitions
            .push(AttributeDefinition::new("firstName", ScalarType::String));
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("firstName"));
    }

    #[test]
    fn missing_partition_key_is_rejected() {
        let mut spec = person_spec();
        spec.key_schema = vec![KeySchemaEntry::range("userId")];
        assert!(spec.validate().is_err());
    }

    #[test]
    fn schema_entries_use_provider_names() {
        let v = serde_json::to_value(KeySchemaEntry::hash("userId")).unwrap();
        assert_eq!(v, json!({"AttributeName": "userId", "KeyType": "HASH"}));
    }

    #[test]
    fn key_projection() {
        let item = json!({"userId": "u1", "age": 3}).as_object().cloned().unwrap();
        let key = key_of(&item, &["userId".to_string()]).unwrap();
        assert_eq!(Value::Object(key), json!({"userId": "u1"}));
        assert!(key_of(&item, &["lastName".to_string()]).is_err());
    }
}
