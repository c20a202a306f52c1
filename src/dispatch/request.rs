//! Typed requests for the dispatch function.
//!
//! The incoming event names an operation, a table and a payload. Instead of passing the
//! payload through as loose arguments, each operation has its own variant with the fields
//! the table call needs, so a malformed payload is rejected before any provider call.
//! Fields no variant models (conditions, filters, projections) are rejected rather than
//! dropped, so a conditional write never runs unconditionally.

use std::str::FromStr;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum::{Display, EnumString};

use crate::dynamodb::{Item, Key};
use crate::errors::{AwsSampleError, AwsSampleResult};

/// Literal returned by the `ping` operation.
pub const PING_RESPONSE: &str = "pinggggggggg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OperationName {
    Create,
    Read,
    Update,
    Delete,
    List,
    Echo,
    Ping,
}

impl OperationName {
    pub const ALL: [OperationName; 7] = [
        OperationName::Create,
        OperationName::Read,
        OperationName::Update,
        OperationName::Delete,
        OperationName::List,
        OperationName::Echo,
        OperationName::Ping,
    ];

    #[must_use]
    pub const fn needs_table(self) -> bool {
        !matches!(self, OperationName::Echo | OperationName::Ping)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchRequest {
    Create {
        table_name: String,
        item: Item,
    },
    Read {
        table_name: String,
        key: Key,
    },
    Update {
        table_name: String,
        key: Key,
        update_expression: String,
        expression_attribute_values: Item,
    },
    Delete {
        table_name: String,
        key: Key,
    },
    List {
        table_name: String,
        exclusive_start_key: Option<Key>,
    },
    Echo(Value),
    Ping,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct ItemPayload {
    item: Item,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct KeyPayload {
    key: Key,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct UpdatePayload {
    key: Key,
    update_expression: String,
    #[serde(default)]
    expression_attribute_values: Item,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
struct ListPayload {
    #[serde(default)]
    exclusive_start_key: Option<Key>,
}

fn parse_payload<T: DeserializeOwned>(operation: OperationName, payload: Value) -> AwsSampleResult<T> {
    if payload.is_null() {
        return Err(AwsSampleError::invalid_payload(
            operation.to_string(),
            "payload is required",
        ));
    }
    serde_json::from_value(payload)
        .map_err(|e| AwsSampleError::invalid_payload(operation.to_string(), e))
}

fn non_empty_key(operation: OperationName, key: Key) -> AwsSampleResult<Key> {
    if key.is_empty() {
        return Err(AwsSampleError::invalid_payload(
            operation.to_string(),
            "Key must name at least one attribute",
        ));
    }
    Ok(key)
}

impl DispatchRequest {
    /// Parses a raw `{operation, tableName, payload}` event.
    ///
    /// # Errors
    ///
    /// `ParseError` when `operation` is absent or not a string, `UnrecognizedOperation`
    /// for names outside the fixed set, `MissingTableName` for table operations without
    /// `tableName`, and `InvalidPayload` when the payload lacks a required field.
    pub fn from_event(event: &Value) -> AwsSampleResult<Self> {
        let raw = event
            .get("operation")
            .ok_or_else(|| AwsSampleError::ParseError("event has no operation".to_string()))?
            .as_str()
            .ok_or_else(|| AwsSampleError::ParseError("operation must be a string".to_string()))?;

        let operation = OperationName::from_str(raw)
            .map_err(|_| AwsSampleError::UnrecognizedOperation(raw.to_string()))?;

        let payload = event.get("payload").cloned().unwrap_or(Value::Null);

        let table_name = || {
            event
                .get("tableName")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .ok_or_else(|| AwsSampleError::MissingTableName(operation.to_string()))
        };

        let request = match operation {
            OperationName::Echo => DispatchRequest::Echo(payload),
            OperationName::Ping => DispatchRequest::Ping,
            OperationName::Create => {
                let table_name = table_name()?;
                let p: ItemPayload = parse_payload(operation, payload)?;
                DispatchRequest::Create {
                    table_name,
                    item: p.item,
                }
            }
            OperationName::Read => {
                let table_name = table_name()?;
                let p: KeyPayload = parse_payload(operation, payload)?;
                DispatchRequest::Read {
                    table_name,
                    key: non_empty_key(operation, p.key)?,
                }
            }
            OperationName::Update => {
                let table_name = table_name()?;
                let p: UpdatePayload = parse_payload(operation, payload)?;
                if p.update_expression.trim().is_empty() {
                    return Err(AwsSampleError::invalid_payload(
                        operation.to_string(),
                        "UpdateExpression must not be empty",
                    ));
                }
                DispatchRequest::Update {
                    table_name,
                    key: non_empty_key(operation, p.key)?,
                    update_expression: p.update_expression,
                    expression_attribute_values: p.expression_attribute_values,
                }
            }
            OperationName::Delete => {
                let table_name = table_name()?;
                let p: KeyPayload = parse_payload(operation, payload)?;
                DispatchRequest::Delete {
                    table_name,
                    key: non_empty_key(operation, p.key)?,
                }
            }
            OperationName::List => {
                let table_name = table_name()?;
                // A scan needs no arguments, so the payload may be omitted
                let p: ListPayload = if payload.is_null() {
                    ListPayload::default()
                } else {
                    parse_payload(operation, payload)?
                };
                DispatchRequest::List {
                    table_name,
                    exclusive_start_key: p.exclusive_start_key,
                }
            }
        };

        Ok(request)
    }

    #[must_use]
    pub const fn operation(&self) -> OperationName {
        match self {
            DispatchRequest::Create { .. } => OperationName::Create,
            DispatchRequest::Read { .. } => OperationName::Read,
            DispatchRequest::Update { .. } => OperationName::Update,
            DispatchRequest::Delete { .. } => OperationName::Delete,
            DispatchRequest::List { .. } => OperationName::List,
            DispatchRequest::Echo(_) => OperationName::Echo,
            DispatchRequest::Ping => OperationName::Ping,
        }
    }

    #[must_use]
    pub fn table_name(&self) -> Option<&str> {
        match self {
            DispatchRequest::Create { table_name, .. }
            | DispatchRequest::Read { table_name, .. }
            | DispatchRequest::Update { table_name, .. }
            | DispatchRequest::Delete { table_name, .. }
            | DispatchRequest::List { table_name, .. } => Some(table_name),
            DispatchRequest::Echo(_) | DispatchRequest::Ping => None,
        }
    }
}
