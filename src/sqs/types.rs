use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Attribute holding the queue ARN in the provider's attribute map.
pub const QUEUE_ARN_ATTRIBUTE: &str = "QueueArn";

/// Message attribute carrying the optional author name.
pub const AUTHOR_ATTRIBUTE: &str = "Author";

/// A resolved queue: name, URL and its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueHandle {
    pub name: String,
    pub url: String,
    pub attributes: HashMap<String, String>,
}

impl QueueHandle {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Last `:`-separated segment of the queue ARN.
    #[must_use]
    pub fn arn_name(&self) -> Option<&str> {
        self.attribute(QUEUE_ARN_ATTRIBUTE)
            .and_then(|arn| arn.rsplit(':').next())
    }
}

/// Derives the queue name from its URL (the final path segment).
#[must_use]
pub fn queue_name_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageAttribute {
    pub data_type: String,
    pub string_value: String,
}

impl MessageAttribute {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: "String".to_string(),
            string_value: value.into(),
        }
    }

    pub fn number(value: impl ToString) -> Self {
        Self {
            data_type: "Number".to_string(),
            string_value: value.to_string(),
        }
    }
}

pub type MessageAttributes = HashMap<String, MessageAttribute>;

/// One entry of a batch send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub id: String,
    pub body: String,
    pub attributes: Option<MessageAttributes>,
}

impl BatchEntry {
    /// Entry with a generated id.
    pub fn new(body: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), body)
    }

    pub fn with_id(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            attributes: None,
        }
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: MessageAttribute) -> Self {
        self.attributes
            .get_or_insert_with(HashMap::new)
            .insert(name.into(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Option<String>,
    pub md5_of_body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSuccess {
    pub id: String,
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub id: String,
    pub code: String,
    pub message: Option<String>,
    pub sender_fault: bool,
}

/// Per-entry outcome of a batch send; failed entries are left for the caller to re-submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSendResult {
    pub successful: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
}

impl BatchSendResult {
    #[must_use]
    pub fn total(&self) -> usize {
        self.successful.len() + self.failed.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: Option<String>,
    pub body: String,
    pub receipt_handle: String,
    pub attributes: MessageAttributes,
}

impl ReceivedMessage {
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.attributes
            .get(AUTHOR_ATTRIBUTE)
            .map(|a| a.string_value.as_str())
            .filter(|s| !s.is_empty())
    }

    /// `(author)` when the message names one, empty otherwise.
    #[must_use]
    pub fn author_text(&self) -> String {
        self.author().map(|a| format!("({a})")).unwrap_or_default()
    }
}
