//! # Message Model
//!
//! Payloads exchanged with the message service. Absent fields are left out of
//! the JSON entirely so a request can deliberately omit a required field.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// A unit of work submitted to (or returned by) the message service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub important: Option<bool>,
}

impl Message {
    /// Full record as sent to the send endpoint. `id` may be `None` to build
    /// a request that is missing its required field.
    pub fn new(id: Option<i64>, text: impl Into<String>, important: bool) -> Self {
        Self {
            id,
            text: Some(text.into()),
            important: Some(important),
        }
    }

    /// Filter that only carries an id, used by the read endpoint.
    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Decode a JSON array of messages. Elements without an `id` keep it unset.
    pub fn list_from_json(body: &str) -> Result<Vec<Message>, HarnessError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Extract one scalar field as JSON, `None` when the field is absent.
    pub fn field(&self, field: MessageField) -> Option<serde_json::Value> {
        match field {
            MessageField::Id => self.id.map(serde_json::Value::from),
            MessageField::Text => self.text.clone().map(serde_json::Value::from),
            MessageField::Important => self.important.map(serde_json::Value::from),
        }
    }
}

/// Scalar fields of a [`Message`] that assertions can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageField {
    Id,
    Text,
    Important,
}

impl Display for MessageField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageField::Id => "id",
            MessageField::Text => "text",
            MessageField::Important => "important",
        };
        write!(f, "{label}")
    }
}

/// Envelope for the read endpoint: `{"find": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub find: Message,
}

impl ReadRequest {
    pub fn find(message: Message) -> Self {
        Self { find: message }
    }
}
