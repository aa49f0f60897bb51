//! Message types for queue operations including core domain identifiers and
//! the batch entries exchanged with a queue service.

use crate::error::ValidationError;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Maximum number of entries a single receive, send or delete batch may carry.
pub const MAX_BATCH_SIZE: usize = 10;

/// System attribute carrying the FIFO ordering group of a message.
pub const MESSAGE_GROUP_ID_ATTRIBUTE: &str = "MessageGroupId";

/// System attribute carrying the FIFO deduplication key of a message.
pub const MESSAGE_DEDUPLICATION_ID_ATTRIBUTE: &str = "MessageDeduplicationId";

const FIFO_SUFFIX: &str = ".fifo";
const MAX_QUEUE_NAME_LENGTH: usize = 80;

// ============================================================================
// Core Domain Identifiers
// ============================================================================

/// Validated queue name with length and character restrictions
///
/// Names are 1-80 characters of ASCII alphanumerics, hyphens and underscores.
/// FIFO queues carry a trailing `.fifo`, which counts towards the length.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueName(String);

impl QueueName {
    /// Create new queue name with validation
    pub fn new(name: String) -> Result<Self, ValidationError> {
        if name.is_empty() || name.len() > MAX_QUEUE_NAME_LENGTH {
            return Err(ValidationError::OutOfRange {
                field: "queue_name".to_string(),
                message: format!("must be 1-{} characters", MAX_QUEUE_NAME_LENGTH),
            });
        }

        let base = name.strip_suffix(FIFO_SUFFIX).unwrap_or(&name);
        if base.is_empty() {
            return Err(ValidationError::InvalidFormat {
                field: "queue_name".to_string(),
                message: "name cannot consist of the .fifo suffix alone".to_string(),
            });
        }

        if !base
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::InvalidFormat {
                field: "queue_name".to_string(),
                message: "only ASCII alphanumeric, hyphens, and underscores allowed".to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Whether this names a FIFO queue
    pub fn is_fifo(&self) -> bool {
        self.0.ends_with(FIFO_SUFFIX)
    }

    /// Get queue name as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QueueName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Resolved location of a queue, as returned by the queue service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueUrl(String);

impl QueueUrl {
    /// Create a queue URL, checking that it parses as an absolute URL
    pub fn new(url: String) -> Result<Self, ValidationError> {
        url::Url::parse(&url).map_err(|e| ValidationError::InvalidFormat {
            field: "queue_url".to_string(),
            message: e.to_string(),
        })?;

        Ok(Self(url))
    }

    /// Last path segment of the URL, which is the queue name for SQS
    pub fn queue_name(&self) -> &str {
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.0)
    }

    /// Get the URL as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message, unique within a received batch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Get message ID as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "message_id".to_string(),
            });
        }

        Ok(Self(s.to_string()))
    }
}

/// Opaque proof of the current lease on a delivered message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    /// Get the receipt handle as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReceiptHandle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "receipt_handle".to_string(),
            });
        }

        Ok(Self(s.to_string()))
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Typed value of a user-defined message attribute
///
/// Exactly one of `string_value` and `binary_value` is normally present. The
/// data type is kept verbatim (e.g. `String`, `Number`, `Binary.gzip`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAttributeValue {
    pub data_type: String,
    pub string_value: Option<String>,
    pub binary_value: Option<Bytes>,
}

impl MessageAttributeValue {
    /// Create a `String` attribute
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: "String".to_string(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    /// Create a `Number` attribute
    pub fn number(value: impl Into<String>) -> Self {
        Self {
            data_type: "Number".to_string(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    /// Create a `Binary` attribute
    pub fn binary(value: impl Into<Bytes>) -> Self {
        Self {
            data_type: "Binary".to_string(),
            string_value: None,
            binary_value: Some(value.into()),
        }
    }
}

/// A message delivered by a receive call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub message_id: MessageId,
    pub receipt_handle: ReceiptHandle,
    pub body: String,
    /// System attributes such as `MessageGroupId` or `ApproximateReceiveCount`
    pub attributes: HashMap<String, String>,
    /// User-defined attributes, forwarded unchanged when re-sent
    pub message_attributes: HashMap<String, MessageAttributeValue>,
}

impl ReceivedMessage {
    /// Ordering group of the message, if it came from a FIFO queue
    pub fn message_group_id(&self) -> Option<&str> {
        self.attributes
            .get(MESSAGE_GROUP_ID_ATTRIBUTE)
            .map(String::as_str)
    }

    /// Deduplication key of the message, if it came from a FIFO queue
    pub fn message_deduplication_id(&self) -> Option<&str> {
        self.attributes
            .get(MESSAGE_DEDUPLICATION_ID_ATTRIBUTE)
            .map(String::as_str)
    }
}

/// Options for a single receive call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveOptions {
    /// Upper bound on delivered messages (1-10)
    pub max_messages: u32,
    /// Lease on the delivered messages before they become visible again
    pub visibility_timeout_secs: u32,
    /// Long-poll wait; zero returns immediately
    pub wait_time_secs: u32,
}

impl Default for ReceiveOptions {
    fn default() -> Self {
        Self {
            max_messages: MAX_BATCH_SIZE as u32,
            visibility_timeout_secs: 2,
            wait_time_secs: 0,
        }
    }
}

// ============================================================================
// Batch Entries
// ============================================================================

/// One entry of a send-batch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendEntry {
    /// Entry identifier, unique within the batch
    pub id: String,
    pub body: String,
    pub message_attributes: HashMap<String, MessageAttributeValue>,
    pub message_group_id: Option<String>,
    pub message_deduplication_id: Option<String>,
}

/// One entry of a delete-batch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteEntry {
    /// Entry identifier, unique within the batch
    pub id: String,
    pub receipt_handle: ReceiptHandle,
}

/// A batch entry the queue service rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedEntry {
    pub id: String,
    pub code: String,
    pub message: Option<String>,
    /// Whether the service blames the caller for the failure
    pub sender_fault: bool,
}

impl std::fmt::Display for FailedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {} ({})", self.id, self.code, message),
            None => write!(f, "{}: {}", self.id, self.code),
        }
    }
}

/// Response of a send-batch call that succeeded at the transport level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendBatchResult {
    /// Entry ids accepted by the destination
    pub successful: Vec<String>,
    pub failed: Vec<FailedEntry>,
}

impl SendBatchResult {
    /// Number of entries the destination accepted
    pub fn accepted_count(&self) -> usize {
        self.successful.len()
    }
}

/// Response of a delete-batch call that succeeded at the transport level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteBatchResult {
    /// Entry ids removed from the queue
    pub successful: Vec<String>,
    pub failed: Vec<FailedEntry>,
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
