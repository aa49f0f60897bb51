//! In-memory queue provider implementation for testing and development.
//!
//! This module provides a queue service that keeps every queue in process memory:
//! - FIFO delivery order within a queue
//! - Visibility leases with fresh receipt handles per delivery
//! - Batch send and delete with per-entry failures
//! - FIFO queues (`.fifo` suffix) reject entries without a message group
//!
//! This provider is intended for:
//! - Unit and integration testing of the move orchestrator
//! - Local experiments without cloud credentials

use crate::client::QueueService;
use crate::error::{QueueError, ValidationError};
use crate::message::{
    DeleteBatchResult, DeleteEntry, FailedEntry, MessageAttributeValue, MessageId, QueueName,
    QueueUrl, ReceiveOptions, ReceivedMessage, SendBatchResult, SendEntry,
    MESSAGE_DEDUPLICATION_ID_ATTRIBUTE, MESSAGE_GROUP_ID_ATTRIBUTE,
};
use crate::provider::ProviderType;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

const URL_PREFIX: &str = "memory://local/";

// ============================================================================
// Internal Storage Structures
// ============================================================================

/// Thread-safe storage for all queues, keyed by queue URL
#[derive(Default)]
struct QueueStorage {
    queues: HashMap<QueueUrl, InMemoryQueue>,
    sequence: u64,
}

impl QueueStorage {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn queue_mut(&mut self, url: &QueueUrl) -> Result<&mut InMemoryQueue, QueueError> {
        self.queues
            .get_mut(url)
            .ok_or_else(|| QueueError::QueueNotFound {
                queue_name: url.queue_name().to_string(),
            })
    }
}

/// Internal queue state for a single queue
struct InMemoryQueue {
    name: QueueName,
    /// Visible messages in delivery order
    messages: VecDeque<StoredMessage>,
    /// Leased messages keyed by receipt handle
    in_flight: HashMap<String, InFlightMessage>,
}

impl InMemoryQueue {
    fn new(name: QueueName) -> Self {
        Self {
            name,
            messages: VecDeque::new(),
            in_flight: HashMap::new(),
        }
    }

    /// Return messages whose lease expired to the front of the queue
    fn release_expired_leases(&mut self, now: Instant) {
        let mut expired: Vec<InFlightMessage> = Vec::new();
        self.in_flight.retain(|_, in_flight| {
            if in_flight.visible_at <= now {
                expired.push(in_flight.clone());
                false
            } else {
                true
            }
        });

        expired.sort_by_key(|in_flight| in_flight.message.sequence);
        for in_flight in expired.into_iter().rev() {
            self.messages.push_front(in_flight.message);
        }
    }
}

/// A message stored in a queue
#[derive(Clone)]
struct StoredMessage {
    sequence: u64,
    message_id: MessageId,
    body: String,
    message_attributes: HashMap<String, MessageAttributeValue>,
    message_group_id: Option<String>,
    message_deduplication_id: Option<String>,
    receive_count: u32,
}

/// A message currently leased to a consumer
#[derive(Clone)]
struct InFlightMessage {
    message: StoredMessage,
    visible_at: Instant,
}

/// Snapshot of a message held by the in-memory provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub message_id: MessageId,
    pub body: String,
    pub message_attributes: HashMap<String, MessageAttributeValue>,
    pub message_group_id: Option<String>,
    pub message_deduplication_id: Option<String>,
}

impl From<&StoredMessage> for QueuedMessage {
    fn from(message: &StoredMessage) -> Self {
        Self {
            message_id: message.message_id.clone(),
            body: message.body.clone(),
            message_attributes: message.message_attributes.clone(),
            message_group_id: message.message_group_id.clone(),
            message_deduplication_id: message.message_deduplication_id.clone(),
        }
    }
}

// ============================================================================
// InMemoryProvider
// ============================================================================

/// In-memory queue provider implementation
///
/// Cloning the provider shares the underlying queues.
#[derive(Clone, Default)]
pub struct InMemoryProvider {
    storage: Arc<RwLock<QueueStorage>>,
}

impl InMemoryProvider {
    /// Create a provider without any queues
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue, returning its URL; creating an existing queue is a no-op
    pub fn create_queue(&self, name: &QueueName) -> Result<QueueUrl, QueueError> {
        let url = Self::queue_url_for(name)?;
        let mut storage = self.write()?;
        storage
            .queues
            .entry(url.clone())
            .or_insert_with(|| InMemoryQueue::new(name.clone()));
        Ok(url)
    }

    /// Messages currently visible in the queue, in delivery order
    pub fn visible_messages(&self, queue: &QueueUrl) -> Result<Vec<QueuedMessage>, QueueError> {
        let storage = self.read()?;
        let queue = storage
            .queues
            .get(queue)
            .ok_or_else(|| QueueError::QueueNotFound {
                queue_name: queue.queue_name().to_string(),
            })?;
        Ok(queue.messages.iter().map(QueuedMessage::from).collect())
    }

    /// Number of messages currently leased to consumers
    pub fn in_flight_count(&self, queue: &QueueUrl) -> Result<usize, QueueError> {
        let storage = self.read()?;
        storage
            .queues
            .get(queue)
            .map(|queue| queue.in_flight.len())
            .ok_or_else(|| QueueError::QueueNotFound {
                queue_name: queue.queue_name().to_string(),
            })
    }

    fn queue_url_for(name: &QueueName) -> Result<QueueUrl, QueueError> {
        Ok(QueueUrl::new(format!("{}{}", URL_PREFIX, name))?)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, QueueStorage>, QueueError> {
        self.storage.read().map_err(|_| Self::poisoned())
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, QueueStorage>, QueueError> {
        self.storage.write().map_err(|_| Self::poisoned())
    }

    fn poisoned() -> QueueError {
        QueueError::ProviderError {
            provider: "InMemory".to_string(),
            code: "StoragePoisoned".to_string(),
            message: "queue storage lock was poisoned".to_string(),
        }
    }

    fn ensure_batch_size(len: usize) -> Result<(), QueueError> {
        let max_size = ProviderType::InMemory.max_batch_size();
        if len > max_size {
            return Err(QueueError::BatchTooLarge {
                size: len,
                max_size,
            });
        }
        Ok(())
    }

    fn ensure_distinct_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), QueueError> {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                return Err(ValidationError::InvalidFormat {
                    field: "entry_id".to_string(),
                    message: format!("batch entry id '{}' is not distinct", id),
                }
                .into());
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl QueueService for InMemoryProvider {
    async fn resolve_queue_url(&self, queue: &QueueName) -> Result<QueueUrl, QueueError> {
        let url = Self::queue_url_for(queue)?;
        let storage = self.read()?;
        if storage.queues.contains_key(&url) {
            Ok(url)
        } else {
            Err(QueueError::QueueNotFound {
                queue_name: queue.to_string(),
            })
        }
    }

    async fn approximate_message_count(&self, queue: &QueueUrl) -> Result<u64, QueueError> {
        let mut storage = self.write()?;
        let queue = storage.queue_mut(queue)?;
        queue.release_expired_leases(Instant::now());
        Ok(queue.messages.len() as u64)
    }

    async fn receive_messages(
        &self,
        queue: &QueueUrl,
        options: &ReceiveOptions,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        let now = Instant::now();
        let visible_at = now + Duration::from_secs(u64::from(options.visibility_timeout_secs));
        let max_messages =
            (options.max_messages as usize).min(ProviderType::InMemory.max_batch_size());

        let mut storage = self.write()?;
        let mut handles = Vec::with_capacity(max_messages);
        for _ in 0..max_messages {
            handles.push(storage.next_sequence());
        }

        let queue = storage.queue_mut(queue)?;
        queue.release_expired_leases(now);

        let mut received = Vec::new();
        for handle_sequence in handles {
            let Some(mut message) = queue.messages.pop_front() else {
                break;
            };
            message.receive_count += 1;

            let receipt = format!("{}-{}-{}", queue.name, message.sequence, handle_sequence);
            let mut attributes = HashMap::new();
            attributes.insert(
                "ApproximateReceiveCount".to_string(),
                message.receive_count.to_string(),
            );
            if let Some(group) = &message.message_group_id {
                attributes.insert(MESSAGE_GROUP_ID_ATTRIBUTE.to_string(), group.clone());
            }
            if let Some(dedup) = &message.message_deduplication_id {
                attributes.insert(MESSAGE_DEDUPLICATION_ID_ATTRIBUTE.to_string(), dedup.clone());
            }

            received.push(ReceivedMessage {
                message_id: message.message_id.clone(),
                receipt_handle: receipt.parse()?,
                body: message.body.clone(),
                attributes,
                message_attributes: message.message_attributes.clone(),
            });
            queue.in_flight.insert(
                receipt,
                InFlightMessage {
                    message,
                    visible_at,
                },
            );
        }

        Ok(received)
    }

    async fn send_message_batch(
        &self,
        queue: &QueueUrl,
        entries: &[SendEntry],
    ) -> Result<SendBatchResult, QueueError> {
        Self::ensure_batch_size(entries.len())?;
        Self::ensure_distinct_ids(entries.iter().map(|e| e.id.as_str()))?;

        let mut storage = self.write()?;
        let mut sequences = Vec::with_capacity(entries.len());
        for _ in entries {
            sequences.push(storage.next_sequence());
        }

        let queue = storage.queue_mut(queue)?;
        let is_fifo = queue.name.is_fifo();

        let mut result = SendBatchResult::default();
        for (entry, sequence) in entries.iter().zip(sequences) {
            if is_fifo && entry.message_group_id.is_none() {
                result.failed.push(FailedEntry {
                    id: entry.id.clone(),
                    code: "MissingParameter".to_string(),
                    message: Some("MessageGroupId is required for FIFO queues".to_string()),
                    sender_fault: true,
                });
                continue;
            }

            queue.messages.push_back(StoredMessage {
                sequence,
                message_id: format!("mem-{:08}", sequence).parse()?,
                body: entry.body.clone(),
                message_attributes: entry.message_attributes.clone(),
                message_group_id: entry.message_group_id.clone(),
                message_deduplication_id: entry.message_deduplication_id.clone(),
                receive_count: 0,
            });
            result.successful.push(entry.id.clone());
        }

        Ok(result)
    }

    async fn delete_message_batch(
        &self,
        queue: &QueueUrl,
        entries: &[DeleteEntry],
    ) -> Result<DeleteBatchResult, QueueError> {
        Self::ensure_batch_size(entries.len())?;
        Self::ensure_distinct_ids(entries.iter().map(|e| e.id.as_str()))?;

        let mut storage = self.write()?;
        let queue = storage.queue_mut(queue)?;

        let mut result = DeleteBatchResult::default();
        for entry in entries {
            if queue
                .in_flight
                .remove(entry.receipt_handle.as_str())
                .is_some()
            {
                result.successful.push(entry.id.clone());
            } else {
                result.failed.push(FailedEntry {
                    id: entry.id.clone(),
                    code: "ReceiptHandleIsInvalid".to_string(),
                    message: Some(format!(
                        "receipt handle {} is not leased",
                        entry.receipt_handle
                    )),
                    sender_fault: true,
                });
            }
        }

        Ok(result)
    }

    fn provider_type(&self) -> ProviderType {
        ProviderType::InMemory
    }
}
