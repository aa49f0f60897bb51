//! The queue service contract used by the move orchestrator.

use crate::error::QueueError;
use crate::message::{
    DeleteBatchResult, DeleteEntry, QueueName, QueueUrl, ReceiveOptions, ReceivedMessage,
    SendBatchResult, SendEntry,
};
use crate::provider::ProviderType;
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Interface implemented by every queue backend (AWS SQS, in-memory, wrappers)
///
/// Batch calls that succeed at the transport level return a result listing the
/// accepted and rejected entries. Per-entry rejections are not errors at this
/// layer; callers decide what a partial batch means.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Resolve a queue name to the location used by every other call
    async fn resolve_queue_url(&self, queue: &QueueName) -> Result<QueueUrl, QueueError>;

    /// Approximate number of messages available in the queue
    async fn approximate_message_count(&self, queue: &QueueUrl) -> Result<u64, QueueError>;

    /// Receive up to `options.max_messages` messages; an empty batch is not an error
    async fn receive_messages(
        &self,
        queue: &QueueUrl,
        options: &ReceiveOptions,
    ) -> Result<Vec<ReceivedMessage>, QueueError>;

    /// Send a batch of messages
    async fn send_message_batch(
        &self,
        queue: &QueueUrl,
        entries: &[SendEntry],
    ) -> Result<SendBatchResult, QueueError>;

    /// Delete a batch of previously received messages
    async fn delete_message_batch(
        &self,
        queue: &QueueUrl,
        entries: &[DeleteEntry],
    ) -> Result<DeleteBatchResult, QueueError>;

    /// Get provider type
    fn provider_type(&self) -> ProviderType;
}

#[async_trait]
impl<T> QueueService for Arc<T>
where
    T: QueueService + ?Sized,
{
    async fn resolve_queue_url(&self, queue: &QueueName) -> Result<QueueUrl, QueueError> {
        (**self).resolve_queue_url(queue).await
    }

    async fn approximate_message_count(&self, queue: &QueueUrl) -> Result<u64, QueueError> {
        (**self).approximate_message_count(queue).await
    }

    async fn receive_messages(
        &self,
        queue: &QueueUrl,
        options: &ReceiveOptions,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        (**self).receive_messages(queue, options).await
    }

    async fn send_message_batch(
        &self,
        queue: &QueueUrl,
        entries: &[SendEntry],
    ) -> Result<SendBatchResult, QueueError> {
        (**self).send_message_batch(queue, entries).await
    }

    async fn delete_message_batch(
        &self,
        queue: &QueueUrl,
        entries: &[DeleteEntry],
    ) -> Result<DeleteBatchResult, QueueError> {
        (**self).delete_message_batch(queue, entries).await
    }

    fn provider_type(&self) -> ProviderType {
        (**self).provider_type()
    }
}
