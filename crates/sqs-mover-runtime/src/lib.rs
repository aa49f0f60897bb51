//! # SQS Mover Runtime
//!
//! Queue service contract used by the sqs-mover core, together with the
//! concrete services that implement it.
//!
//! This library provides:
//! - Message and batch entry types shared by every queue service
//! - The [`QueueService`] trait (resolve, backlog size, receive, send batch, delete batch)
//! - An AWS SQS implementation speaking the Query API over HTTPS
//! - An in-memory implementation with visibility leases
//! - A retry wrapper with exponential backoff for transient failures
//!
//! ## Module Organization
//!
//! - [error] - Error types for all queue operations
//! - [message] - Messages, identifiers and batch entries
//! - [provider] - Provider configuration
//! - [client] - The queue service trait
//! - [providers] - Queue service implementations
//! - [retry] - Retry policy and retrying service wrapper

// Module declarations
pub mod client;
pub mod error;
pub mod message;
pub mod provider;
pub mod providers;
pub mod retry;

// Re-export commonly used types at crate root for convenience
pub use client::QueueService;
pub use error::{ConfigurationError, QueueError, ValidationError};
pub use message::{
    DeleteBatchResult, DeleteEntry, FailedEntry, MessageAttributeValue, MessageId, QueueName,
    QueueUrl, ReceiptHandle, ReceiveOptions, ReceivedMessage, SendBatchResult, SendEntry,
    MAX_BATCH_SIZE, MESSAGE_DEDUPLICATION_ID_ATTRIBUTE, MESSAGE_GROUP_ID_ATTRIBUTE,
};
pub use provider::{AwsCredentials, AwsSqsConfig, ProviderType};
pub use providers::{AwsError, AwsSqsProvider, InMemoryProvider, QueuedMessage};
pub use retry::{RetryPolicy, RetryingQueueService};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
