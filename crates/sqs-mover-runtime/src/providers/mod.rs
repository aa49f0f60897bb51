//! Queue service implementations.
//!
//! This module contains concrete implementations of the `QueueService` trait
//! for AWS SQS and for an in-process queue used by tests and local runs.

pub mod aws;
pub mod memory;

pub use aws::{AwsError, AwsSqsProvider};
pub use memory::{InMemoryProvider, QueuedMessage};
