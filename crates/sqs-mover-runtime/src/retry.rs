//! # Retry Policy Module
//!
//! Implements exponential backoff retry logic for transient queue service failures.
//!
//! [`RetryingQueueService`] wraps any [`QueueService`] and re-issues calls that
//! fail with a transient error (timeouts, connection failures, throttling,
//! service unavailability). Permanent errors and per-entry batch failures are
//! returned to the caller untouched.

use crate::client::QueueService;
use crate::error::QueueError;
use crate::message::{
    DeleteBatchResult, DeleteEntry, QueueName, QueueUrl, ReceiveOptions, ReceivedMessage,
    SendBatchResult, SendEntry,
};
use crate::provider::ProviderType;
use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff schedule for transient queue failures
///
/// Retry `n` (0-based) waits `initial_delay * backoff_multiplier^n`, never more
/// than `max_delay`. With jitter on, each wait is moved by up to
/// `jitter_percent` in either direction.
///
/// ```rust
/// use sqs_mover_runtime::retry::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(5, Duration::from_millis(500), Duration::from_secs(10), 1.5)
///     .without_jitter();
/// assert_eq!(policy.calculate_delay(1), Duration::from_millis(750));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first call; 0 disables retrying
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub use_jitter: bool,
    /// Fraction of the delay used as jitter range, 0.0 to 1.0
    pub jitter_percent: f64,
}

const DEFAULT_JITTER: f64 = 0.25;

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200), Duration::from_secs(5), 2.0)
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
            backoff_multiplier,
            use_jitter: true,
            jitter_percent: DEFAULT_JITTER,
        }
    }

    /// Policy that passes every error straight through
    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO, 1.0).without_jitter()
    }

    pub fn without_jitter(self) -> Self {
        Self {
            use_jitter: false,
            ..self
        }
    }

    pub fn with_jitter_percent(self, percent: f64) -> Self {
        Self {
            jitter_percent: percent.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Wait before retry number `retry` (0-based)
    pub fn calculate_delay(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let backoff = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = backoff.min(self.max_delay.as_secs_f64());

        if self.use_jitter {
            Duration::from_secs_f64(jittered(capped, self.jitter_percent))
        } else {
            Duration::from_secs_f64(capped)
        }
    }

    /// Whether retry number `retry` (0-based) is allowed
    pub fn should_retry(&self, retry: u32) -> bool {
        retry < self.max_attempts
    }

    /// Calls made at most, the first one included
    pub fn total_attempts(&self) -> u32 {
        self.max_attempts.saturating_add(1)
    }
}

fn jittered(secs: f64, fraction: f64) -> f64 {
    let spread = secs * fraction;
    if spread <= 0.0 {
        return secs;
    }
    (secs + rand::thread_rng().gen_range(-spread..=spread)).max(0.0)
}

/// Queue service wrapper that retries transient failures
///
/// # Examples
///
/// ```rust
/// use sqs_mover_runtime::{InMemoryProvider, RetryPolicy, RetryingQueueService};
///
/// let service = RetryingQueueService::new(InMemoryProvider::new(), RetryPolicy::default());
/// ```
#[derive(Debug, Clone)]
pub struct RetryingQueueService<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> RetryingQueueService<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `call` until it succeeds or fails with an error that may not be retried
    async fn with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
    ) -> Result<T, QueueError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, QueueError>>,
    {
        let mut retries = 0u32;

        loop {
            let error = match call().await {
                Ok(value) => {
                    if retries > 0 {
                        debug!(operation, retries, "Queue call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !error.should_retry() || !self.policy.should_retry(retries) {
                return Err(error);
            }

            let backoff = self.policy.calculate_delay(retries);
            let delay = error.retry_after().map_or(backoff, |hint| backoff.max(hint));
            retries += 1;

            warn!(
                operation,
                retry = retries,
                max_attempts = self.policy.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Transient queue error, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl<S> QueueService for RetryingQueueService<S>
where
    S: QueueService,
{
    async fn resolve_queue_url(&self, queue: &QueueName) -> Result<QueueUrl, QueueError> {
        self.with_retry("resolve_queue_url", || self.inner.resolve_queue_url(queue))
            .await
    }

    async fn approximate_message_count(&self, queue: &QueueUrl) -> Result<u64, QueueError> {
        self.with_retry("approximate_message_count", || {
            self.inner.approximate_message_count(queue)
        })
        .await
    }

    async fn receive_messages(
        &self,
        queue: &QueueUrl,
        options: &ReceiveOptions,
    ) -> Result<Vec<ReceivedMessage>, QueueError> {
        self.with_retry("receive_messages", || {
            self.inner.receive_messages(queue, options)
        })
        .await
    }

    async fn send_message_batch(
        &self,
        queue: &QueueUrl,
        entries: &[SendEntry],
    ) -> Result<SendBatchResult, QueueError> {
        self.with_retry("send_message_batch", || {
            self.inner.send_message_batch(queue, entries)
        })
        .await
    }

    async fn delete_message_batch(
        &self,
        queue: &QueueUrl,
        entries: &[DeleteEntry],
    ) -> Result<DeleteBatchResult, QueueError> {
        self.with_retry("delete_message_batch", || {
            self.inner.delete_message_batch(queue, entries)
        })
        .await
    }

    fn provider_type(&self) -> ProviderType {
        self.inner.provider_type()
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
