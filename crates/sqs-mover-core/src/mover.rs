//! # Move Orchestrator
//!
//! Drives the receive → send → delete cycle between two queues.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──resolve + estimate──▶ Draining ──▶ Completed | Exhausted | Cancelled
//!   │                             │
//!   └──────────────┬──────────────┘
//!                  ▼
//!                Failed
//! ```
//!
//! A run resolves both queues, captures the source backlog estimate as its
//! target and then repeats cycles until the target is reached, the source
//! returns an empty batch, cancellation is requested, or a call fails.
//!
//! A batch is committed only when the destination accepted every entry and the
//! source deleted every entry. Any per-entry rejection ends the run without
//! counting the batch. Nothing is retried here; wrap the queue service in
//! [`sqs_mover_runtime::RetryingQueueService`] for transient failures.

use crate::error::{MoveError, MoveFailure, QueueOperation};
use crate::progress::{NullReporter, ProgressReporter, ProgressState};
use crate::transfer::{build_delete_entries, build_send_entries, clip_batch};
use sqs_mover_runtime::{QueueName, QueueService, QueueUrl, ReceiveOptions, ReceivedMessage};
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[cfg(test)]
#[path = "mover_tests.rs"]
mod tests;

/// Where a [`MessageMover`] is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Idle,
    Draining,
    Completed,
    Exhausted,
    Cancelled,
    Failed,
}

/// How a successful run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The target was reached
    Completed,
    /// The source returned no messages before the target was reached
    Exhausted,
    /// Cancellation was requested between cycles
    Cancelled,
}

impl From<MoveOutcome> for MoveState {
    fn from(outcome: MoveOutcome) -> Self {
        match outcome {
            MoveOutcome::Completed => Self::Completed,
            MoveOutcome::Exhausted => Self::Exhausted,
            MoveOutcome::Cancelled => Self::Cancelled,
        }
    }
}

impl fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Summary of a run that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    pub moved: u64,
    pub target: u64,
    /// Number of committed cycles
    pub cycles: u64,
}

/// Tunables for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveSettings {
    /// Options for every receive call; `max_messages` is the batch cap
    pub receive: ReceiveOptions,
}

/// Moves messages from one queue to another
pub struct MessageMover {
    service: Arc<dyn QueueService>,
    settings: MoveSettings,
    reporter: Box<dyn ProgressReporter>,
    cancellation: CancellationToken,
    state: MoveState,
}

impl MessageMover {
    pub fn new(service: Arc<dyn QueueService>) -> Self {
        Self {
            service,
            settings: MoveSettings::default(),
            reporter: Box::new(NullReporter),
            cancellation: CancellationToken::new(),
            state: MoveState::Idle,
        }
    }

    pub fn with_settings(mut self, settings: MoveSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Use `token` to request cancellation; it is checked before every cycle
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn state(&self) -> MoveState {
        self.state
    }

    pub fn settings(&self) -> &MoveSettings {
        &self.settings
    }

    /// Move messages from `source` to `destination`
    ///
    /// # Errors
    ///
    /// Returns a [`MoveFailure`] carrying the cause and the progress committed
    /// before it. Committed cycles are never rolled back.
    pub async fn run(
        &mut self,
        source: &QueueName,
        destination: &QueueName,
    ) -> Result<MoveReport, MoveFailure> {
        let mut progress = ProgressState::default();

        match self.drain(source, destination, &mut progress).await {
            Ok(report) => {
                self.state = report.outcome.into();
                self.reporter.finish(&report);
                Ok(report)
            }
            Err(error) => {
                self.state = MoveState::Failed;
                error!(
                    source_queue = %source,
                    destination_queue = %destination,
                    moved = progress.moved(),
                    target = progress.target(),
                    error = %error,
                    "Move failed"
                );
                self.reporter.abandon(progress.moved(), progress.target());
                Err(MoveFailure {
                    error,
                    moved: progress.moved(),
                    target: progress.target(),
                })
            }
        }
    }

    async fn drain(
        &mut self,
        source: &QueueName,
        destination: &QueueName,
        progress: &mut ProgressState,
    ) -> Result<MoveReport, MoveError> {
        let source_url = self.resolve(source).await?;
        let destination_url = self.resolve(destination).await?;

        let target = self
            .service
            .approximate_message_count(&source_url)
            .await
            .map_err(|source| MoveError::Transport {
                operation: QueueOperation::BacklogEstimate,
                source,
            })?;
        *progress = ProgressState::new(target);

        if target == 0 {
            info!(queue = %source, "Source queue is empty");
            return Ok(Self::report(MoveOutcome::Completed, progress, 0));
        }

        info!(
            source_queue = %source,
            destination_queue = %destination,
            target,
            "Starting to move messages"
        );
        self.state = MoveState::Draining;
        self.reporter.start(target);

        let mut cycles = 0;
        loop {
            if self.cancellation.is_cancelled() {
                warn!(moved = progress.moved(), target, "Cancellation requested, stopping");
                return Ok(Self::report(MoveOutcome::Cancelled, progress, cycles));
            }

            if progress.is_complete() {
                return Ok(Self::report(MoveOutcome::Completed, progress, cycles));
            }

            let batch = self
                .service
                .receive_messages(&source_url, &self.settings.receive)
                .await
                .map_err(|source| MoveError::Transport {
                    operation: QueueOperation::Receive,
                    source,
                })?;

            if batch.is_empty() {
                info!(
                    queue = %source,
                    moved = progress.moved(),
                    target,
                    "Source returned no messages"
                );
                return Ok(Self::report(MoveOutcome::Exhausted, progress, cycles));
            }

            let received = batch.len();
            let batch = clip_batch(batch, progress.moved(), progress.target());
            if batch.len() < received {
                debug!(
                    received,
                    batch_size = batch.len(),
                    "Clipped batch to the remaining target"
                );
            }

            self.transfer(&source_url, &destination_url, &batch).await?;

            progress.record(batch.len() as u64);
            cycles += 1;
            debug!(
                batch_size = batch.len(),
                moved = progress.moved(),
                target,
                "Committed batch"
            );
            self.reporter.update(progress.moved(), progress.target());
        }
    }

    async fn resolve(&self, queue: &QueueName) -> Result<QueueUrl, MoveError> {
        self.service
            .resolve_queue_url(queue)
            .await
            .map_err(|source| MoveError::Resolution {
                queue: queue.clone(),
                source,
            })
    }

    /// Send `batch` to the destination and delete it from the source
    async fn transfer(
        &self,
        source_url: &QueueUrl,
        destination_url: &QueueUrl,
        batch: &[ReceivedMessage],
    ) -> Result<(), MoveError> {
        let send_entries = build_send_entries(batch);
        let sent = self
            .service
            .send_message_batch(destination_url, &send_entries)
            .await
            .map_err(|source| MoveError::Transport {
                operation: QueueOperation::SendBatch,
                source,
            })?;

        if sent.accepted_count() != send_entries.len() || !sent.failed.is_empty() {
            return Err(MoveError::PartialSend {
                submitted: send_entries.len(),
                accepted: sent.accepted_count(),
                failed: sent.failed,
            });
        }

        let delete_entries = build_delete_entries(batch);
        let deleted = self
            .service
            .delete_message_batch(source_url, &delete_entries)
            .await
            .map_err(|source| MoveError::Transport {
                operation: QueueOperation::DeleteBatch,
                source,
            })?;

        if !deleted.failed.is_empty() {
            return Err(MoveError::PartialDelete {
                submitted: delete_entries.len(),
                deleted: deleted.successful.len(),
                failed: deleted.failed,
            });
        }

        Ok(())
    }

    fn report(outcome: MoveOutcome, progress: &ProgressState, cycles: u64) -> MoveReport {
        MoveReport {
            outcome,
            moved: progress.moved(),
            target: progress.target(),
            cycles,
        }
    }
}

impl fmt::Debug for MessageMover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageMover")
            .field("provider", &self.service.provider_type())
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish()
    }
}
