//! Error types for a message move.

use sqs_mover_runtime::{FailedEntry, QueueError, QueueName};
use std::fmt;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

/// Queue call issued by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOperation {
    BacklogEstimate,
    Receive,
    SendBatch,
    DeleteBatch,
}

impl fmt::Display for QueueOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::BacklogEstimate => "backlog estimate",
            Self::Receive => "receive",
            Self::SendBatch => "send batch",
            Self::DeleteBatch => "delete batch",
        };
        write!(f, "{}", name)
    }
}

/// Reasons a move stops before reaching its target
#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    /// A queue name could not be resolved to a queue location
    #[error("Failed to resolve queue '{queue}': {source}")]
    Resolution {
        queue: QueueName,
        #[source]
        source: QueueError,
    },

    /// A queue call failed at the transport level
    #[error("Queue {operation} failed: {source}")]
    Transport {
        operation: QueueOperation,
        #[source]
        source: QueueError,
    },

    /// The destination rejected part of a batch; nothing was deleted from the source
    #[error("Destination accepted {accepted} of {submitted} messages; failed entries: {}", format_failed(.failed))]
    PartialSend {
        submitted: usize,
        accepted: usize,
        failed: Vec<FailedEntry>,
    },

    /// The source kept part of a batch that the destination already holds
    #[error("Source deleted {deleted} of {submitted} messages after they were sent; {} messages are now duplicated: {}", .failed.len(), format_failed(.failed))]
    PartialDelete {
        submitted: usize,
        deleted: usize,
        failed: Vec<FailedEntry>,
    },
}

impl MoveError {
    /// True for failures reported per entry by a batch call
    pub fn is_partial_batch(&self) -> bool {
        matches!(self, Self::PartialSend { .. } | Self::PartialDelete { .. })
    }

    /// Underlying queue error, when the failure came from a queue call
    pub fn queue_error(&self) -> Option<&QueueError> {
        match self {
            Self::Resolution { source, .. } | Self::Transport { source, .. } => Some(source),
            Self::PartialSend { .. } | Self::PartialDelete { .. } => None,
        }
    }
}

fn format_failed(failed: &[FailedEntry]) -> String {
    failed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A failed move together with the progress committed before the failure
#[derive(Debug, thiserror::Error)]
#[error("{error} (moved {moved} of {target} messages)")]
pub struct MoveFailure {
    #[source]
    pub error: MoveError,
    pub moved: u64,
    pub target: u64,
}
