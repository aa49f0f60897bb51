//! # SQS Mover Core
//!
//! Moves messages from a source queue (typically a dead-letter queue) into a
//! destination queue.
//!
//! The move runs as a sequence of cycles. Each cycle receives one bounded batch
//! from the source, re-sends it to the destination and, only when every entry
//! was accepted, deletes the batch from the source. The number of messages to
//! move is captured once from the source backlog estimate before the first
//! cycle.
//!
//! ## Module Organization
//!
//! - [transfer] - Pure translation of a received batch into send and delete entries
//! - [mover] - The move orchestrator and its outcomes
//! - [progress] - Progress accounting and reporter hook
//! - [error] - Move failure taxonomy
//!
//! ## Usage
//!
//! ```rust
//! use sqs_mover_core::{MessageMover, MoveOutcome};
//! use sqs_mover_runtime::{InMemoryProvider, QueueName};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = InMemoryProvider::new();
//! let source: QueueName = "orders-dlq".parse()?;
//! let destination: QueueName = "orders".parse()?;
//! provider.create_queue(&source)?;
//! provider.create_queue(&destination)?;
//!
//! let mut mover = MessageMover::new(Arc::new(provider));
//! let report = mover.run(&source, &destination).await?;
//! assert_eq!(report.outcome, MoveOutcome::Completed);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod mover;
pub mod progress;
pub mod transfer;

pub use error::{MoveError, MoveFailure, QueueOperation};
pub use mover::{MessageMover, MoveOutcome, MoveReport, MoveSettings, MoveState};
pub use progress::{LogReporter, NullReporter, ProgressReporter, ProgressState};
pub use tokio_util::sync::CancellationToken;
