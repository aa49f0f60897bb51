//! # SQS Mover CLI
//!
//! Command-line front end for moving messages between two SQS queues.
//!
//! This crate provides:
//! - Argument parsing for the `sqs-mover` binary
//! - Layered configuration ([settings])
//! - AWS credential discovery ([credentials])
//! - Log and progress output ([logging], [progress])
//! - Mapping of run outcomes and failures to exit codes

pub mod credentials;
pub mod logging;
pub mod progress;
pub mod settings;

use clap::Parser;
use credentials::{CredentialsError, CredentialsResolver};
use progress::ProgressBarReporter;
use settings::{ConfigError, ConfigOverrides, MoverConfig};
use sqs_mover_core::{
    CancellationToken, LogReporter, MessageMover, MoveError, MoveFailure, MoveOutcome, MoveReport,
    ProgressReporter,
};
use sqs_mover_runtime::{
    AwsCredentials, AwsError, AwsSqsConfig, AwsSqsProvider, QueueName, QueueService,
    RetryingQueueService,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

// ============================================================================
// Exit codes
// ============================================================================

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_IO: i32 = 1;
/// Also used by clap for usage errors
pub const EXIT_CONFIGURATION: i32 = 2;
pub const EXIT_RESOLUTION: i32 = 3;
pub const EXIT_TRANSPORT: i32 = 4;
pub const EXIT_PARTIAL_BATCH: i32 = 5;
pub const EXIT_CANCELLED: i32 = 130;

// ============================================================================
// CLI Structure
// ============================================================================

/// Move messages from one SQS queue to another
#[derive(Parser, Debug)]
#[command(name = "sqs-mover")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Move messages from one SQS queue to another")]
#[command(
    long_about = "Moves the messages currently waiting in the source queue to the destination \
                  queue, one batch at a time. Each batch is sent to the destination before it is \
                  deleted from the source, so an interrupted run never loses messages."
)]
pub struct Cli {
    /// Name of the queue to take messages from
    #[arg(short, long)]
    pub source: QueueName,

    /// Name of the queue to put messages into
    #[arg(short, long)]
    pub destination: QueueName,

    /// AWS region of both queues [default: us-east-1]
    #[arg(short, long)]
    pub region: Option<String>,

    /// Configuration file path
    #[arg(long, env = "SQS_MOVER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Alternative SQS endpoint, e.g. http://localhost:4566
    #[arg(long)]
    pub endpoint_url: Option<String>,

    /// Named profile from the shared AWS config and credentials files
    #[arg(long)]
    pub profile: Option<String>,

    /// Log level for this tool, or a full filter directive
    #[arg(long)]
    pub log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Log progress instead of drawing a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            profile: self.profile.clone(),
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that end the binary with a non-zero exit code
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("Failed to create SQS client: {0}")]
    Provider(#[from] AwsError),

    #[error("{0}")]
    Move(#[from] MoveFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Credentials(_) | Self::Provider(_) => {
                EXIT_CONFIGURATION
            }
            Self::Move(failure) => match failure.error {
                MoveError::Resolution { .. } => EXIT_RESOLUTION,
                MoveError::Transport { .. } => EXIT_TRANSPORT,
                MoveError::PartialSend { .. } | MoveError::PartialDelete { .. } => {
                    EXIT_PARTIAL_BATCH
                }
            },
            Self::Io(_) => EXIT_IO,
        }
    }
}

// ============================================================================
// Run
// ============================================================================

/// Load configuration and credentials, then move messages until the run ends
///
/// A cancelled run is returned as a report; use [`report_exit_code`] to turn
/// it into an exit code.
pub async fn run(cli: &Cli, cancellation: CancellationToken) -> Result<MoveReport, CliError> {
    let config = MoverConfig::load(cli.config.as_deref(), &cli.overrides())?;
    config.validate()?;

    let credentials = CredentialsResolver::new(&config.region, config.profile.clone())
        .resolve()
        .await?;
    let service = build_service(&config, credentials)?;

    let reporter: Box<dyn ProgressReporter> = if cli.no_progress {
        Box::new(LogReporter)
    } else {
        Box::new(ProgressBarReporter::new())
    };

    info!(
        source = %cli.source,
        destination = %cli.destination,
        region = %config.region,
        batch_size = config.receive.batch_size,
        "Moving messages"
    );
    writeln!(std::io::stdout(), "Starting to move messages...")?;

    let mut mover = MessageMover::new(service)
        .with_settings(config.move_settings())
        .with_reporter(reporter)
        .with_cancellation(cancellation);

    Ok(mover.run(&cli.source, &cli.destination).await?)
}

/// SQS client with retries for transient failures
pub fn build_service(
    config: &MoverConfig,
    credentials: AwsCredentials,
) -> Result<Arc<dyn QueueService>, CliError> {
    let provider = AwsSqsProvider::new(AwsSqsConfig {
        region: config.region.clone(),
        endpoint_url: config.endpoint_url.clone(),
        credentials: Some(credentials),
        http_timeout: config.http_timeout(),
    })?;

    Ok(Arc::new(RetryingQueueService::new(
        provider,
        config.retry_policy(),
    )))
}

/// Line printed to stdout when a run ends without failing
pub fn summary(report: &MoveReport) -> String {
    if report.target == 0 {
        return "Source queue is empty. Nothing to move.".to_string();
    }

    match report.outcome {
        MoveOutcome::Completed => format!("Moved {} messages. Done.", report.moved),
        MoveOutcome::Exhausted => format!(
            "There aren't remaining messages to move. Moved {} of {} estimated messages.",
            report.moved, report.target
        ),
        MoveOutcome::Cancelled => format!(
            "Cancelled after moving {} of {} messages.",
            report.moved, report.target
        ),
    }
}

pub fn report_exit_code(report: &MoveReport) -> i32 {
    match report.outcome {
        MoveOutcome::Completed | MoveOutcome::Exhausted => EXIT_SUCCESS,
        MoveOutcome::Cancelled => EXIT_CANCELLED,
    }
}
