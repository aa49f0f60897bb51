//! Log output for the binary.
//!
//! Everything is written to stderr so stdout only carries the run summary.

use crate::settings::ConfigError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;

/// Filter used when neither `--log-level` nor `RUST_LOG` is given
pub const DEFAULT_FILTER: &str =
    "sqs_mover=info,sqs_mover_cli=info,sqs_mover_core=info,sqs_mover_runtime=warn";

const CRATE_TARGETS: [&str; 4] = [
    "sqs_mover",
    "sqs_mover_cli",
    "sqs_mover_core",
    "sqs_mover_runtime",
];

/// Build the filter for `level`, falling back to `RUST_LOG` and then the default
///
/// A bare level such as `debug` applies to this tool's crates only. Anything
/// containing `=` or `,` is taken as a full filter directive.
pub fn build_filter(level: Option<&str>) -> Result<EnvFilter, ConfigError> {
    let Some(level) = level.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()));
    };

    let directives = if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        CRATE_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(",")
    };

    EnvFilter::try_new(&directives).map_err(|e| ConfigError::Invalid {
        key: "log_level".to_string(),
        message: e.to_string(),
    })
}

/// Install the global subscriber
pub fn init_logging(level: Option<&str>, json: bool) -> Result<(), ConfigError> {
    let filter = build_filter(level)?;

    let json_layer = json.then(|| fmt::layer().json().with_writer(std::io::stderr));
    let plain_layer = (!json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .try_init()
        .map_err(|e| ConfigError::Invalid {
            key: "log_level".to_string(),
            message: format!("Failed to install log subscriber: {}", e),
        })
}
