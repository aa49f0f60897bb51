//! Layered configuration for the mover.
//!
//! Sources, later ones overriding earlier ones:
//!  1. Built-in defaults
//!  2. `<config dir>/sqs-mover/config.{toml,yaml}` (optional)
//!  3. The file given with `--config` / `SQS_MOVER_CONFIG` (required when given)
//!  4. Environment variables prefixed `SQS_MOVER__`, e.g.
//!     `SQS_MOVER__RECEIVE__BATCH_SIZE=5` sets `receive.batch_size`
//!  5. Command-line flags

use serde::{Deserialize, Serialize};
use sqs_mover_core::MoveSettings;
use sqs_mover_runtime::{ReceiveOptions, RetryPolicy, MAX_BATCH_SIZE};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

/// Prefix of environment variables read as configuration
pub const ENV_PREFIX: &str = "SQS_MOVER";

/// Longest long-poll wait SQS accepts
const MAX_WAIT_TIME_SECS: u32 = 20;

/// Longest visibility timeout SQS accepts (12 hours)
const MAX_VISIBILITY_TIMEOUT_SECS: u32 = 43_200;

/// Errors raised while loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value for '{key}': {message}")]
    Invalid { key: String, message: String },
}

/// Complete mover configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverConfig {
    /// AWS region of both queues
    pub region: String,

    /// Alternative SQS endpoint, e.g. LocalStack
    pub endpoint_url: Option<String>,

    /// Profile to read from the shared credentials file
    pub profile: Option<String>,

    pub receive: ReceiveConfig,

    pub retry: RetryConfig,

    /// Timeout for a single SQS HTTP request
    pub http_timeout_secs: u64,
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint_url: None,
            profile: None,
            receive: ReceiveConfig::default(),
            retry: RetryConfig::default(),
            http_timeout_secs: 30,
        }
    }
}

/// Receive call tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiveConfig {
    pub visibility_timeout_secs: u32,
    pub wait_time_secs: u32,
    pub batch_size: u32,
}

impl Default for ReceiveConfig {
    fn default() -> Self {
        let options = ReceiveOptions::default();
        Self {
            visibility_timeout_secs: options.visibility_timeout_secs,
            wait_time_secs: options.wait_time_secs,
            batch_size: options.max_messages,
        }
    }
}

/// Backoff for transient SQS failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt; 0 disables retrying
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
            jitter: policy.use_jitter,
        }
    }
}

/// Values given on the command line, applied last
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub profile: Option<String>,
}

impl MoverConfig {
    /// Load configuration from the user config directory, `explicit_file`,
    /// the environment and `overrides`
    pub fn load(
        explicit_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let user_file = user_config_dir().map(|dir| dir.join("config"));
        Self::load_from(user_file.as_deref(), explicit_file, overrides)
    }

    /// Load configuration using `user_file` as the optional base file
    ///
    /// `user_file` is a path without extension; any supported format found
    /// next to it is read.
    pub fn load_from(
        user_file: Option<&Path>,
        explicit_file: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = user_file {
            builder = builder
                .add_source(config::File::with_name(&path.to_string_lossy()).required(false));
        }

        if let Some(path) = explicit_file {
            debug!(path = %path.display(), "Loading configuration from explicit path");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_override_option("region", overrides.region.clone())?
            .set_override_option("endpoint_url", overrides.endpoint_url.clone())?
            .set_override_option("profile", overrides.profile.clone())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Check every value against the limits SQS enforces
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.region.trim().is_empty() {
            return Err(invalid("region", "must not be empty"));
        }

        if let Some(endpoint) = &self.endpoint_url {
            if endpoint.trim().is_empty() {
                return Err(invalid("endpoint_url", "must not be empty when set"));
            }
        }

        let batch_size = self.receive.batch_size;
        if batch_size == 0 || batch_size as usize > MAX_BATCH_SIZE {
            return Err(invalid(
                "receive.batch_size",
                &format!("{} is outside 1-{}", batch_size, MAX_BATCH_SIZE),
            ));
        }

        if self.receive.wait_time_secs > MAX_WAIT_TIME_SECS {
            return Err(invalid(
                "receive.wait_time_secs",
                &format!(
                    "{} is outside 0-{}",
                    self.receive.wait_time_secs, MAX_WAIT_TIME_SECS
                ),
            ));
        }

        if self.receive.visibility_timeout_secs > MAX_VISIBILITY_TIMEOUT_SECS {
            return Err(invalid(
                "receive.visibility_timeout_secs",
                &format!(
                    "{} is outside 0-{}",
                    self.receive.visibility_timeout_secs, MAX_VISIBILITY_TIMEOUT_SECS
                ),
            ));
        }

        if !(self.retry.backoff_multiplier.is_finite() && self.retry.backoff_multiplier >= 1.0) {
            return Err(invalid("retry.backoff_multiplier", "must be at least 1.0"));
        }

        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(invalid(
                "retry.initial_delay_ms",
                "must not be larger than retry.max_delay_ms",
            ));
        }

        // The HTTP timeout has to outlast a long poll
        if self.http_timeout_secs <= u64::from(self.receive.wait_time_secs) {
            return Err(invalid(
                "http_timeout_secs",
                "must be longer than receive.wait_time_secs",
            ));
        }

        Ok(())
    }

    pub fn receive_options(&self) -> ReceiveOptions {
        ReceiveOptions {
            max_messages: self.receive.batch_size,
            visibility_timeout_secs: self.receive.visibility_timeout_secs,
            wait_time_secs: self.receive.wait_time_secs,
        }
    }

    pub fn move_settings(&self) -> MoveSettings {
        MoveSettings {
            receive: self.receive_options(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.initial_delay_ms),
            Duration::from_millis(self.retry.max_delay_ms),
            self.retry.backoff_multiplier,
        );
        if self.retry.jitter {
            policy
        } else {
            policy.without_jitter()
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// Directory holding the optional user configuration file
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqs-mover"))
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        message: message.to_string(),
    }
}
