//! Provider types and configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Enumeration of supported queue providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderType {
    AwsSqs,
    InMemory,
}

impl ProviderType {
    /// Get maximum entries per batch call for provider
    pub fn max_batch_size(&self) -> usize {
        match self {
            Self::AwsSqs => 10,
            Self::InMemory => 10,
        }
    }
}

/// Static AWS credentials used to sign requests
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// AWS SQS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsSqsConfig {
    pub region: String,
    /// Overrides `https://sqs.{region}.amazonaws.com`, e.g. for LocalStack
    pub endpoint_url: Option<String>,
    pub credentials: Option<AwsCredentials>,
    pub http_timeout: Duration,
}

impl AwsSqsConfig {
    /// Configuration for a region with default endpoint and timeout
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            endpoint_url: None,
            credentials: None,
            http_timeout: Duration::from_secs(30),
        }
    }

    /// Endpoint the provider talks to
    pub fn endpoint(&self) -> String {
        match &self.endpoint_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://sqs.{}.amazonaws.com", self.region),
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
