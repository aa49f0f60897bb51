//! AWS credential discovery.
//!
//! Credentials come from the AWS SDK default provider chain: environment
//! variables, the shared config and credentials files (including SSO and
//! assumed-role profiles), web identity tokens, container credentials and
//! the EC2 instance metadata service. `--profile` selects the profile used
//! by the file-based providers.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::provider::error::CredentialsError as ProviderError;
use aws_credential_types::provider::ProvideCredentials;
use sqs_mover_runtime::AwsCredentials;
use std::error::Error as StdError;
use tracing::debug;

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;

/// Errors raised while looking up credentials
#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("No AWS credentials found: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: ProviderError,
    },

    #[error("No AWS credentials provider is configured")]
    NoProvider,
}

impl From<ProviderError> for CredentialsError {
    fn from(source: ProviderError) -> Self {
        Self::Unavailable {
            message: error_chain(&source),
            source,
        }
    }
}

/// Finds the credentials used to sign SQS requests
#[derive(Debug, Clone)]
pub struct CredentialsResolver {
    region: String,
    profile: Option<String>,
}

impl CredentialsResolver {
    pub fn new(region: impl Into<String>, profile: Option<String>) -> Self {
        Self {
            region: region.into(),
            profile: profile.filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Run the default chain once and take a snapshot of what it returns
    pub async fn resolve(&self) -> Result<AwsCredentials, CredentialsError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()));
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        let provider = sdk_config
            .credentials_provider()
            .ok_or(CredentialsError::NoProvider)?;
        let credentials = provider.provide_credentials().await?;

        debug!(
            profile = self.profile.as_deref().unwrap_or("default"),
            expires = credentials.expiry().is_some(),
            "Loaded AWS credentials"
        );

        Ok(AwsCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().map(str::to_string),
        })
    }
}

/// The provider errors keep the useful detail in their sources
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut current = error.source();
    while let Some(cause) = current {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        current = cause.source();
    }
    message
}
