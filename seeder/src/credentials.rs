use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_secretsmanager::{config::Region, error::DisplayErrorContext, Client};
use dbseed_common::DatabaseCredentials;
use tracing::debug;

use crate::error::CredentialsError;

/// Source of the connection parameters for the database host
#[async_trait]
pub trait CredentialResolver: Send + Sync {
    async fn resolve(
        &self,
        secret_name: &str,
        region: &str,
    ) -> Result<DatabaseCredentials, CredentialsError>;
}

/// Reads credentials from AWS Secrets Manager. Every call performs a fresh lookup.
pub struct SecretsManagerResolver {
    sdk_config: SdkConfig,
}

impl SecretsManagerResolver {
    /// Load the ambient AWS environment (execution role, default region, ...)
    pub async fn from_env() -> Self {
        Self::new(aws_config::load_defaults(BehaviorVersion::latest()).await)
    }

    pub fn new(sdk_config: SdkConfig) -> Self {
        Self { sdk_config }
    }

    fn client(&self, region: &str) -> Client {
        let config = aws_sdk_secretsmanager::config::Builder::from(&self.sdk_config)
            .region(Region::new(region.to_string()))
            .build();

        Client::from_conf(config)
    }
}

#[async_trait]
impl CredentialResolver for SecretsManagerResolver {
    #[tracing::instrument(skip(self))]
    async fn resolve(
        &self,
        secret_name: &str,
        region: &str,
    ) -> Result<DatabaseCredentials, CredentialsError> {
        let output = self
            .client(region)
            .get_secret_value()
            .secret_id(secret_name)
            .send()
            .await
            .map_err(|e| CredentialsError::Lookup {
                secret_name: secret_name.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        let secret_string =
            output
                .secret_string()
                .ok_or_else(|| CredentialsError::MissingSecretString {
                    secret_name: secret_name.to_string(),
                })?;

        let credentials = DatabaseCredentials::from_secret_string(secret_string)?;
        debug!(address = %credentials.address(), "resolved database credentials");

        Ok(credentials)
    }
}
