//! Identity provider provisioning workflow.
//!
//! Steps run strictly in order and the first failure stops the workflow:
//!
//! ```text
//! validate target -> validate config -> ensure key pair -> build JWKS -> sign JWT
//!     -> resolve cloud client -> verify identity -> create bucket
//! ```
//!
//! Nothing is rolled back. Re-running the workflow reuses the existing key
//! pair and rewrites the JWKS; bucket creation is the only step that fails
//! when repeated.

use oidc_auth::{JwtSigner, KeyPairStatus, KeyStore, SigningKey, build_jwks};
use oidc_aws::{AwsService, ProvisionedResource, ProvisionedService, ServiceKind};
use oidc_core::{
    BucketLocation, CallerIdentity, CloudConnector, IdentityConfig, ProvisioningTarget, Result,
};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A step of the provisioning workflow, named in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStep {
    ValidateTarget,
    ValidateConfig,
    EnsureKeyPair,
    BuildJwks,
    SignToken,
    ResolveClient,
    VerifyIdentity,
    CreateBucket,
}

impl fmt::Display for ProvisionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            ProvisionStep::ValidateTarget => "validate provisioning target",
            ProvisionStep::ValidateConfig => "validate configuration",
            ProvisionStep::EnsureKeyPair => "create RSA key pair",
            ProvisionStep::BuildJwks => "create JSON Web Key Set",
            ProvisionStep::SignToken => "create JWT",
            ProvisionStep::ResolveClient => "create AWS client",
            ProvisionStep::VerifyIdentity => "get AWS client identity",
            ProvisionStep::CreateBucket => "create S3 bucket",
        };
        f.write_str(step)
    }
}

fn step<T>(step: ProvisionStep, result: Result<T>) -> Result<T> {
    result.map_err(|e| e.in_step(step))
}

/// Local identity material produced by [`Provisioner::create_token`].
#[derive(Debug, Clone)]
pub struct TokenReport {
    pub key_pair: KeyPairStatus,
    pub kid: String,
    pub jwks_path: PathBuf,
    pub token: String,
}

/// Everything produced by a successful provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionReport {
    pub key_pair: KeyPairStatus,
    pub kid: String,
    pub jwks_path: PathBuf,
    pub token: String,
    pub identity: CallerIdentity,
    pub bucket: BucketLocation,
}

/// Runs the identity provider workflow against one target directory.
pub struct Provisioner<C> {
    config: IdentityConfig,
    keys: KeyStore,
    connector: C,
}

impl<C> Provisioner<C> {
    pub fn new(config: IdentityConfig, target_dir: impl AsRef<Path>, connector: C) -> Self {
        let keys = KeyStore::new(target_dir, &config);
        Self {
            config,
            keys,
            connector,
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.config
    }

    pub fn key_store(&self) -> &KeyStore {
        &self.keys
    }

    /// Generate the RSA key pair unless one is already present.
    pub fn create_key_pair(&self) -> Result<KeyPairStatus> {
        step(ProvisionStep::ValidateConfig, self.config.validate())?;
        step(ProvisionStep::EnsureKeyPair, self.keys.ensure_key_pair())
    }

    /// Ensure the key pair and write the JWKS.
    pub fn create_jwks(&self) -> Result<(KeyPairStatus, SigningKey)> {
        let status = self.create_key_pair()?;
        let signing_key = step(ProvisionStep::BuildJwks, build_jwks(self.keys.layout()))?;
        Ok((status, signing_key))
    }

    /// Ensure the key pair, write the JWKS and sign a token with the key.
    pub fn create_token(&self) -> Result<TokenReport> {
        let (key_pair, signing_key) = self.create_jwks()?;

        let token = step(
            ProvisionStep::SignToken,
            JwtSigner::new(self.config.clone())
                .sign(&signing_key)
                .map_err(Into::into),
        )?;
        info!(kid = %signing_key.kid(), jwt = %token, "JWT created successfully");

        Ok(TokenReport {
            key_pair,
            kid: signing_key.kid().to_string(),
            jwks_path: self.keys.layout().jwks().to_path_buf(),
            token,
        })
    }
}

impl<C: CloudConnector> Provisioner<C> {
    /// Run the full workflow: local identity material, then the S3 bucket.
    pub async fn create_identity_provider(
        &self,
        bucket: &str,
        region: &str,
    ) -> Result<ProvisionReport> {
        let target = step(
            ProvisionStep::ValidateTarget,
            ProvisioningTarget::new(bucket, region),
        )?;
        debug!(target = %target, "Provisioning identity provider");

        let local = self.create_token()?;

        let client = step(
            ProvisionStep::ResolveClient,
            self.connector.connect(target.region()).await,
        )?;

        let identity = step(ProvisionStep::VerifyIdentity, client.caller_identity().await)?;
        info!(
            account = identity.account.as_deref().unwrap_or_default(),
            arn = identity.arn.as_deref().unwrap_or_default(),
            region = target.region(),
            user_id = identity.user_id.as_deref().unwrap_or_default(),
            "AWS client identity"
        );

        let service = AwsService::build(ServiceKind::Bucket, client.as_ref(), &target);
        let ProvisionedResource::Bucket(bucket) =
            step(ProvisionStep::CreateBucket, service.create().await)?;
        info!(
            bucket = %bucket.bucket,
            location = bucket.location.as_deref().unwrap_or_default(),
            "S3 bucket created successfully"
        );

        Ok(ProvisionReport {
            key_pair: local.key_pair,
            kid: local.kid,
            jwks_path: local.jwks_path,
            token: local.token,
            identity,
            bucket,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        assert_eq!(ProvisionStep::BuildJwks.to_string(), "create JSON Web Key Set");
        assert_eq!(ProvisionStep::CreateBucket.to_string(), "create S3 bucket");
    }

    #[test]
    fn test_step_wraps_error() {
        let result: Result<()> = Err(oidc_core::Error::CloudConfig("no region".to_string()));
        let err = step(ProvisionStep::ResolveClient, result).unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to create AWS client: unable to load cloud configuration: no region"
        );
    }
}
