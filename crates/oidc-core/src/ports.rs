//! Port traits.
//!
//! These traits define the interfaces between the provisioning workflow and
//! the cloud adapters that talk to a provider.

use crate::Result;
use crate::cloud::{BucketLocation, CallerIdentity};
use async_trait::async_trait;

/// Remote operations the provisioning workflow needs from a cloud provider.
#[async_trait]
pub trait CloudClient: Send + Sync {
    /// Identity of the credentials in effect.
    async fn caller_identity(&self) -> Result<CallerIdentity>;

    /// Create a bucket in `region`. An existing bucket is an error.
    async fn create_bucket(&self, name: &str, region: &str) -> Result<BucketLocation>;
}

/// Resolves provider configuration and credentials into a client.
#[async_trait]
pub trait CloudConnector: Send + Sync {
    async fn connect(&self, region: &str) -> Result<Box<dyn CloudClient>>;
}
