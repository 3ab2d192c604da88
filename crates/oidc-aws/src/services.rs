//! AWS services the identity provider can provision.
//!
//! The set of services is closed: [`AwsService::build`] maps a
//! [`ServiceKind`] to its concrete implementation, and every implementation
//! exposes the same [`ProvisionedService`] capability.

use async_trait::async_trait;
use oidc_core::{BucketLocation, CloudClient, Error, ProvisioningTarget, Result};
use std::fmt;

/// Kinds of AWS services known to the provisioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// S3 bucket hosting the JWKS and discovery document.
    Bucket,
    /// CloudFront distribution in front of the bucket.
    Distribution,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Bucket => f.write_str("s3 bucket"),
            ServiceKind::Distribution => f.write_str("cloudfront distribution"),
        }
    }
}

/// A resource created by a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionedResource {
    Bucket(BucketLocation),
}

/// Capability shared by every provisionable service.
#[async_trait]
pub trait ProvisionedService: Send + Sync {
    fn kind(&self) -> ServiceKind;

    async fn create(&self) -> Result<ProvisionedResource>;
}

/// S3 bucket for the provisioning target.
pub struct BucketService<'a> {
    client: &'a dyn CloudClient,
    target: ProvisioningTarget,
}

impl<'a> BucketService<'a> {
    pub fn new(client: &'a dyn CloudClient, target: ProvisioningTarget) -> Self {
        Self { client, target }
    }
}

#[async_trait]
impl<'a> ProvisionedService for BucketService<'a> {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Bucket
    }

    async fn create(&self) -> Result<ProvisionedResource> {
        let location = self
            .client
            .create_bucket(self.target.bucket(), self.target.region())
            .await?;
        Ok(ProvisionedResource::Bucket(location))
    }
}

/// CloudFront distribution named after the bucket.
#[derive(Debug, Clone)]
pub struct DistributionService {
    name: String,
}

impl DistributionService {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl ProvisionedService for DistributionService {
    fn kind(&self) -> ServiceKind {
        ServiceKind::Distribution
    }

    async fn create(&self) -> Result<ProvisionedResource> {
        Err(Error::UnsupportedService(format!(
            "{} {} cannot be provisioned by this workflow",
            self.kind(),
            self.name
        )))
    }
}

/// A concrete AWS service selected by [`ServiceKind`].
pub enum AwsService<'a> {
    Bucket(BucketService<'a>),
    Distribution(DistributionService),
}

impl<'a> AwsService<'a> {
    /// Construct the service for `kind` against `target`.
    pub fn build(kind: ServiceKind, client: &'a dyn CloudClient, target: &ProvisioningTarget) -> Self {
        match kind {
            ServiceKind::Bucket => AwsService::Bucket(BucketService::new(client, target.clone())),
            ServiceKind::Distribution => {
                AwsService::Distribution(DistributionService::new(target.bucket()))
            }
        }
    }

    fn as_service(&self) -> &dyn ProvisionedService {
        match self {
            AwsService::Bucket(service) => service,
            AwsService::Distribution(service) => service,
        }
    }
}

#[async_trait]
impl<'a> ProvisionedService for AwsService<'a> {
    fn kind(&self) -> ServiceKind {
        self.as_service().kind()
    }

    async fn create(&self) -> Result<ProvisionedResource> {
        self.as_service().create().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oidc_core::CallerIdentity;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        buckets: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl CloudClient for RecordingClient {
        async fn caller_identity(&self) -> Result<CallerIdentity> {
            Ok(CallerIdentity::default())
        }

        async fn create_bucket(&self, name: &str, region: &str) -> Result<BucketLocation> {
            self.buckets
                .lock()
                .unwrap()
                .push((name.to_string(), region.to_string()));
            Ok(BucketLocation {
                bucket: name.to_string(),
                region: region.to_string(),
                location: Some(format!("/{}", name)),
            })
        }
    }

    #[tokio::test]
    async fn test_bucket_dispatch_creates_bucket() {
        let client = RecordingClient::default();
        let target = ProvisioningTarget::new("my-oidc-bucket", "eu-west-1").unwrap();

        let service = AwsService::build(ServiceKind::Bucket, &client, &target);
        assert_eq!(service.kind(), ServiceKind::Bucket);

        let resource = service.create().await.unwrap();
        assert!(matches!(resource, ProvisionedResource::Bucket(ref loc) if loc.bucket == "my-oidc-bucket"));
        assert_eq!(
            client.buckets.lock().unwrap().as_slice(),
            &[("my-oidc-bucket".to_string(), "eu-west-1".to_string())]
        );
    }

    #[tokio::test]
    async fn test_distribution_dispatch_is_unsupported() {
        let client = RecordingClient::default();
        let target = ProvisioningTarget::new("my-oidc-bucket", "eu-west-1").unwrap();

        let service = AwsService::build(ServiceKind::Distribution, &client, &target);
        assert_eq!(service.kind(), ServiceKind::Distribution);

        let err = service.create().await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedService(_)));
        assert!(client.buckets.lock().unwrap().is_empty());
    }
}
