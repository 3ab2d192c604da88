//! AWS SDK client for STS and S3.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use oidc_core::{BucketLocation, CallerIdentity, CloudClient, CloudConnector, Error, Result};
use tracing::{debug, info};

/// The one region S3 rejects as an explicit location constraint.
const DEFAULT_S3_REGION: &str = "us-east-1";

/// STS and S3 clients sharing one SDK configuration.
#[derive(Debug, Clone)]
pub struct AwsServiceClient {
    sts: aws_sdk_sts::Client,
    s3: aws_sdk_s3::Client,
}

impl AwsServiceClient {
    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self {
            sts: aws_sdk_sts::Client::new(config),
            s3: aws_sdk_s3::Client::new(config),
        }
    }

    /// Load the default credential chain and configuration for `region`.
    ///
    /// Credentials are resolved lazily, so missing credentials surface on the
    /// first request.
    pub async fn for_region(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        debug!(region, "Loaded AWS SDK configuration");

        Self::from_conf(&config)
    }
}

#[async_trait]
impl CloudClient for AwsServiceClient {
    async fn caller_identity(&self) -> Result<CallerIdentity> {
        let output = self.sts.get_caller_identity().send().await.map_err(|e| {
            Error::CallerIdentity(aws_sdk_sts::error::DisplayErrorContext(&e).to_string())
        })?;

        Ok(CallerIdentity {
            account: output.account().map(str::to_string),
            arn: output.arn().map(str::to_string),
            user_id: output.user_id().map(str::to_string),
        })
    }

    async fn create_bucket(&self, name: &str, region: &str) -> Result<BucketLocation> {
        info!(bucket = name, region, "Creating S3 bucket");

        let mut request = self.s3.create_bucket().bucket(name);
        if let Some(constraint) = location_constraint(region) {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }

        let output = request.send().await.map_err(|e| Error::CreateBucket {
            bucket: name.to_string(),
            message: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
        })?;

        info!(bucket = name, "S3 bucket created successfully");
        Ok(BucketLocation {
            bucket: name.to_string(),
            region: region.to_string(),
            location: output.location().map(str::to_string),
        })
    }
}

/// Location constraint for a bucket in `region`, if one must be sent.
pub fn location_constraint(region: &str) -> Option<BucketLocationConstraint> {
    if region == DEFAULT_S3_REGION {
        None
    } else {
        Some(BucketLocationConstraint::from(region))
    }
}

/// Connector building [`AwsServiceClient`]s from the default AWS configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsConnector;

#[async_trait]
impl CloudConnector for AwsConnector {
    async fn connect(&self, region: &str) -> Result<Box<dyn CloudClient>> {
        let client = AwsServiceClient::for_region(region).await;
        Ok(Box::new(client))
    }
}
