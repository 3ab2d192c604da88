//! Cloud-side domain types.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bucket and region the identity provider is provisioned into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningTarget {
    bucket: String,
    region: String,
}

impl ProvisioningTarget {
    /// Validate and build a target. Both fields must be non-blank.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into().trim().to_string();
        let region = region.into().trim().to_string();

        if bucket.is_empty() {
            return Err(Error::InvalidTarget("bucket name is required".to_string()));
        }
        if region.is_empty() {
            return Err(Error::InvalidTarget("region is required".to_string()));
        }

        Ok(Self { bucket, region })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

impl fmt::Display for ProvisioningTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{} ({})", self.bucket, self.region)
    }
}

/// Identity of the credentials in effect, as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub account: Option<String>,
    pub arn: Option<String>,
    pub user_id: Option<String>,
}

/// Result of a successful bucket creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketLocation {
    pub bucket: String,
    pub region: String,
    /// Location returned by the provider, when it reports one.
    pub location: Option<String>,
}
