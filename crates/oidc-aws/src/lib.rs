//! AWS adapters for aws-oidc-sts.
//!
//! Implements the cloud ports from `oidc-core` on top of the AWS SDK and
//! maps service kinds to the AWS services that can be provisioned.

pub mod client;
pub mod services;

pub use client::{AwsConnector, AwsServiceClient, location_constraint};
pub use services::{
    AwsService, BucketService, DistributionService, ProvisionedResource, ProvisionedService,
    ServiceKind,
};
