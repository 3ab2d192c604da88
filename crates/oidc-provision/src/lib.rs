//! Provisioning workflow for an AWS STS trusted OIDC identity provider.

pub mod workflow;

pub use workflow::{ProvisionReport, ProvisionStep, Provisioner, TokenReport};
