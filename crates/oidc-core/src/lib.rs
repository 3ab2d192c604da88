//! aws-oidc-sts core
//!
//! Shared configuration, error handling and port traits for bootstrapping an
//! OpenID Connect identity provider trusted by AWS STS. This crate has
//! minimal dependencies; key handling and cloud adapters live elsewhere.

pub mod cloud;
pub mod config;
pub mod error;
pub mod ports;

pub use cloud::{BucketLocation, CallerIdentity, ProvisioningTarget};
pub use config::{
    IdentityConfig, KeyLayout, MAX_KEY_BITS, MAX_TOKEN_TTL_SECS, MIN_KEY_BITS, validate_key_bits,
    validate_token_ttl,
};
pub use error::{Error, IoAction, KeyKind, Result};
pub use ports::{CloudClient, CloudConnector};
