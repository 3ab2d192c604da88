//! Identity provider configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// RSA modulus sizes the RS256 signer accepts.
pub const MIN_KEY_BITS: usize = 2048;
pub const MAX_KEY_BITS: usize = 4096;

/// Longest token lifetime that may be configured (one year).
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Settings shared by every step of the identity provider workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// `iss` claim of issued tokens.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// `aud` claim of issued tokens.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// `sub` claim of issued tokens.
    #[serde(default = "default_subject")]
    pub subject: String,
    /// Token lifetime in seconds.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,
    /// RSA modulus size for newly generated keys.
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,
    /// Subdirectory of the target directory holding the key material.
    #[serde(default = "default_key_dir")]
    pub key_dir: String,
    #[serde(default = "default_private_key_file")]
    pub private_key_file: String,
    #[serde(default = "default_public_key_file")]
    pub public_key_file: String,
    #[serde(default = "default_jwks_file")]
    pub jwks_file: String,
}

fn default_issuer() -> String {
    "https://example.com".to_string()
}

fn default_audience() -> String {
    "sts.amazonaws.com".to_string()
}

fn default_subject() -> String {
    "aws-oidc-sts".to_string()
}

fn default_token_ttl_secs() -> i64 {
    86400 // 24 hours
}

fn default_key_bits() -> usize {
    4096
}

fn default_key_dir() -> String {
    "tls".to_string()
}

fn default_private_key_file() -> String {
    "private-key.pem".to_string()
}

fn default_public_key_file() -> String {
    "public-key.pem".to_string()
}

fn default_jwks_file() -> String {
    "jwks.json".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            audience: default_audience(),
            subject: default_subject(),
            token_ttl_secs: default_token_ttl_secs(),
            key_bits: default_key_bits(),
            key_dir: default_key_dir(),
            private_key_file: default_private_key_file(),
            public_key_file: default_public_key_file(),
            jwks_file: default_jwks_file(),
        }
    }
}

impl IdentityConfig {
    /// Set the token issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Set the token audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Set the token subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the token lifetime.
    pub fn with_token_ttl_secs(mut self, ttl: i64) -> Self {
        self.token_ttl_secs = ttl;
        self
    }

    /// Set the RSA key size used when generating a new pair.
    pub fn with_key_bits(mut self, bits: usize) -> Self {
        self.key_bits = bits;
        self
    }

    /// Reject settings that would produce unusable keys or tokens.
    pub fn validate(&self) -> Result<()> {
        validate_key_bits(self.key_bits)?;
        validate_token_ttl(self.token_ttl_secs)
    }

    /// Resolve the key file layout under `target_dir`.
    pub fn layout(&self, target_dir: impl AsRef<Path>) -> KeyLayout {
        KeyLayout::new(target_dir, self)
    }
}

/// Check that `bits` is a modulus size the signer can use.
pub fn validate_key_bits(bits: usize) -> Result<()> {
    if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
        return Err(Error::InvalidConfig(format!(
            "key_bits must be between {} and {}, got {}",
            MIN_KEY_BITS, MAX_KEY_BITS, bits
        )));
    }
    Ok(())
}

/// Check that `secs` is a positive token lifetime of at most a year.
pub fn validate_token_ttl(secs: i64) -> Result<()> {
    if secs <= 0 || secs > MAX_TOKEN_TTL_SECS {
        return Err(Error::InvalidConfig(format!(
            "token_ttl_secs must be between 1 and {}, got {}",
            MAX_TOKEN_TTL_SECS, secs
        )));
    }
    Ok(())
}

/// Absolute locations of the key material for one target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLayout {
    dir: PathBuf,
    private_key: PathBuf,
    public_key: PathBuf,
    jwks: PathBuf,
}

impl KeyLayout {
    pub fn new(target_dir: impl AsRef<Path>, config: &IdentityConfig) -> Self {
        let dir = target_dir.as_ref().join(&config.key_dir);
        Self {
            private_key: dir.join(&config.private_key_file),
            public_key: dir.join(&config.public_key_file),
            jwks: dir.join(&config.jwks_file),
            dir,
        }
    }

    /// Directory holding all key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn private_key(&self) -> &Path {
        &self.private_key
    }

    pub fn public_key(&self) -> &Path {
        &self.public_key
    }

    pub fn jwks(&self) -> &Path {
        &self.jwks
    }
}
