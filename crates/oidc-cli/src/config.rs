//! CLI configuration management.

use oidc_core::IdentityConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Token claims, key size and key file names.
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl CliConfig {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path() {
                Ok(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("failed to read config file {}: {}", path.display(), e))?;
        let config = Self::from_yaml(&content)
            .map_err(|e| format!("invalid config file {}: {}", path.display(), e))?;
        config
            .identity
            .validate()
            .map_err(|e| format!("invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Parse configuration from YAML.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Get the configuration file path.
    pub fn config_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        let dirs = directories::ProjectDirs::from("io", "aws-oidc-sts", "aws-oidc-sts")
            .ok_or("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CliConfig::from_yaml("{}").unwrap();
        assert_eq!(config.identity, IdentityConfig::default());
        assert!(config.log_filter.is_none());
    }

    #[test]
    fn test_identity_overrides() {
        let yaml = r#"
identity:
  issuer: https://my-oidc-bucket.s3.us-east-1.amazonaws.com
  subject: deploy-bot
  token_ttl_secs: 3600
log_filter: debug
"#;
        let config = CliConfig::from_yaml(yaml).unwrap();

        assert_eq!(
            config.identity.issuer,
            "https://my-oidc-bucket.s3.us-east-1.amazonaws.com"
        );
        assert_eq!(config.identity.subject, "deploy-bot");
        assert_eq!(config.identity.token_ttl_secs, 3600);
        assert_eq!(config.identity.audience, "sts.amazonaws.com");
        assert_eq!(config.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(CliConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "identity:\n  key_bits: 3072\n").unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.identity.key_bits, 3072);
    }

    #[test]
    fn test_unusable_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        std::fs::write(&path, "identity:\n  key_bits: 1024\n").unwrap();
        assert!(CliConfig::load(Some(&path)).is_err());

        std::fs::write(&path, "identity:\n  token_ttl_secs: 0\n").unwrap();
        assert!(CliConfig::load(Some(&path)).is_err());
    }
}
