//! Error types for aws-oidc-sts.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Local filesystem errors
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: IoAction,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Key material errors
    #[error("failed to generate RSA private key: {0}")]
    KeyGeneration(String),

    #[error("failed to encode {kind}: {message}")]
    Encoding { kind: KeyKind, message: String },

    #[error("failed to decode PEM block containing {kind}: {message}")]
    PemDecode { kind: KeyKind, message: String },

    #[error("failed to parse {kind}: {message}")]
    KeyParse { kind: KeyKind, message: String },

    #[error("public key in {} does not match the private key", path.display())]
    KeyMismatch { path: PathBuf },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Token errors
    #[error("failed to sign JWT: {0}")]
    Token(String),

    // Provisioning errors
    #[error("Invalid provisioning target: {0}")]
    InvalidTarget(String),

    #[error("unable to load cloud configuration: {0}")]
    CloudConfig(String),

    #[error("failed to get caller identity: {0}")]
    CallerIdentity(String),

    #[error("failed to create bucket {bucket}: {message}")]
    CreateBucket { bucket: String, message: String },

    #[error("Unsupported service: {0}")]
    UnsupportedService(String),

    /// A workflow step failed; `source` carries the underlying cause.
    #[error("failed to {step}: {source}")]
    Step {
        step: String,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(action: IoAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Wrap this error with the name of the workflow step that produced it.
    pub fn in_step(self, step: impl fmt::Display) -> Self {
        Error::Step {
            step: step.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping any `Step` wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Filesystem operation that failed, used to prefix I/O errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    CreateDir,
    Inspect,
    Read,
    Write,
    SetPermissions,
    Rename,
}

impl fmt::Display for IoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            IoAction::CreateDir => "create directory",
            IoAction::Inspect => "inspect",
            IoAction::Read => "read",
            IoAction::Write => "write",
            IoAction::SetPermissions => "set permissions on",
            IoAction::Rename => "move into place",
        };
        f.write_str(action)
    }
}

/// Which half of the key pair an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    PrivateKey,
    PublicKey,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::PrivateKey => f.write_str("private key"),
            KeyKind::PublicKey => f.write_str("public key"),
        }
    }
}
