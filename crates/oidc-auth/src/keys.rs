//! RSA key pair storage.
//!
//! The key pair lives in a fixed subdirectory of a target directory: a PKCS#1
//! private key readable only by its owner and a world-readable SPKI public
//! key. Generation is skipped whenever either file already exists so that a
//! key pair that may already be distributed is never replaced.

use oidc_core::{
    Error, IdentityConfig, IoAction, KeyKind, KeyLayout, Result, validate_key_bits,
};
use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

const PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

const PRIVATE_KEY_MODE: u32 = 0o600;
pub(crate) const PUBLIC_KEY_MODE: u32 = 0o644;

/// Outcome of [`KeyStore::ensure_key_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPairStatus {
    /// A new key pair was written.
    Generated,
    /// At least one key file existed; nothing was written.
    AlreadyPresent,
}

/// On-disk RSA key pair for one target directory.
#[derive(Debug, Clone)]
pub struct KeyStore {
    layout: KeyLayout,
    key_bits: usize,
}

impl KeyStore {
    pub fn new(target_dir: impl AsRef<Path>, config: &IdentityConfig) -> Self {
        Self {
            layout: config.layout(target_dir),
            key_bits: config.key_bits,
        }
    }

    pub fn layout(&self) -> &KeyLayout {
        &self.layout
    }

    /// Generate the key pair unless either key file is already present.
    pub fn ensure_key_pair(&self) -> Result<KeyPairStatus> {
        validate_key_bits(self.key_bits)?;

        let dir = self.layout.dir();
        fs::create_dir_all(dir).map_err(|e| Error::io(IoAction::CreateDir, dir, e))?;

        let private_path = self.layout.private_key();
        let public_path = self.layout.public_key();

        let mut present = false;
        if entry_exists(private_path)? {
            warn!(file = %private_path.display(), "Private key file already exists, skipping creation");
            present = true;
        }
        if entry_exists(public_path)? {
            warn!(file = %public_path.display(), "Public key file already exists, skipping creation");
            present = true;
        }
        if present {
            info!("RSA key pair already exists, skipping creation");
            return Ok(KeyPairStatus::AlreadyPresent);
        }

        info!(bits = self.key_bits, "Generating RSA key pair");
        let private_key = RsaPrivateKey::new(&mut OsRng, self.key_bits)
            .map_err(|e| Error::KeyGeneration(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| Error::Encoding {
                kind: KeyKind::PrivateKey,
                message: e.to_string(),
            })?;
        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| Error::Encoding {
                kind: KeyKind::PublicKey,
                message: e.to_string(),
            })?;

        self.write_pair(private_pem.as_bytes(), public_pem.as_bytes(), commit_new)?;

        info!("RSA key pair generated successfully");
        Ok(KeyPairStatus::Generated)
    }

    /// Stage both PEM files, then move them into place with `commit`.
    ///
    /// A private key whose public half could not be committed is removed.
    fn write_pair<F>(&self, private_pem: &[u8], public_pem: &[u8], commit: F) -> Result<()>
    where
        F: Fn(NamedTempFile, &Path) -> Result<()>,
    {
        let dir = self.layout.dir();
        let private_path = self.layout.private_key();
        let public_path = self.layout.public_key();

        let staged_private = stage(dir, private_pem, PRIVATE_KEY_MODE)?;
        let staged_public = stage(dir, public_pem, PUBLIC_KEY_MODE)?;

        info!(file = %private_path.display(), "Writing private key");
        commit(staged_private, private_path)?;
        debug!(file = %private_path.display(), "Private key written successfully");

        info!(file = %public_path.display(), "Writing public key");
        if let Err(err) = commit(staged_public, public_path) {
            if let Err(cleanup) = fs::remove_file(private_path) {
                warn!(file = %private_path.display(), error = %cleanup, "Failed to remove unpaired private key");
            }
            return Err(err);
        }
        Ok(())
    }

    pub fn load_private_key(&self) -> Result<RsaPrivateKey> {
        load_private_key(&self.layout)
    }

    pub fn load_public_key(&self) -> Result<RsaPublicKey> {
        load_public_key(&self.layout)
    }
}

/// Whether anything, including a dangling symlink, occupies `path`.
fn entry_exists(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(IoAction::Inspect, path, e)),
    }
}

/// Write `contents` to a hidden temporary file in `dir` with `mode` applied.
pub(crate) fn stage(dir: &Path, contents: &[u8], mode: u32) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix(".staged-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::io(IoAction::Write, dir, e))?;

    file.write_all(contents)
        .and_then(|()| file.as_file().sync_all())
        .map_err(|e| Error::io(IoAction::Write, file.path(), e))?;

    set_mode(file.path(), mode)?;
    Ok(file)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| Error::io(IoAction::SetPermissions, path, e))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// Move `staged` to `path`, failing if any entry already exists there.
fn commit_new(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged
        .persist_noclobber(path)
        .map(|_| ())
        .map_err(|e| Error::io(IoAction::Rename, path, e.error))
}

/// Move `staged` to `path`, replacing the previous file.
pub(crate) fn commit_replace(staged: NamedTempFile, path: &Path) -> Result<()> {
    staged
        .persist(path)
        .map(|_| ())
        .map_err(|e| Error::io(IoAction::Rename, path, e.error))
}

/// Read the PKCS#1 private key from `layout`.
pub fn load_private_key(layout: &KeyLayout) -> Result<RsaPrivateKey> {
    let der = read_pem(layout.private_key(), KeyKind::PrivateKey, PRIVATE_KEY_LABEL)?;
    RsaPrivateKey::from_pkcs1_der(&der).map_err(|e| Error::KeyParse {
        kind: KeyKind::PrivateKey,
        message: e.to_string(),
    })
}

/// Read the SPKI public key from `layout`.
pub fn load_public_key(layout: &KeyLayout) -> Result<RsaPublicKey> {
    let der = read_pem(layout.public_key(), KeyKind::PublicKey, PUBLIC_KEY_LABEL)?;
    RsaPublicKey::from_public_key_der(&der).map_err(|e| Error::KeyParse {
        kind: KeyKind::PublicKey,
        message: e.to_string(),
    })
}

fn read_pem(path: &Path, kind: KeyKind, label: &str) -> Result<Vec<u8>> {
    let contents = fs::read(path).map_err(|e| Error::io(IoAction::Read, path, e))?;

    let block = pem::parse(&contents).map_err(|e| Error::PemDecode {
        kind,
        message: e.to_string(),
    })?;
    if block.tag() != label {
        return Err(Error::PemDecode {
            kind,
            message: format!("expected \"{}\" block, found \"{}\"", label, block.tag()),
        });
    }

    Ok(block.into_contents())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> IdentityConfig {
        IdentityConfig::default().with_key_bits(2048)
    }

    #[test]
    fn test_ensure_key_pair_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path(), &test_config());

        assert_eq!(store.ensure_key_pair().unwrap(), KeyPairStatus::Generated);

        let private_before = fs::read(store.layout().private_key()).unwrap();
        let modified_before = fs::metadata(store.layout().private_key())
            .unwrap()
            .modified()
            .unwrap();

        assert_eq!(store.ensure_key_pair().unwrap(), KeyPairStatus::AlreadyPresent);

        let modified_after = fs::metadata(store.layout().private_key())
            .unwrap()
            .modified()
            .unwrap();
        assert_eq!(modified_before, modified_after);
        assert_eq!(private_before, fs::read(store.layout().private_key()).unwrap());
    }

    #[test]
    fn test_partial_pair_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path(), &test_config());
        fs::create_dir_all(store.layout().dir()).unwrap();
        fs::write(store.layout().public_key(), "existing").unwrap();

        assert_eq!(store.ensure_key_pair().unwrap(), KeyPairStatus::AlreadyPresent);
        assert!(!store.layout().private_key().exists());
        assert_eq!(fs::read_to_string(store.layout().public_key()).unwrap(), "existing");
    }

    #[test]
    fn test_unusable_key_size_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path(), &IdentityConfig::default().with_key_bits(1024));

        let err = store.ensure_key_pair().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(!store.layout().dir().exists());

        // A corrected size still generates, since nothing was left behind.
        let store = KeyStore::new(dir.path(), &test_config());
        assert_eq!(store.ensure_key_pair().unwrap(), KeyPairStatus::Generated);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_counts_as_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path(), &test_config());
        fs::create_dir_all(store.layout().dir()).unwrap();
        std::os::unix::fs::symlink(
            store.layout().dir().join("missing-target.pem"),
            store.layout().private_key(),
        )
        .unwrap();

        assert_eq!(store.ensure_key_pair().unwrap(), KeyPairStatus::AlreadyPresent);

        let metadata = fs::symlink_metadata(store.layout().private_key()).unwrap();
        assert!(metadata.file_type().is_symlink());
        assert!(fs::symlink_metadata(store.layout().public_key()).is_err());
    }

    #[test]
    fn test_commit_never_replaces_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path(), &test_config());
        fs::create_dir_all(store.layout().dir()).unwrap();
        fs::write(store.layout().private_key(), "existing").unwrap();

        let err = store
            .write_pair(b"private", b"public", commit_new)
            .unwrap_err();

        assert!(matches!(err, Error::Io { action: IoAction::Rename, .. }));
        assert_eq!(fs::read_to_string(store.layout().private_key()).unwrap(), "existing");
        assert!(!store.layout().public_key().exists());
    }

    #[test]
    fn test_failed_public_commit_removes_private_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path(), &test_config());
        fs::create_dir_all(store.layout().dir()).unwrap();
        let public_path = store.layout().public_key().to_path_buf();

        let err = store
            .write_pair(b"private", b"public", |staged, path| {
                if path == public_path.as_path() {
                    Err(Error::io(
                        IoAction::Rename,
                        path,
                        std::io::Error::other("disk full"),
                    ))
                } else {
                    commit_new(staged, path)
                }
            })
            .unwrap_err();

        assert!(matches!(err, Error::Io { action: IoAction::Rename, .. }));
        assert!(!store.layout().private_key().exists());
        assert!(!store.layout().public_key().exists());
        // Staging files are cleaned up as well.
        assert_eq!(fs::read_dir(store.layout().dir()).unwrap().count(), 0);
    }

    #[test]
    fn test_generated_pair_loads_and_matches() {
        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path(), &test_config());
        store.ensure_key_pair().unwrap();

        let private_key = store.load_private_key().unwrap();
        let public_key = store.load_public_key().unwrap();
        assert_eq!(RsaPublicKey::from(&private_key), public_key);

        // No staging files are left next to the keys.
        let entries: Vec<_> = fs::read_dir(store.layout().dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = KeyStore::new(dir.path(), &test_config());
        store.ensure_key_pair().unwrap();

        let private_mode = fs::metadata(store.layout().private_key()).unwrap().permissions().mode();
        let public_mode = fs::metadata(store.layout().public_key()).unwrap().permissions().mode();
        assert_eq!(private_mode & 0o777, 0o600);
        assert_eq!(public_mode & 0o777, 0o644);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = test_config().layout(dir.path());

        let err = load_private_key(&layout).unwrap_err();
        assert!(matches!(err, Error::Io { action: IoAction::Read, .. }));
    }

    #[test]
    fn test_garbage_is_pem_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = test_config().layout(dir.path());
        fs::create_dir_all(layout.dir()).unwrap();
        fs::write(layout.public_key(), "not a pem file").unwrap();

        let err = load_public_key(&layout).unwrap_err();
        assert!(matches!(err, Error::PemDecode { kind: KeyKind::PublicKey, .. }));
    }

    #[test]
    fn test_wrong_label_is_pem_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = test_config().layout(dir.path());
        fs::create_dir_all(layout.dir()).unwrap();
        fs::write(
            layout.private_key(),
            pem::encode(&pem::Pem::new("CERTIFICATE", vec![0x30, 0x00])),
        )
        .unwrap();

        let err = load_private_key(&layout).unwrap_err();
        assert!(matches!(err, Error::PemDecode { kind: KeyKind::PrivateKey, .. }));
    }

    #[test]
    fn test_bad_der_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let layout = test_config().layout(dir.path());
        fs::create_dir_all(layout.dir()).unwrap();
        fs::write(
            layout.private_key(),
            pem::encode(&pem::Pem::new(PRIVATE_KEY_LABEL, vec![1, 2, 3, 4])),
        )
        .unwrap();

        let err = load_private_key(&layout).unwrap_err();
        assert!(matches!(err, Error::KeyParse { kind: KeyKind::PrivateKey, .. }));
    }
}
