//! JWKS generation from the stored key pair.

use crate::keys::{PUBLIC_KEY_MODE, commit_replace, load_private_key, load_public_key, stage};
use crate::oidc::{Jwk, Jwks};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, EncodingKey};
use oidc_core::{Error, KeyKind, KeyLayout, Result};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::EncodePublicKey;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// `use` parameter of the published key.
pub const KEY_USE_SIGNATURE: &str = "sig";

/// Hex-encoded SHA-256 of the DER (SPKI) encoding of `public_key`.
pub fn key_id(public_key: &RsaPublicKey) -> Result<String> {
    let der = public_key
        .to_public_key_der()
        .map_err(|e| Error::Encoding {
            kind: KeyKind::PublicKey,
            message: e.to_string(),
        })?;
    Ok(hex::encode(Sha256::digest(der.as_bytes())))
}

/// In-memory RS256 signing key tagged with its key ID.
///
/// Holds private key material and is never written to disk.
pub struct SigningKey {
    kid: String,
    jwk: Jwk,
    encoding_key: EncodingKey,
}

impl SigningKey {
    /// Import `private_key` as an RS256 signing key identified by `kid`.
    pub fn from_private_key(private_key: &RsaPrivateKey, kid: impl Into<String>) -> Result<Self> {
        let kid = kid.into();
        let der = private_key.to_pkcs1_der().map_err(|e| Error::Encoding {
            kind: KeyKind::PrivateKey,
            message: e.to_string(),
        })?;

        let public_key = private_key.to_public_key();
        let jwk = Jwk {
            kty: "RSA".to_string(),
            n: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            e: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
            kid: kid.clone(),
            key_use: KEY_USE_SIGNATURE.to_string(),
            alg: "RS256".to_string(),
        };

        Ok(Self {
            kid,
            jwk,
            encoding_key: EncodingKey::from_rsa_der(der.as_bytes()),
        })
    }

    pub fn kid(&self) -> &str {
        &self.kid
    }

    pub fn algorithm(&self) -> Algorithm {
        Algorithm::RS256
    }

    /// Public half of this key, as published in the JWKS.
    pub fn public_jwk(&self) -> &Jwk {
        &self.jwk
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("kid", &self.kid)
            .field("encoding_key", &"<EncodingKey>")
            .finish()
    }
}

/// Build the JWKS for the key pair in `layout`, write it to the JWKS file and
/// return the signing key.
pub fn build_jwks(layout: &KeyLayout) -> Result<SigningKey> {
    let private_key = load_private_key(layout)?;
    let public_key = load_public_key(layout)?;

    if private_key.to_public_key() != public_key {
        return Err(Error::KeyMismatch {
            path: layout.public_key().to_path_buf(),
        });
    }

    let kid = key_id(&public_key)?;
    debug!(kid = %kid, "Derived key ID from public key");

    let signing_key = SigningKey::from_private_key(&private_key, kid)?;

    let mut jwks = Jwks::new();
    jwks.add_key(signing_key.public_jwk().clone());
    let json = jwks.to_json_pretty()?;

    let path = layout.jwks();
    let staged = stage(layout.dir(), json.as_bytes(), PUBLIC_KEY_MODE)?;
    commit_replace(staged, path)?;
    info!(file = %path.display(), kid = %signing_key.kid(), "JSON Web Key Set written");

    Ok(signing_key)
}
