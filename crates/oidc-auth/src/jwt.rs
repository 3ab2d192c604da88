//! JWT generation for the identity provider.

use crate::jwks::SigningKey;
use crate::oidc::Jwk;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Header, Validation, decode, encode};
use oidc_core::{IdentityConfig, validate_token_ttl};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("Token expired")]
    Expired,
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),
}

impl From<JwtError> for oidc_core::Error {
    fn from(err: JwtError) -> Self {
        oidc_core::Error::Token(err.to_string())
    }
}

/// Claims asserted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl IdentityClaims {
    /// Claims issued at `now`, expiring `config.token_ttl_secs` later.
    pub fn issued_at(config: &IdentityConfig, now: DateTime<Utc>) -> Result<Self, JwtError> {
        validate_token_ttl(config.token_ttl_secs)
            .map_err(|e| JwtError::InvalidClaims(e.to_string()))?;

        let exp = TimeDelta::try_seconds(config.token_ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                JwtError::InvalidClaims(format!(
                    "token lifetime of {}s is out of range",
                    config.token_ttl_secs
                ))
            })?;

        Ok(Self {
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
            sub: config.subject.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

/// JWT signer for provider tokens.
pub struct JwtSigner {
    config: IdentityConfig,
}

impl JwtSigner {
    pub fn new(config: IdentityConfig) -> Self {
        Self { config }
    }

    /// Sign a token issued now.
    pub fn sign(&self, key: &SigningKey) -> Result<String, JwtError> {
        self.sign_at(key, Utc::now())
    }

    /// Sign a token issued at `now`.
    pub fn sign_at(&self, key: &SigningKey, now: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = IdentityClaims::issued_at(&self.config, now)?;

        let mut header = Header::new(key.algorithm());
        header.kid = Some(key.kid().to_string());

        let token = encode(&header, &claims, key.encoding_key())?;
        Ok(token)
    }
}

/// JWT verifier backed by a published JWK.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Create a verifier for RS256 tokens signed by the key behind `jwk`.
    pub fn from_jwk(jwk: &Jwk, issuer: &str, audience: &str) -> Result<Self, JwtError> {
        let decoding_key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| JwtError::InvalidKey(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        // Expiry is checked against the caller's clock in `verify_at`.
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Verify and decode a JWT against the current time.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, JwtError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify and decode a JWT as of `now`. A token is expired from its `exp` second on.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, JwtError> {
        let token_data = decode::<IdentityClaims>(token, &self.decoding_key, &self.validation)?;
        if now.timestamp() >= token_data.claims.exp {
            return Err(JwtError::Expired);
        }
        Ok(token_data.claims)
    }
}
