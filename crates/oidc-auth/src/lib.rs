//! Identity material for an AWS STS trusted OIDC provider.
//!
//! This crate manages the on-disk RSA key pair, derives the JSON Web Key Set
//! published by the provider and signs the tokens it issues.

pub mod jwks;
pub mod jwt;
pub mod keys;
pub mod oidc;

pub use jwks::{KEY_USE_SIGNATURE, SigningKey, build_jwks, key_id};
pub use jwt::{IdentityClaims, JwtError, JwtSigner, JwtVerifier};
pub use keys::{KeyPairStatus, KeyStore, load_private_key, load_public_key};
pub use oidc::{Jwk, Jwks};
