//! JSON Web Key wire types.

use serde::{Deserialize, Serialize};

/// JSON Web Key for an RSA signing key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    /// Modulus, base64url without padding.
    pub n: String,
    /// Public exponent, base64url without padding.
    pub e: String,
    pub kid: String,
    #[serde(rename = "use")]
    pub key_use: String,
    pub alg: String,
}

/// JSON Web Key Set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

impl Jwks {
    pub fn new() -> Self {
        Self { keys: vec![] }
    }

    pub fn add_key(&mut self, key: Jwk) {
        self.keys.push(key);
    }

    /// Indented JSON, as written to disk.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Jwks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jwk_serializes_use_field() {
        let mut jwks = Jwks::new();
        jwks.add_key(Jwk {
            kty: "RSA".to_string(),
            n: "sXch".to_string(),
            e: "AQAB".to_string(),
            kid: "abc123".to_string(),
            key_use: "sig".to_string(),
            alg: "RS256".to_string(),
        });

        let value: serde_json::Value = serde_json::from_str(&jwks.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["keys"][0]["use"], "sig");
        assert_eq!(value["keys"][0]["kty"], "RSA");
        assert!(value["keys"][0].get("key_use").is_none());
    }
}
