//! Credential handling for connection strings and API tokens
//!
//! Secrets are held in `secrecy::Secret` so they are zeroed on drop and
//! redacted from `Debug` output. Reading one requires an explicit
//! `expose_secret()` call.
//!
//! # Example
//!
//! ```rust
//! use wardline::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let token = secret_string("front-desk-token".to_string());
//! assert_eq!(token.expose_secret(), "front-desk-token");
//! assert!(!format!("{token:?}").contains("front-desk-token"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype that satisfies the `Secret` trait bounds
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl PartialEq<str> for SecretValue {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// A zeroizing, redacted string
pub type SecretString = Secret<SecretValue>;

/// Wraps a String in a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_secret_string_creation() {
        let secret = secret_string("postgresql://u:p@localhost/db".to_string());
        assert!(secret.expose_secret().starts_with("postgresql://"));
        assert_eq!(secret.expose_secret(), "postgresql://u:p@localhost/db");
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = secret_string("doctor-token".to_string());
        let debug_output = format!("{secret:?}");
        assert!(!debug_output.contains("doctor-token"));
    }

    #[test]
    fn test_secret_serde() {
        #[derive(Serialize, Deserialize)]
        struct TokenEntry {
            token: SecretString,
        }

        let entry: TokenEntry = toml::from_str("token = \"abc123\"").unwrap();
        assert_eq!(entry.token.expose_secret(), "abc123");
        assert!(!entry.token.expose_secret().is_empty());
    }
}
