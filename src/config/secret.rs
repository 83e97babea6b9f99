//! Credential wrapping for store passwords
//!
//! Passwords read from `beacon.toml` or the environment stay in memory for
//! the life of a pipeline run. Holding them as [`SecretString`] zeroes the
//! backing memory on drop and redacts `Debug` output, so a credential never
//! reaches the log stream through derived formatting on config structs.
//!
//! ```rust
//! use beacon::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let password = secret_string("hunter2".to_string());
//! assert_eq!(password.expose_secret(), "hunter2");
//! assert!(!format!("{password:?}").contains("hunter2"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype carrying the marker traits `Secret` requires
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
    /// True when the wrapped credential is the empty string
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
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

/// A credential held behind the secrecy wrapper
///
/// Reading the value takes an explicit `expose_secret()` call; every other
/// path sees `[REDACTED]`.
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string credential
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_expose_returns_the_wrapped_value() {
        let secret = secret_string("store-password".to_string());
        assert_eq!(secret.expose_secret(), "store-password");
        assert!(!secret.expose_secret().is_empty());
    }

    #[test]
    fn test_debug_output_is_redacted() {
        let secret = secret_string("store-password".to_string());
        assert!(!format!("{secret:?}").contains("store-password"));
    }

    #[test]
    fn test_round_trips_through_serde() {
        #[derive(Serialize, Deserialize)]
        struct Credentials {
            password: SecretString,
        }

        let json = serde_json::to_string(&Credentials {
            password: secret_string("store-password".to_string()),
        })
        .unwrap();
        assert!(json.contains("store-password"));

        let back: Credentials = serde_json::from_str(&json).unwrap();
        assert_eq!(back.password.expose_secret(), "store-password");
    }
}
