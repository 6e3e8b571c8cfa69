//! Secret values that are zeroized on drop and never printed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// A client secret, access token or Key Vault value.
///
/// `Debug` and `Display` print `[REDACTED]`. Serialization writes the real
/// value so configuration can round-trip; use [`SecureString::redacted`] when
/// rendering for humans.
///
/// ```
/// use dj_connectors::SecureString;
///
/// let secret = SecureString::from("s3cr3t");
/// assert_eq!(secret.expose_secret(), "s3cr3t");
/// assert_eq!(format!("{secret:?}"), "SecureString([REDACTED])");
/// ```
#[derive(Clone, Default)]
pub struct SecureString(Zeroizing<String>);

impl SecureString {
    pub fn new(value: String) -> Self {
        Self(Zeroizing::new(value))
    }

    /// Borrows the plain value. Copies taken from it are not zeroized.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// `"********"` for a set value, `""` for an empty one.
    pub fn redacted(&self) -> &'static str {
        if self.is_empty() {
            ""
        } else {
            "********"
        }
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString([REDACTED])")
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecureString {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for SecureString {}

impl Serialize for SecureString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_hides_value() {
        let secret = SecureString::from("client-secret-value");
        assert!(!format!("{secret:?}").contains("client-secret-value"));
        assert_eq!(secret.to_string(), "[REDACTED]");
        assert_eq!(secret.redacted(), "********");
        assert_eq!(SecureString::default().redacted(), "");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert!(SecureString::from("  ").is_empty());
        assert!(!SecureString::from("x").is_empty());
    }

    #[test]
    fn test_equality() {
        assert_eq!(SecureString::from("a"), SecureString::from("a"));
        assert_ne!(SecureString::from("a"), SecureString::from("b"));
    }

    #[test]
    fn test_serde_round_trip_keeps_value() {
        let secret = SecureString::from("abc");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: SecureString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
    }
}
