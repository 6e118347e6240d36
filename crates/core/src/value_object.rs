//! Value objects: equality by value, not identity.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Longest address accepted (RFC 5321 path limit).
const MAX_EMAIL_LEN: usize = 254;

/// A syntactically valid email address.
///
/// Validation is deliberately shallow: it rejects obviously malformed input at
/// the request boundary and leaves deliverability to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(DomainError::validation("Email is required"));
        }
        if value.len() > MAX_EMAIL_LEN || value.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("Invalid email address"));
        }

        let (local, domain) = value
            .split_once('@')
            .ok_or_else(|| DomainError::validation("Invalid email address"))?;

        let domain_ok = !domain.contains('@')
            && domain.contains('.')
            && domain.split('.').all(|label| !label.is_empty());

        if local.is_empty() || !domain_ok {
            return Err(DomainError::validation("Invalid email address"));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after `@`, lowercased. Safe to log.
    pub fn domain(&self) -> String {
        self.0
            .rsplit_once('@')
            .map(|(_, d)| d.to_ascii_lowercase())
            .unwrap_or_default()
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_plain_address() {
        let email = Email::parse("  parts@Hangar.Example.com ").unwrap();
        assert_eq!(email.as_str(), "parts@Hangar.Example.com");
        assert_eq!(email.domain(), "hangar.example.com");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for raw in ["", "   ", "no-at-sign", "@example.com", "a@b", "a@b..com", "a b@c.com", "a@b@c.com"] {
            assert!(Email::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn empty_input_has_required_message() {
        assert_eq!(
            Email::parse("").unwrap_err(),
            DomainError::validation("Email is required")
        );
    }

    #[test]
    fn deserializes_through_validation() {
        let ok: Result<Email, _> = serde_json::from_str("\"ops@example.org\"");
        assert!(ok.is_ok());
        let bad: Result<Email, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    proptest! {
        /// Property: the logged domain never contains the local part.
        #[test]
        fn domain_never_leaks_local_part(
            local in "[a-z0-9]{1,16}",
            host in "[a-z]{1,10}\\.[a-z]{2,5}"
        ) {
            let email = Email::parse(&format!("{local}@{host}")).unwrap();
            prop_assert!(!email.domain().contains('@'));
            prop_assert_eq!(email.domain(), host);
        }
    }
}
