use serde::{Deserialize, Serialize};

pub use aerodesk_core::PrincipalId;

/// Identity of an authenticated principal, as reported by the identity
/// provider.
///
/// The provider owns this record. AeroDesk only reads it, except for the
/// password reset/change calls made through the admin client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Principal {
    pub fn new(id: PrincipalId) -> Self {
        Self {
            id,
            email: None,
            phone: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Email address, ignoring blank values some providers return for
    /// phone-only accounts.
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|e| !e.trim().is_empty())
    }
}
