use serde::{Deserialize, Serialize};

use crate::Principal;

/// Provider-issued session (transport-agnostic).
///
/// Creation, expiry and rotation are owned by the identity provider. AeroDesk
/// only carries the tokens between the provider and the browser cookies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: Principal,
}

/// The token pair found on an inbound request (either half may be missing).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_empty_only_without_both_halves() {
        assert!(SessionTokens::default().is_empty());
        let refresh_only = SessionTokens {
            access_token: None,
            refresh_token: Some("rt".into()),
        };
        assert!(!refresh_only.is_empty());
    }
}
