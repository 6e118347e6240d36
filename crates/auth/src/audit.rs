//! Audit trail entries for privileged actions.
//!
//! Records are append-only: AeroDesk writes them and never updates or deletes
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::PrincipalId;

/// Fallback for request metadata that could not be determined.
pub const UNKNOWN: &str = "unknown";

/// Kind of privileged action being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// An administrator set another principal's password.
    PasswordReset,
    /// A principal changed their own password.
    PasswordChange,
    /// The initial super administrator was provisioned.
    AccountProvisioned,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PasswordReset => "password_reset",
            Self::PasswordChange => "password_change",
            Self::AccountProvisioned => "account_provisioned",
        }
    }
}

impl core::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub actor_id: PrincipalId,
    pub target_id: PrincipalId,
    pub action: AuditAction,
    pub details: JsonValue,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(
        actor_id: PrincipalId,
        target_id: PrincipalId,
        action: AuditAction,
        details: JsonValue,
    ) -> Self {
        Self {
            actor_id,
            target_id,
            action,
            details,
            ip_address: UNKNOWN.to_string(),
            user_agent: UNKNOWN.to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn with_request_meta(mut self, ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        self.ip_address = ip_address.into();
        self.user_agent = user_agent.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_strings() {
        assert_eq!(AuditAction::PasswordReset.as_str(), "password_reset");
        assert_eq!(AuditAction::PasswordChange.as_str(), "password_change");
        assert_eq!(
            serde_json::to_value(AuditAction::AccountProvisioned).unwrap(),
            serde_json::json!("account_provisioned")
        );
    }

    #[test]
    fn request_meta_defaults_to_unknown() {
        let actor = PrincipalId::new();
        let record = AuditRecord::new(actor, actor, AuditAction::PasswordChange, JsonValue::Null);
        assert_eq!(record.ip_address, UNKNOWN);
        assert_eq!(record.user_agent, UNKNOWN);

        let record = record.with_request_meta("203.0.113.7", "curl/8");
        assert_eq!(record.ip_address, "203.0.113.7");
    }
}
