//! Ports to the hosted backend-as-a-service.
//!
//! Two credentials are in play and they never mix:
//! - [`IdentityProvider`] acts with the *requester's* tokens (anon key + the
//!   session from the browser cookies).
//! - [`AdminProvider`] and the data stores act with the elevated service key.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use aerodesk_auth::{AuditRecord, Principal, PrincipalId, Role, Session};

use crate::ProviderError;

pub mod gateway;
pub mod rest;

pub use gateway::{AdminGatewayClient, AuthGatewayClient};
pub use rest::RestStore;

/// Session-scoped identity operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the principal owning an access token.
    async fn get_user(&self, access_token: &str) -> Result<Principal, ProviderError>;

    /// Exchange a refresh token for a rotated session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;
}

/// Attribute changes applied through the admin API.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    /// Skip the confirmation email; the account is usable immediately.
    pub email_confirm: bool,
}

/// Elevated (service-key) identity operations.
#[async_trait]
pub trait AdminProvider: Send + Sync {
    async fn get_user_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, ProviderError>;

    async fn update_user(&self, id: PrincipalId, update: UserUpdate) -> Result<(), ProviderError>;

    async fn create_user(&self, user: NewUser) -> Result<Principal, ProviderError>;
}

/// Role association records, keyed by principal id.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Single-row lookup of a principal's role.
    async fn role_of(&self, id: PrincipalId) -> Result<Option<Role>, ProviderError>;

    async fn assign(&self, id: PrincipalId, role: Role) -> Result<(), ProviderError>;

    async fn any_with_role(&self, role: Role) -> Result<bool, ProviderError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, record: &AuditRecord) -> Result<(), ProviderError>;
}

/// How an account signs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    Email,
    Phone,
    #[serde(other)]
    Other,
}

/// Profile row used by the reset-eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: PrincipalId,
    pub login_method: LoginMethod,
}

impl AccountRecord {
    /// Phone-only accounts cannot use email-based password reset.
    pub fn can_reset_by_email(&self) -> bool {
        self.login_method != LoginMethod::Phone
    }
}

#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, ProviderError>;
}
