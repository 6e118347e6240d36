//! In-memory provider and stores.
//!
//! Intended for tests/dev. Behaves like the hosted provider closely enough to
//! exercise session rotation, credential checks and audit writes, and exposes
//! switches to simulate outages.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use aerodesk_auth::{AuditRecord, Principal, PrincipalId, Role, Session};

use crate::ProviderError;
use crate::provider::{
    AccountDirectory, AccountRecord, AdminProvider, AuditLog, IdentityProvider, LoginMethod,
    NewUser, RoleStore, UserUpdate,
};

#[derive(Debug, Clone)]
struct StoredUser {
    principal: Principal,
    password: Option<String>,
    metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy)]
struct AccessGrant {
    principal_id: PrincipalId,
    expired: bool,
}

#[derive(Debug, Default)]
struct IdentityState {
    users: HashMap<PrincipalId, StoredUser>,
    access_tokens: HashMap<String, AccessGrant>,
    refresh_tokens: HashMap<String, PrincipalId>,
}

/// In-memory identity provider implementing both the session and admin ports.
#[derive(Debug, Default)]
pub struct InMemoryIdentityProvider {
    state: RwLock<IdentityState>,
    unavailable: AtomicBool,
    sign_in_calls: AtomicUsize,
    admin_update_calls: AtomicUsize,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an email/password account.
    pub fn add_user(&self, email: &str, password: &str) -> Principal {
        let principal = Principal::new(PrincipalId::new()).with_email(email);
        self.insert_user(principal.clone(), Some(password.to_string()));
        principal
    }

    /// Register a phone-only account (no password).
    pub fn add_phone_user(&self, phone: &str) -> Principal {
        let principal = Principal::new(PrincipalId::new()).with_phone(phone);
        self.insert_user(principal.clone(), None);
        principal
    }

    fn insert_user(&self, principal: Principal, password: Option<String>) {
        let mut state = self.state.write().unwrap();
        state.users.insert(
            principal.id,
            StoredUser {
                principal,
                password,
                metadata: serde_json::Map::new(),
            },
        );
    }

    /// Mint a session for an existing user, as a successful sign-in would.
    pub fn issue_session(&self, id: PrincipalId) -> Option<Session> {
        let mut state = self.state.write().unwrap();
        let principal = state.users.get(&id)?.principal.clone();
        Some(Self::mint(&mut state, principal))
    }

    fn mint(state: &mut IdentityState, principal: Principal) -> Session {
        let access_token = format!("at-{}", Uuid::new_v4());
        let refresh_token = format!("rt-{}", Uuid::new_v4());
        state.access_tokens.insert(
            access_token.clone(),
            AccessGrant {
                principal_id: principal.id,
                expired: false,
            },
        );
        state.refresh_tokens.insert(refresh_token.clone(), principal.id);
        Session {
            access_token,
            refresh_token,
            user: principal,
        }
    }

    /// Make an access token look expired to `get_user`.
    pub fn expire_access_token(&self, token: &str) {
        if let Some(grant) = self.state.write().unwrap().access_tokens.get_mut(token) {
            grant.expired = true;
        }
    }

    /// Simulate a provider outage for every call.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn password_of(&self, id: PrincipalId) -> Option<String> {
        self.state.read().unwrap().users.get(&id)?.password.clone()
    }

    pub fn metadata_of(&self, id: PrincipalId) -> serde_json::Map<String, serde_json::Value> {
        self.state
            .read()
            .unwrap()
            .users
            .get(&id)
            .map(|u| u.metadata.clone())
            .unwrap_or_default()
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn admin_update_calls(&self) -> usize {
        self.admin_update_calls.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> Result<(), ProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(ProviderError::Unavailable("in-memory provider switched off".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn get_user(&self, access_token: &str) -> Result<Principal, ProviderError> {
        self.ensure_available()?;
        let state = self.state.read().unwrap();
        let grant = state
            .access_tokens
            .get(access_token)
            .filter(|g| !g.expired)
            .ok_or(ProviderError::TokenRejected)?;
        state
            .users
            .get(&grant.principal_id)
            .map(|u| u.principal.clone())
            .ok_or(ProviderError::TokenRejected)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        self.ensure_available()?;
        let mut state = self.state.write().unwrap();
        // Refresh tokens are single-use.
        let id = state
            .refresh_tokens
            .remove(refresh_token)
            .ok_or(ProviderError::TokenRejected)?;
        let principal = state
            .users
            .get(&id)
            .map(|u| u.principal.clone())
            .ok_or(ProviderError::TokenRejected)?;
        Ok(Self::mint(&mut state, principal))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        self.ensure_available()?;
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().unwrap();
        let principal = state
            .users
            .values()
            .find(|u| {
                u.principal.email() == Some(email) && u.password.as_deref() == Some(password)
            })
            .map(|u| u.principal.clone())
            .ok_or(ProviderError::InvalidCredentials)?;
        Ok(Self::mint(&mut state, principal))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        self.ensure_available()?;
        let mut state = self.state.write().unwrap();
        if let Some(grant) = state.access_tokens.remove(access_token) {
            state.refresh_tokens.retain(|_, id| *id != grant.principal_id);
        }
        Ok(())
    }
}

#[async_trait]
impl AdminProvider for InMemoryIdentityProvider {
    async fn get_user_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, ProviderError> {
        self.ensure_available()?;
        Ok(self
            .state
            .read()
            .unwrap()
            .users
            .get(&id)
            .map(|u| u.principal.clone()))
    }

    async fn update_user(&self, id: PrincipalId, update: UserUpdate) -> Result<(), ProviderError> {
        self.ensure_available()?;
        self.admin_update_calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.write().unwrap();
        let user = state.users.get_mut(&id).ok_or(ProviderError::NotFound)?;
        if let Some(password) = update.password {
            user.password = Some(password);
        }
        if let Some(serde_json::Value::Object(meta)) = update.user_metadata {
            user.metadata.extend(meta);
        }
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<Principal, ProviderError> {
        self.ensure_available()?;
        let exists = self
            .state
            .read()
            .unwrap()
            .users
            .values()
            .any(|u| u.principal.email() == Some(user.email.as_str()));
        if exists {
            return Err(ProviderError::Status {
                endpoint: "admin/users".into(),
                status: 422,
                body: "email already registered".into(),
            });
        }
        Ok(self.add_user(&user.email, &user.password))
    }
}

/// In-memory role, audit and profile tables.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    roles: RwLock<HashMap<PrincipalId, Role>>,
    audit: RwLock<Vec<AuditRecord>>,
    accounts: RwLock<HashMap<String, AccountRecord>>,
    fail_audit: AtomicBool,
    fail_roles: AtomicBool,
    fail_role_writes: AtomicBool,
    fail_accounts: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_role(&self, id: PrincipalId, role: Role) {
        self.roles.write().unwrap().insert(id, role);
    }

    pub fn add_account(&self, email: &str, id: PrincipalId, login_method: LoginMethod) {
        self.accounts
            .write()
            .unwrap()
            .insert(email.to_ascii_lowercase(), AccountRecord { id, login_method });
    }

    pub fn audit_records(&self) -> Vec<AuditRecord> {
        self.audit.read().unwrap().clone()
    }

    /// Make every audit append fail.
    pub fn set_audit_failing(&self, failing: bool) {
        self.fail_audit.store(failing, Ordering::SeqCst);
    }

    /// Make every role lookup fail.
    pub fn set_roles_failing(&self, failing: bool) {
        self.fail_roles.store(failing, Ordering::SeqCst);
    }

    /// Make every role assignment fail.
    pub fn set_role_writes_failing(&self, failing: bool) {
        self.fail_role_writes.store(failing, Ordering::SeqCst);
    }

    /// Make every profile lookup fail.
    pub fn set_accounts_failing(&self, failing: bool) {
        self.fail_accounts.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl RoleStore for InMemoryStore {
    async fn role_of(&self, id: PrincipalId) -> Result<Option<Role>, ProviderError> {
        if self.fail_roles.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("role lookup switched off".into()));
        }
        Ok(self.roles.read().unwrap().get(&id).copied())
    }

    async fn assign(&self, id: PrincipalId, role: Role) -> Result<(), ProviderError> {
        if self.fail_role_writes.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("role writes switched off".into()));
        }
        self.set_role(id, role);
        Ok(())
    }

    async fn any_with_role(&self, role: Role) -> Result<bool, ProviderError> {
        Ok(self.roles.read().unwrap().values().any(|r| *r == role))
    }
}

#[async_trait]
impl AuditLog for InMemoryStore {
    async fn append(&self, record: &AuditRecord) -> Result<(), ProviderError> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("audit log switched off".into()));
        }
        self.audit.write().unwrap().push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl AccountDirectory for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, ProviderError> {
        if self.fail_accounts.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("account lookup switched off".into()));
        }
        Ok(self
            .accounts
            .read()
            .unwrap()
            .get(&email.to_ascii_lowercase())
            .cloned())
    }
}
