//! Hosted database access through the provider's REST gateway (`/rest/v1`).
//!
//! Tables:
//! - `user_roles (user_id uuid, role text)`
//! - `audit_logs (actor_id, target_id, action, details jsonb, ip_address, user_agent, created_at)`
//! - `profiles (id uuid, email text, login_method text)`
//!
//! All calls use the service key; row-level security is bypassed, so the
//! callers are responsible for authorization.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use aerodesk_auth::{AuditRecord, PrincipalId, Role};

use super::{AccountDirectory, AccountRecord, AuditLog, LoginMethod, RoleStore};
use crate::{ProviderConfig, ProviderError};

#[derive(Debug, Deserialize)]
struct RoleRow {
    role: String,
}

#[derive(Debug, Serialize)]
struct RoleInsert {
    user_id: PrincipalId,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct ProfileRow {
    id: PrincipalId,
    email: Option<String>,
    login_method: LoginMethod,
}

/// Upper bound on candidate rows for one address. Only a `*` in the address
/// can make the pattern match more than one row.
const PROFILE_CANDIDATES: usize = 10;

/// Case-insensitive exact-match filter for the `email` column.
///
/// LIKE metacharacters are escaped. The gateway rewrites every `*` to `%`
/// with no escape, so the returned rows are re-checked by the caller.
fn email_filter(email: &str) -> String {
    let mut filter = String::with_capacity(email.len() + 8);
    filter.push_str("ilike.");
    for c in email.chars() {
        if matches!(c, '\\' | '%' | '_') {
            filter.push('\\');
        }
        filter.push(c);
    }
    filter
}

/// REST-gateway implementation of the data-store ports.
#[derive(Debug, Clone)]
pub struct RestStore {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl RestStore {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::http("client_init", e))?;
        Ok(Self { http, config })
    }

    fn table(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.config.rest_url(table))
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }

    async fn select<T: serde::de::DeserializeOwned>(
        &self,
        table: &'static str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ProviderError> {
        let resp = self
            .table(reqwest::Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::http(table, e))?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status {
                endpoint: table.to_string(),
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }

        resp.json::<Vec<T>>()
            .await
            .map_err(|e| ProviderError::decode(table, e))
    }

    async fn insert<T: Serialize + ?Sized>(&self, table: &'static str, row: &T) -> Result<(), ProviderError> {
        let resp = self
            .table(reqwest::Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(|e| ProviderError::http(table, e))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::Status {
                endpoint: table.to_string(),
                status: resp.status().as_u16(),
                body: resp.text().await.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl RoleStore for RestStore {
    async fn role_of(&self, id: PrincipalId) -> Result<Option<Role>, ProviderError> {
        let rows: Vec<RoleRow> = self
            .select(
                "user_roles",
                &[
                    ("select", "role".to_string()),
                    ("user_id", format!("eq.{id}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        match row.role.parse::<Role>() {
            Ok(role) => Ok(Some(role)),
            Err(e) => {
                // An unrecognized role grants nothing.
                tracing::warn!(principal_id = %id, error = %e, "ignoring unrecognized role record");
                Ok(None)
            }
        }
    }

    async fn assign(&self, id: PrincipalId, role: Role) -> Result<(), ProviderError> {
        self.insert("user_roles", &RoleInsert { user_id: id, role }).await
    }

    async fn any_with_role(&self, role: Role) -> Result<bool, ProviderError> {
        let rows: Vec<serde_json::Value> = self
            .select(
                "user_roles",
                &[
                    ("select", "user_id".to_string()),
                    ("role", format!("eq.{}", role.as_str())),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(!rows.is_empty())
    }
}

#[async_trait]
impl AuditLog for RestStore {
    async fn append(&self, record: &AuditRecord) -> Result<(), ProviderError> {
        self.insert("audit_logs", record).await
    }
}

#[async_trait]
impl AccountDirectory for RestStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, ProviderError> {
        let rows: Vec<ProfileRow> = self
            .select(
                "profiles",
                &[
                    ("select", "id,email,login_method".to_string()),
                    ("email", email_filter(email)),
                    ("limit", PROFILE_CANDIDATES.to_string()),
                ],
            )
            .await?;
        Ok(rows
            .into_iter()
            .find(|row| row.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email)))
            .map(|row| AccountRecord {
                id: row.id,
                login_method: row.login_method,
            }))
    }
}
