//! Postgres-backed stores (direct connection to the hosted database).
//!
//! Same tables as the REST gateway adapter; use this when the deployment
//! grants a direct connection string, which avoids an HTTP hop per lookup.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use aerodesk_auth::{AuditRecord, PrincipalId, Role};

use crate::ProviderError;
use crate::provider::{AccountDirectory, AccountRecord, AuditLog, LoginMethod, RoleStore};

fn map_sqlx_error(operation: &'static str, source: sqlx::Error) -> ProviderError {
    ProviderError::Database { operation, source }
}

/// Postgres implementation of the data-store ports.
///
/// Uses the SQLx connection pool, which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, ProviderError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RoleStore for PgStore {
    async fn role_of(&self, id: PrincipalId) -> Result<Option<Role>, ProviderError> {
        let row = sqlx::query("SELECT role FROM user_roles WHERE user_id = $1 LIMIT 1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("role_of", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row
            .try_get("role")
            .map_err(|e| map_sqlx_error("role_of", e))?;

        match raw.parse::<Role>() {
            Ok(role) => Ok(Some(role)),
            Err(e) => {
                tracing::warn!(principal_id = %id, error = %e, "ignoring unrecognized role record");
                Ok(None)
            }
        }
    }

    async fn assign(&self, id: PrincipalId, role: Role) -> Result<(), ProviderError> {
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
            .bind(id.as_uuid())
            .bind(role.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("assign_role", e))?;
        Ok(())
    }

    async fn any_with_role(&self, role: Role) -> Result<bool, ProviderError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM user_roles WHERE role = $1) AS present")
            .bind(role.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("any_with_role", e))?;

        row.try_get("present")
            .map_err(|e| map_sqlx_error("any_with_role", e))
    }
}

#[async_trait]
impl AuditLog for PgStore {
    async fn append(&self, record: &AuditRecord) -> Result<(), ProviderError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs
                (actor_id, target_id, action, details, ip_address, user_agent, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.actor_id.as_uuid())
        .bind(record.target_id.as_uuid())
        .bind(record.action.as_str())
        .bind(&record.details)
        .bind(&record.ip_address)
        .bind(&record.user_agent)
        .bind(record.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_audit", e))?;
        Ok(())
    }
}

#[async_trait]
impl AccountDirectory for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<AccountRecord>, ProviderError> {
        let row = sqlx::query("SELECT id, login_method FROM profiles WHERE lower(email) = lower($1) LIMIT 1")
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id: uuid::Uuid = row.try_get("id").map_err(|e| map_sqlx_error("find_by_email", e))?;
        let method: Option<String> = row
            .try_get("login_method")
            .map_err(|e| map_sqlx_error("find_by_email", e))?;

        let login_method = match method.as_deref() {
            Some("phone") => LoginMethod::Phone,
            Some("email") => LoginMethod::Email,
            _ => LoginMethod::Other,
        };

        Ok(Some(AccountRecord {
            id: PrincipalId::from_uuid(id),
            login_method,
        }))
    }
}
