//! Typed clients for the provider's auth gateway (`/auth/v1`).
//!
//! | Method | Path | Client | Operation |
//! |--------|------|--------|-----------|
//! | GET    | `/auth/v1/user` | session | Resolve access token |
//! | POST   | `/auth/v1/token?grant_type=refresh_token` | session | Rotate session |
//! | POST   | `/auth/v1/token?grant_type=password` | session | Password sign-in |
//! | POST   | `/auth/v1/logout` | session | Revoke session |
//! | GET    | `/auth/v1/admin/users/{id}` | admin | Fetch user |
//! | PUT    | `/auth/v1/admin/users/{id}` | admin | Update user |
//! | POST   | `/auth/v1/admin/users` | admin | Create user |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use aerodesk_auth::{Principal, PrincipalId, Session};

use super::{AdminProvider, IdentityProvider, NewUser, UserUpdate};
use crate::{ProviderConfig, ProviderError};

// -- Wire types ---------------------------------------------------------------

/// User object as returned by the auth gateway.
///
/// Only the fields AeroDesk reads are modeled; unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct WireUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

impl From<WireUser> for Principal {
    fn from(user: WireUser) -> Self {
        // The gateway reports absent contact fields as empty strings.
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Principal {
            id: PrincipalId::from_uuid(user.id),
            email: non_blank(user.email),
            phone: non_blank(user.phone),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireSession {
    access_token: String,
    refresh_token: String,
    user: WireUser,
}

impl From<WireSession> for Session {
    fn from(wire: WireSession) -> Self {
        Self {
            access_token: wire.access_token,
            refresh_token: wire.refresh_token,
            user: wire.user.into(),
        }
    }
}

// -- Shared plumbing ------------------------------------------------------------

fn build_http(config: &ProviderConfig) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ProviderError::http("client_init", e))
}

/// Turn a non-success response into a `Status` error, keeping the body for logs.
async fn status_error(endpoint: &str, resp: reqwest::Response) -> ProviderError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    ProviderError::Status {
        endpoint: endpoint.to_string(),
        status,
        body,
    }
}

async fn decode<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<T, ProviderError> {
    resp.json::<T>()
        .await
        .map_err(|e| ProviderError::decode(endpoint, e))
}

// -- Session client -------------------------------------------------------------

/// Auth gateway client acting on behalf of the requester.
///
/// Carries only the anon key; every call is authorized by the token passed in.
#[derive(Debug, Clone)]
pub struct AuthGatewayClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl AuthGatewayClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = build_http(&config)?;
        Ok(Self { http, config })
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
        rejection: ProviderError,
    ) -> Result<Session, ProviderError> {
        let endpoint = format!("token?grant_type={grant_type}");
        let resp = self
            .http
            .post(self.config.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.config.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::http(&endpoint, e))?;

        match resp.status() {
            s if s.is_success() => {
                let wire: WireSession = decode(&endpoint, resp).await?;
                Ok(wire.into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(rejection),
            _ => Err(status_error(&endpoint, resp).await),
        }
    }
}

#[async_trait]
impl IdentityProvider for AuthGatewayClient {
    async fn get_user(&self, access_token: &str) -> Result<Principal, ProviderError> {
        let resp = self
            .http
            .get(self.config.auth_url("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::http("user", e))?;

        match resp.status() {
            s if s.is_success() => Ok(decode::<WireUser>("user", resp).await?.into()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProviderError::TokenRejected),
            _ => Err(status_error("user", resp).await),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        self.token_grant(
            "refresh_token",
            json!({ "refresh_token": refresh_token }),
            ProviderError::TokenRejected,
        )
        .await
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        self.token_grant(
            "password",
            json!({ "email": email, "password": password }),
            ProviderError::InvalidCredentials,
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let resp = self
            .http
            .post(self.config.auth_url("logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| ProviderError::http("logout", e))?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            // Already-invalid sessions are as signed out as they get.
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(()),
            _ => Err(status_error("logout", resp).await),
        }
    }
}

// -- Admin client ---------------------------------------------------------------

/// Auth gateway client authorized by the service key.
///
/// Never constructed from a requester's session.
#[derive(Debug, Clone)]
pub struct AdminGatewayClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl AdminGatewayClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = build_http(&config)?;
        Ok(Self { http, config })
    }

    fn admin(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.config.service_key)
            .bearer_auth(&self.config.service_key)
    }
}

#[async_trait]
impl AdminProvider for AdminGatewayClient {
    async fn get_user_by_id(&self, id: PrincipalId) -> Result<Option<Principal>, ProviderError> {
        let url = self.config.auth_url(&format!("admin/users/{id}"));
        let resp = self
            .admin(self.http.get(url))
            .send()
            .await
            .map_err(|e| ProviderError::http("admin/users/{id}", e))?;

        match resp.status() {
            s if s.is_success() => Ok(Some(decode::<WireUser>("admin/users/{id}", resp).await?.into())),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(status_error("admin/users/{id}", resp).await),
        }
    }

    async fn update_user(&self, id: PrincipalId, update: UserUpdate) -> Result<(), ProviderError> {
        let url = self.config.auth_url(&format!("admin/users/{id}"));
        let resp = self
            .admin(self.http.put(url))
            .json(&update)
            .send()
            .await
            .map_err(|e| ProviderError::http("admin/users/{id}", e))?;

        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(ProviderError::NotFound),
            _ => Err(status_error("admin/users/{id}", resp).await),
        }
    }

    async fn create_user(&self, user: NewUser) -> Result<Principal, ProviderError> {
        let resp = self
            .admin(self.http.post(self.config.auth_url("admin/users")))
            .json(&user)
            .send()
            .await
            .map_err(|e| ProviderError::http("admin/users", e))?;

        if resp.status().is_success() {
            Ok(decode::<WireUser>("admin/users", resp).await?.into())
        } else {
            Err(status_error("admin/users", resp).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_contact_fields_become_none() {
        let wire: WireUser = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "email": "",
            "phone": "+15550100",
            "aud": "authenticated"
        }))
        .unwrap();
        let principal: Principal = wire.into();
        assert_eq!(principal.email, None);
        assert_eq!(principal.phone.as_deref(), Some("+15550100"));
    }
}
