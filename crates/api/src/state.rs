//! Shared application state: configuration plus the provider ports.

use std::sync::Arc;

use aerodesk_infra::in_memory::{InMemoryIdentityProvider, InMemoryStore};
use aerodesk_infra::provider::{AdminGatewayClient, AuthGatewayClient, RestStore};
use aerodesk_infra::{AccountDirectory, AdminProvider, AuditLog, IdentityProvider, ProviderError, RoleStore};

use crate::config::AppConfig;
use crate::cookies::CookieSettings;
use crate::middleware::RoutePolicy;

/// The provider ports the API depends on.
#[derive(Clone)]
pub struct Providers {
    pub identity: Arc<dyn IdentityProvider>,
    pub admin: Arc<dyn AdminProvider>,
    pub roles: Arc<dyn RoleStore>,
    pub audit: Arc<dyn AuditLog>,
    pub accounts: Arc<dyn AccountDirectory>,
}

impl Providers {
    /// Wire every port to the in-memory fakes (tests/dev).
    pub fn in_memory(identity: Arc<InMemoryIdentityProvider>, store: Arc<InMemoryStore>) -> Self {
        Self {
            identity: identity.clone(),
            admin: identity,
            roles: store.clone(),
            audit: store.clone(),
            accounts: store,
        }
    }

    /// HTTP clients against the hosted provider; data stores go through the
    /// REST gateway unless a direct database connection is configured.
    pub async fn connect(config: &AppConfig) -> Result<Self, ProviderError> {
        let provider = config.provider();
        let identity = Arc::new(AuthGatewayClient::new(provider.clone())?);
        let admin = Arc::new(AdminGatewayClient::new(provider.clone())?);

        #[cfg(feature = "postgres")]
        if let Some(url) = config.database_url.as_deref() {
            let store = Arc::new(aerodesk_infra::postgres::PgStore::connect(url).await?);
            tracing::info!("using direct database connection for role/audit/profile tables");
            return Ok(Self {
                identity,
                admin,
                roles: store.clone(),
                audit: store.clone(),
                accounts: store,
            });
        }

        #[cfg(not(feature = "postgres"))]
        if config.database_url.is_some() {
            tracing::warn!("DATABASE_URL set but the postgres feature is disabled; using REST gateway");
        }

        let store = Arc::new(RestStore::new(provider)?);
        Ok(Self {
            identity,
            admin,
            roles: store.clone(),
            audit: store.clone(),
            accounts: store,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cookies: Arc<CookieSettings>,
    pub policy: Arc<RoutePolicy>,
    pub identity: Arc<dyn IdentityProvider>,
    pub admin: Arc<dyn AdminProvider>,
    pub roles: Arc<dyn RoleStore>,
    pub audit: Arc<dyn AuditLog>,
    pub accounts: Arc<dyn AccountDirectory>,
    /// Serializes bootstrap provisioning within this process.
    pub provisioning: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig, providers: Providers) -> Self {
        let cookies = CookieSettings::new(&config.cookie_prefix, config.secure_cookies());
        Self {
            config: Arc::new(config),
            cookies: Arc::new(cookies),
            policy: Arc::new(RoutePolicy::default()),
            identity: providers.identity,
            admin: providers.admin,
            roles: providers.roles,
            audit: providers.audit,
            accounts: providers.accounts,
            provisioning: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    pub async fn from_config(config: AppConfig) -> Result<Self, ProviderError> {
        let providers = Providers::connect(&config).await?;
        Ok(Self::new(config, providers))
    }
}
