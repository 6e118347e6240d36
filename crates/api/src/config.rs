//! Process configuration, read once at startup from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use aerodesk_infra::ProviderConfig;

pub const PROVIDER_URL: &str = "PROVIDER_URL";
pub const PROVIDER_ANON_KEY: &str = "PROVIDER_ANON_KEY";
pub const PROVIDER_SERVICE_KEY: &str = "PROVIDER_SERVICE_KEY";
pub const SITE_URL: &str = "SITE_URL";
pub const ADMIN_SETUP_SECRET: &str = "ADMIN_SETUP_SECRET";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_COOKIE_PREFIX: &str = "sb";
const DEFAULT_ELIGIBILITY_FLOOR_MS: u64 = 200;
const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct AppConfig {
    pub provider_url: String,
    pub provider_anon_key: String,
    pub provider_service_key: String,
    pub site_url: String,
    pub admin_setup_secret: String,

    pub bind_addr: SocketAddr,
    pub cookie_prefix: String,
    /// Minimum wall-clock time of the reset-eligibility endpoint.
    pub eligibility_floor: Duration,
    pub provider_timeout_secs: u64,
    /// Direct database connection; only honored with the `postgres` feature.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production,
    /// a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let eligibility_floor_ms = parse_u64(
            "ELIGIBILITY_MIN_DURATION_MS",
            optional("ELIGIBILITY_MIN_DURATION_MS"),
            DEFAULT_ELIGIBILITY_FLOOR_MS,
        )?;
        let provider_timeout_secs = parse_u64(
            "PROVIDER_TIMEOUT_SECS",
            optional("PROVIDER_TIMEOUT_SECS"),
            DEFAULT_PROVIDER_TIMEOUT_SECS,
        )?;

        Ok(Self {
            provider_url: required(PROVIDER_URL)?,
            provider_anon_key: required(PROVIDER_ANON_KEY)?,
            provider_service_key: required(PROVIDER_SERVICE_KEY)?,
            site_url: required(SITE_URL)?,
            admin_setup_secret: required(ADMIN_SETUP_SECRET)?,
            bind_addr,
            cookie_prefix: optional("SESSION_COOKIE_PREFIX")
                .unwrap_or_else(|| DEFAULT_COOKIE_PREFIX.to_string()),
            eligibility_floor: Duration::from_millis(eligibility_floor_ms),
            provider_timeout_secs,
            database_url: optional("DATABASE_URL"),
        })
    }

    pub fn provider(&self) -> ProviderConfig {
        ProviderConfig::new(
            &self.provider_url,
            &self.provider_anon_key,
            &self.provider_service_key,
        )
        .with_timeout_secs(self.provider_timeout_secs)
    }

    /// Cookies carry the `Secure` attribute when the site is served over TLS.
    pub fn secure_cookies(&self) -> bool {
        self.site_url.starts_with("https://")
    }
}

fn parse_u64(name: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.parse::<u64>().map_err(|e| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider_url", &self.provider_url)
            .field("site_url", &self.site_url)
            .field("bind_addr", &self.bind_addr)
            .field("cookie_prefix", &self.cookie_prefix)
            .field("eligibility_floor", &self.eligibility_floor)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}
