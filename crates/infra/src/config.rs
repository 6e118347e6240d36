//! Provider connection settings.

/// Connection settings shared by the provider clients.
///
/// Both keys are long-lived secrets. The anon key only identifies the project;
/// the service key bypasses row-level security and must only be used by the
/// admin client and the data stores.
#[derive(Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub anon_key: String,
    pub service_key: String,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_key: service_key.into(),
            timeout_secs: 10,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub(crate) fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

impl core::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("anon_key", &"<redacted>")
            .field("service_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
