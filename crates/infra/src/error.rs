use thiserror::Error;

/// Failure talking to the identity provider or hosted database.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("http error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    /// Email/password pair was refused.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Access or refresh token was refused (expired, revoked, malformed).
    #[error("token rejected")]
    TokenRejected,

    #[error("not found")]
    NotFound,

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "postgres")]
    #[error("database error in {operation}: {source}")]
    Database {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl ProviderError {
    /// The request URL is dropped from the source; query strings carry
    /// lookup values such as email addresses.
    pub(crate) fn http(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            endpoint: endpoint.into(),
            source: source.without_url(),
        }
    }

    pub(crate) fn decode(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Decode {
            endpoint: endpoint.into(),
            message: source.without_url().to_string(),
        }
    }

    /// Stable label for logs that must not carry the error text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Status { .. } => "status",
            Self::Decode { .. } => "decode",
            Self::InvalidCredentials => "invalid_credentials",
            Self::TokenRejected => "token_rejected",
            Self::NotFound => "not_found",
            Self::Unavailable(_) => "unavailable",
            #[cfg(feature = "postgres")]
            Self::Database { .. } => "database",
        }
    }

    /// Whether the failure means "the caller's credentials are not good"
    /// rather than "the provider is broken".
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::InvalidCredentials | Self::TokenRejected)
    }
}
