//! Infrastructure layer: identity provider and hosted database adapters.
//!
//! Everything that talks to the backend-as-a-service lives behind the traits
//! in [`provider`], so the API layer can be wired with the real HTTP clients,
//! the sqlx stores, or the in-memory fakes.

pub mod config;
pub mod error;
pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod provider;

pub use config::ProviderConfig;
pub use error::ProviderError;
pub use provider::{
    AccountDirectory, AccountRecord, AdminProvider, AuditLog, IdentityProvider, LoginMethod,
    NewUser, RoleStore, UserUpdate,
};
