//! `aerodesk-auth` — pure authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage: it defines who
//! a principal is, how roles rank, what a session carries and what an audit
//! record looks like. Providers and transports live in `aerodesk-infra` and
//! `aerodesk-api`.

pub mod audit;
pub mod authorize;
pub mod password;
pub mod principal;
pub mod roles;
pub mod session;

pub use audit::{AuditAction, AuditRecord};
pub use authorize::{AuthzError, require_role};
pub use password::{PasswordPolicyError, validate_password};
pub use principal::{Principal, PrincipalId};
pub use roles::{Role, UnknownRole};
pub use session::{Session, SessionTokens};
