use thiserror::Error;

use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The principal has no role record at all.
    #[error("forbidden: no role assigned")]
    NoRole,

    #[error("forbidden: role '{held}' is below required '{required}'")]
    InsufficientRole { held: Role, required: Role },
}

/// Decide whether a principal's role meets a required minimum.
///
/// - No IO
/// - No panics
/// - Rank comparison, never string equality
pub fn require_role(held: Option<Role>, required: Role) -> Result<Role, AuthzError> {
    let held = held.ok_or(AuthzError::NoRole)?;
    if held.satisfies(required) {
        Ok(held)
    } else {
        Err(AuthzError::InsufficientRole { held, required })
    }
}
