//! Password strength policy applied before any credential mutation.

use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Characters accepted as the "special character" requirement.
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?`~";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must be at least 8 characters")]
    TooShort,

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one number")]
    MissingDigit,

    #[error("Password must contain at least one special character")]
    MissingSpecial,
}

/// Validate a candidate password, reporting the first rule it breaks.
///
/// Rules are checked in a fixed order so callers surface a stable message.
pub fn validate_password(candidate: &str) -> Result<(), PasswordPolicyError> {
    if candidate.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordPolicyError::TooShort);
    }
    if !candidate.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordPolicyError::MissingUppercase);
    }
    if !candidate.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordPolicyError::MissingLowercase);
    }
    if !candidate.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyError::MissingDigit);
    }
    if !candidate.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(PasswordPolicyError::MissingSpecial);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_strong_password() {
        assert_eq!(validate_password("Hangar#42b"), Ok(()));
    }

    #[test]
    fn reports_first_broken_rule() {
        assert_eq!(validate_password("Ab1!"), Err(PasswordPolicyError::TooShort));
        assert_eq!(validate_password("hangar#42b"), Err(PasswordPolicyError::MissingUppercase));
        assert_eq!(validate_password("HANGAR#42B"), Err(PasswordPolicyError::MissingLowercase));
        assert_eq!(validate_password("Hangar#abc"), Err(PasswordPolicyError::MissingDigit));
        assert_eq!(validate_password("Hangar42bb"), Err(PasswordPolicyError::MissingSpecial));
    }

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            PasswordPolicyError::TooShort.to_string(),
            "Password must be at least 8 characters"
        );
    }
}
