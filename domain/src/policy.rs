//! Password complexity policy. Keep logic minimal and deterministic.
//!
//! Criteria are checked in a fixed order (length, uppercase, lowercase,
//! digit, special character); the first failing criterion determines the
//! reported weakness.

use std::fmt::{Display, Formatter};

/// Punctuation set accepted as "special characters".
pub const SPECIAL_CHARS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?";

/// Minimum password length.
pub const MIN_LENGTH: usize = 8;

/// The first policy criterion a password failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordWeakness {
    TooShort,
    NoUppercase,
    NoLowercase,
    NoDigit,
    NoSpecial,
}

impl Display for PasswordWeakness {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordWeakness::TooShort => {
                write!(f, "password must be at least {} characters long", MIN_LENGTH)
            }
            PasswordWeakness::NoUppercase => {
                write!(f, "password must contain at least one uppercase letter")
            }
            PasswordWeakness::NoLowercase => {
                write!(f, "password must contain at least one lowercase letter")
            }
            PasswordWeakness::NoDigit => {
                write!(f, "password must contain at least one digit")
            }
            PasswordWeakness::NoSpecial => {
                write!(f, "password must contain at least one special character")
            }
        }
    }
}

/// Validate a password against the policy.
pub fn validate(password: &str) -> Result<(), PasswordWeakness> {
    if password.chars().count() < MIN_LENGTH {
        return Err(PasswordWeakness::TooShort);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(PasswordWeakness::NoUppercase);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(PasswordWeakness::NoLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordWeakness::NoDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(PasswordWeakness::NoSpecial);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_password_fails_on_length_first() {
        assert_eq!(validate("abc"), Err(PasswordWeakness::TooShort));
    }

    #[test]
    fn long_lowercase_password_fails_on_uppercase() {
        // Length passes, so the next criterion in order decides.
        assert_eq!(validate("abcdefgh"), Err(PasswordWeakness::NoUppercase));
    }

    #[test]
    fn remaining_criteria_in_order() {
        assert_eq!(validate("ABCDEFG1!"), Err(PasswordWeakness::NoLowercase));
        assert_eq!(validate("Abcdefgh!"), Err(PasswordWeakness::NoDigit));
        assert_eq!(validate("Abcdefg1"), Err(PasswordWeakness::NoSpecial));
    }

    #[test]
    fn compliant_password_passes() {
        assert_eq!(validate("Abcdefg1!"), Ok(()));
    }
}
