//! Registration password policy.

use thiserror::Error;

/// Characters that satisfy the special-character rule.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// First rule a password breaks, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PasswordPolicyViolation {
    #[error("Password must be at least 8 characters long.")]
    TooShort,
    #[error("Password must include at least one uppercase letter.")]
    MissingUppercase,
    #[error("Password must include at least one lowercase letter.")]
    MissingLowercase,
    #[error("Password must include at least one number.")]
    MissingDigit,
    #[error("Password must include at least one special character.")]
    MissingSpecial,
    #[error("Password cannot contain the email address.")]
    ContainsEmail,
    #[error("Password and Confirm Password do not match.")]
    ConfirmationMismatch,
}

/// Check `password` against the registration rules.
///
/// # Errors
///
/// The first violated rule.
pub fn validate_password(
    password: &str,
    confirmation: &str,
    email: &str,
) -> Result<(), PasswordPolicyViolation> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyViolation::TooShort);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordPolicyViolation::MissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordPolicyViolation::MissingLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyViolation::MissingDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(PasswordPolicyViolation::MissingSpecial);
    }
    let email = email.trim();
    if !email.is_empty() && password.contains(email) {
        return Err(PasswordPolicyViolation::ContainsEmail);
    }
    if password != confirmation {
        return Err(PasswordPolicyViolation::ConfirmationMismatch);
    }
    Ok(())
}
