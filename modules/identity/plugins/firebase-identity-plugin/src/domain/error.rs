//! Mapping of provider failures to `IdentityError`.

use identity_sdk::IdentityError;

/// Failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The request never produced a response.
    Transport(String),
    /// The provider answered with an error code.
    Provider { code: String, detail: Option<String> },
    /// The provider answered with something unparseable.
    Unexpected(String),
}

impl CallError {
    /// Split a provider message such as `WEAK_PASSWORD : Password should be
    /// at least 6 characters` into code and detail.
    #[must_use]
    pub fn from_provider_message(message: &str) -> Self {
        let (code, detail) = match message.split_once(" : ") {
            Some((code, detail)) => (code.trim(), Some(detail.trim().to_owned())),
            None => (message.trim(), None),
        };
        Self::Provider {
            code: code.to_owned(),
            detail,
        }
    }

    /// Returns `true` when a refresh failed because the session is gone for
    /// good.
    #[must_use]
    pub fn is_session_revoked(&self) -> bool {
        matches!(
            self,
            Self::Provider { code, .. } if matches!(
                code.as_str(),
                "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" | "USER_DISABLED"
            )
        )
    }
}

impl From<CallError> for IdentityError {
    fn from(e: CallError) -> Self {
        match e {
            CallError::Transport(reason) | CallError::Unexpected(reason) => {
                Self::ProviderUnavailable(reason)
            }
            CallError::Provider { code, detail } => match code.as_str() {
                "EMAIL_EXISTS" => Self::EmailAlreadyInUse,
                "INVALID_EMAIL" | "WEAK_PASSWORD" | "MISSING_PASSWORD" | "MISSING_EMAIL" => {
                    Self::InvalidCredentialsFormat(detail.unwrap_or(code))
                }
                "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                    Self::InvalidCredentials
                }
                "USER_DISABLED" => Self::AccountDisabled,
                "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" | "INVALID_ID_TOKEN" => {
                    Self::SessionExpired
                }
                _ => Self::ProviderUnavailable(match detail {
                    Some(detail) => format!("{code}: {detail}"),
                    None => code,
                }),
            },
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn map(message: &str) -> IdentityError {
        CallError::from_provider_message(message).into()
    }

    #[test]
    fn maps_account_creation_codes() {
        assert_eq!(map("EMAIL_EXISTS"), IdentityError::EmailAlreadyInUse);
        assert_eq!(
            map("WEAK_PASSWORD : Password should be at least 6 characters"),
            IdentityError::InvalidCredentialsFormat(
                "Password should be at least 6 characters".to_owned()
            )
        );
        assert_eq!(
            map("INVALID_EMAIL"),
            IdentityError::InvalidCredentialsFormat("INVALID_EMAIL".to_owned())
        );
    }

    #[test]
    fn maps_sign_in_codes() {
        assert_eq!(map("EMAIL_NOT_FOUND"), IdentityError::InvalidCredentials);
        assert_eq!(map("INVALID_PASSWORD"), IdentityError::InvalidCredentials);
        assert_eq!(
            map("INVALID_LOGIN_CREDENTIALS"),
            IdentityError::InvalidCredentials
        );
        assert_eq!(map("USER_DISABLED"), IdentityError::AccountDisabled);
    }

    #[test]
    fn unknown_codes_mean_provider_unavailable() {
        assert_eq!(
            map("TOO_MANY_ATTEMPTS_TRY_LATER : Access temporarily disabled"),
            IdentityError::ProviderUnavailable(
                "TOO_MANY_ATTEMPTS_TRY_LATER: Access temporarily disabled".to_owned()
            )
        );
        assert!(matches!(
            IdentityError::from(CallError::Transport("connection refused".to_owned())),
            IdentityError::ProviderUnavailable(_)
        ));
    }

    #[test]
    fn revoked_refresh_codes() {
        assert!(CallError::from_provider_message("TOKEN_EXPIRED").is_session_revoked());
        assert!(CallError::from_provider_message("INVALID_REFRESH_TOKEN").is_session_revoked());
        assert!(!CallError::from_provider_message("QUOTA_EXCEEDED").is_session_revoked());
        assert!(!CallError::Transport("timeout".to_owned()).is_session_revoked());
    }
}
