//! Error types for identity provider adapters.

use thiserror::Error;

/// Errors that can occur when talking to an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    /// The email or password was rejected before any account lookup.
    #[error("invalid credentials format: {0}")]
    InvalidCredentialsFormat(String),

    /// An account with this email already exists.
    #[error("email already in use")]
    EmailAlreadyInUse,

    /// The email/password pair does not match an account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but was disabled by an administrator.
    #[error("account disabled")]
    AccountDisabled,

    /// The user dismissed the federated consent step.
    #[error("sign-in cancelled by user")]
    UserCancelled,

    /// The operation requires a signed-in identity.
    #[error("not signed in")]
    NotSignedIn,

    /// The provider refused to refresh the session; the user was signed out.
    #[error("session expired")]
    SessionExpired,

    /// The provider could not be reached or failed unexpectedly.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl IdentityError {
    /// Returns `true` for errors caused by what the user entered or did,
    /// as opposed to provider availability.
    #[must_use]
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentialsFormat(_)
                | Self::EmailAlreadyInUse
                | Self::InvalidCredentials
                | Self::AccountDisabled
                | Self::UserCancelled
        )
    }
}
