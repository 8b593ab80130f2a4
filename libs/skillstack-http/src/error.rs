use identity_sdk::IdentityError;
use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiClientError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The identity provider could not mint a credential.
    #[error("credential error: {0}")]
    Credential(#[from] IdentityError),

    /// A 2xx body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl ApiClientError {
    /// HTTP status of an [`ApiClientError::Api`] failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
