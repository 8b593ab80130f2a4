//! Interactive consent step for federated sign-in.
//!
//! Browsers open a popup for this; native clients open a system browser or
//! a device-code prompt. Adapters stay agnostic and receive the step as an
//! injected implementation.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::IdentityError;

/// Proof of consent returned by the federated identity provider.
#[derive(Debug, Clone)]
pub struct FederatedAssertion {
    /// Federated provider identifier (for example `google.com`).
    pub provider_id: String,
    /// OpenID Connect ID token issued by the federated provider.
    pub id_token: SecretString,
}

/// Runs the interactive consent step.
#[async_trait]
pub trait FederatedConsent: Send + Sync {
    /// Ask the user to grant consent.
    ///
    /// # Errors
    ///
    /// - `UserCancelled` if the user dismissed the prompt
    /// - `ProviderUnavailable` if the prompt could not complete (network, closed window)
    async fn obtain_consent(&self) -> Result<FederatedAssertion, IdentityError>;
}
