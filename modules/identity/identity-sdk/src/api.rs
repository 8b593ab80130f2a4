//! Public API trait for identity provider adapters.
//!
//! This trait is the sole integration point with an external authentication
//! service. The session layer, the authenticated HTTP client and the auth
//! flows consume it; plugins implement it.

use async_trait::async_trait;

use crate::error::IdentityError;
use crate::listeners::{IdentityListener, Subscription};
use crate::models::{BearerCredential, Credentials, Identity, IdentityPatch};

/// Identity provider adapter.
///
/// Obtained once by the composition root and shared behind an `Arc`:
///
/// ```ignore
/// let provider: Arc<dyn IdentityProviderClient> = Arc::new(plugin);
///
/// let identity = provider.sign_in(&credentials).await?;
/// let credential = provider.get_credential().await?;
/// ```
///
/// # Events
///
/// Every operation that changes the signed-in principal (or refreshes its
/// token) emits an identity-change event to subscribers registered with
/// [`IdentityProviderClient::subscribe`].
#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    /// Create an email/password account and sign it in.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentialsFormat` if the email or password is rejected by the provider
    /// - `EmailAlreadyInUse` if an account with this email exists
    /// - `ProviderUnavailable` if the provider cannot be reached
    async fn create_account(&self, credentials: &Credentials) -> Result<Identity, IdentityError>;

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// - `InvalidCredentials` if the email/password pair is wrong
    /// - `AccountDisabled` if the account was disabled
    /// - `ProviderUnavailable` if the provider cannot be reached
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, IdentityError>;

    /// Sign in through the interactive federated consent flow.
    ///
    /// # Errors
    ///
    /// - `UserCancelled` if the user dismissed the consent step
    /// - `ProviderUnavailable` if the consent step or the provider failed
    async fn sign_in_with_federated_provider(&self) -> Result<Identity, IdentityError>;

    /// Update display attributes of the current identity.
    ///
    /// Fields left as `None` in the patch are unchanged.
    ///
    /// # Errors
    ///
    /// - `NotSignedIn` if nobody is signed in
    /// - `ProviderUnavailable` if the provider cannot be reached
    async fn update_profile(&self, patch: IdentityPatch) -> Result<Identity, IdentityError>;

    /// Sign out.
    ///
    /// Always clears the local session and emits `SignedOut`, even when the
    /// remote step fails. Calling it while signed out is a no-op.
    async fn sign_out(&self);

    /// Return a fresh credential for the current identity, or `None` when
    /// nobody is signed in.
    ///
    /// # Errors
    ///
    /// - `SessionExpired` if the provider refused to refresh the session
    /// - `ProviderUnavailable` if a required refresh could not reach the provider
    async fn get_credential(&self) -> Result<Option<BearerCredential>, IdentityError>;

    /// Register a listener for identity-change events.
    ///
    /// The listener is invoked once immediately with the current state (as
    /// soon as the provider has resolved it) and again on every change.
    fn subscribe(&self, listener: IdentityListener) -> Subscription;
}
