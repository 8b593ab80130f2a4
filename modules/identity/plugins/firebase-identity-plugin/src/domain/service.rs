//! Service implementation for the Firebase identity plugin.

use std::sync::Arc;
use std::time::{Duration, Instant};

use identity_sdk::{
    BearerCredential, Credentials, FederatedConsent, Identity, IdentityError, IdentityListeners,
    IdentityPatch, IdentityState,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::form_urlencoded;

use super::rest::{RestClient, parse_expires_in};
use super::wire::{
    IdpRequest, LookupRequest, LookupResponse, LookupUser, PasswordRequest, TokenResponse,
    UpdateRequest, UpdateResponse,
};
use crate::config::FirebaseIdentityPluginConfig;

/// Firebase-backed identity provider.
///
/// The session slot is guarded by an async mutex, so token refreshes are
/// serialized and identity changes are published in the order they are
/// applied.
pub struct Service {
    rest: RestClient,
    session: Mutex<Option<TokenSession>>,
    listeners: IdentityListeners,
    consent: Option<Arc<dyn FederatedConsent>>,
    request_uri: String,
    restore_token: Option<SecretString>,
    refresh_window: Duration,
}

struct TokenSession {
    identity: Identity,
    id_token: SecretString,
    refresh_token: SecretString,
    expires_at: Instant,
}

impl TokenSession {
    fn needs_refresh(&self, window: Duration) -> bool {
        self.expires_at.saturating_duration_since(Instant::now()) <= window
    }
}

fn identity_from_lookup(user: LookupUser) -> Identity {
    Identity {
        id: user.local_id,
        display_name: user.display_name,
        email: user.email.unwrap_or_default(),
        avatar_url: user.photo_url,
        email_verified: user.email_verified,
    }
}

impl Service {
    /// Create a service from plugin configuration.
    ///
    /// # Errors
    ///
    /// `ProviderUnavailable` if the HTTP client cannot be built.
    pub fn from_config(cfg: &FirebaseIdentityPluginConfig) -> Result<Self, IdentityError> {
        let rest = RestClient::from_config(cfg)?;
        Ok(Self {
            rest,
            session: Mutex::new(None),
            listeners: IdentityListeners::new(),
            consent: None,
            request_uri: cfg.request_uri.clone(),
            restore_token: cfg.refresh_token.clone(),
            refresh_window: Duration::from_secs(cfg.refresh_window_secs),
        })
    }

    /// Attach the interactive consent step used by federated sign-in.
    #[must_use]
    pub fn with_consent(mut self, consent: Arc<dyn FederatedConsent>) -> Self {
        self.consent = Some(consent);
        self
    }

    #[must_use]
    pub fn listeners(&self) -> &IdentityListeners {
        &self.listeners
    }

    pub(crate) fn consent(&self) -> Option<Arc<dyn FederatedConsent>> {
        self.consent.clone()
    }

    /// Publish the startup identity state, restoring the configured refresh
    /// token when there is one.
    ///
    /// A failed restore still resolves the state (as signed out) so
    /// consumers stop waiting; the failure is returned for logging.
    ///
    /// # Errors
    ///
    /// The restore failure, if any.
    #[tracing::instrument(skip_all)]
    pub async fn resolve_initial_state(&self) -> Result<(), IdentityError> {
        let mut session = self.session.lock().await;
        if self.listeners.current().is_some() {
            return Ok(());
        }

        let Some(refresh_token) = self.restore_token.as_ref() else {
            self.listeners.publish(IdentityState::SignedOut);
            return Ok(());
        };

        match self.restore(refresh_token.expose_secret()).await {
            Ok(restored) => {
                info!(user_id = %restored.identity.id, "restored firebase session");
                let identity = restored.identity.clone();
                *session = Some(restored);
                self.listeners.publish(IdentityState::SignedIn(identity));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to restore firebase session");
                self.listeners.publish(IdentityState::SignedOut);
                Err(e)
            }
        }
    }

    async fn restore(&self, refresh_token: &str) -> Result<TokenSession, IdentityError> {
        let refreshed = self.rest.refresh(refresh_token).await?;
        let lifetime = parse_expires_in(&refreshed.expires_in)?;
        let identity = self.lookup(refreshed.id_token.expose_secret()).await?;
        if identity.id != refreshed.user_id {
            return Err(IdentityError::ProviderUnavailable(
                "refreshed token belongs to another user".to_owned(),
            ));
        }

        Ok(TokenSession {
            identity,
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            expires_at: Instant::now() + lifetime,
        })
    }

    async fn lookup(&self, id_token: &str) -> Result<Identity, IdentityError> {
        let response: LookupResponse = self
            .rest
            .toolkit("accounts:lookup", &LookupRequest { id_token })
            .await?;
        let user = response.users.into_iter().next().ok_or_else(|| {
            IdentityError::ProviderUnavailable("account lookup returned no user".to_owned())
        })?;
        if user.disabled {
            return Err(IdentityError::AccountDisabled);
        }
        Ok(identity_from_lookup(user))
    }

    async fn establish(
        &self,
        tokens: TokenResponse,
        identity: Identity,
    ) -> Result<Identity, IdentityError> {
        let lifetime = parse_expires_in(&tokens.expires_in)?;
        let mut session = self.session.lock().await;
        *session = Some(TokenSession {
            identity: identity.clone(),
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
            expires_at: Instant::now() + lifetime,
        });
        info!(user_id = %identity.id, "firebase session established");
        self.listeners
            .publish(IdentityState::SignedIn(identity.clone()));
        Ok(identity)
    }

    /// Return the current ID token, refreshing it first when it expires
    /// within the refresh window. A revoked session is cleared and
    /// `SignedOut` is published.
    async fn fresh_id_token(
        &self,
        slot: &mut Option<TokenSession>,
    ) -> Result<Option<SecretString>, IdentityError> {
        let Some(current) = slot.as_mut() else {
            return Ok(None);
        };
        if !current.needs_refresh(self.refresh_window) {
            return Ok(Some(current.id_token.clone()));
        }

        match self.rest.refresh(current.refresh_token.expose_secret()).await {
            Ok(refreshed) => {
                let lifetime = parse_expires_in(&refreshed.expires_in)?;
                current.id_token = refreshed.id_token;
                current.refresh_token = refreshed.refresh_token;
                current.expires_at = Instant::now() + lifetime;
                info!(user_id = %current.identity.id, "id token refreshed");
                self.listeners
                    .publish(IdentityState::SignedIn(current.identity.clone()));
                Ok(Some(current.id_token.clone()))
            }
            Err(e) if e.is_session_revoked() => {
                warn!(user_id = %current.identity.id, "refresh rejected; signing out");
                *slot = None;
                self.listeners.publish(IdentityState::SignedOut);
                Err(IdentityError::SessionExpired)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip_all)]
    pub(crate) async fn create_account(
        &self,
        credentials: &Credentials,
    ) -> Result<Identity, IdentityError> {
        let tokens: TokenResponse = self
            .rest
            .toolkit(
                "accounts:signUp",
                &PasswordRequest {
                    email: credentials.email.trim(),
                    password: credentials.password(),
                    return_secure_token: true,
                },
            )
            .await?;

        let identity = Identity {
            id: tokens.local_id.clone(),
            display_name: None,
            email: tokens
                .email
                .clone()
                .unwrap_or_else(|| credentials.email.trim().to_owned()),
            avatar_url: None,
            email_verified: false,
        };
        self.establish(tokens, identity).await
    }

    #[tracing::instrument(skip_all)]
    pub(crate) async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        let tokens: TokenResponse = self
            .rest
            .toolkit(
                "accounts:signInWithPassword",
                &PasswordRequest {
                    email: credentials.email.trim(),
                    password: credentials.password(),
                    return_secure_token: true,
                },
            )
            .await?;

        let identity = self.lookup(tokens.id_token.expose_secret()).await?;
        self.establish(tokens, identity).await
    }

    #[tracing::instrument(skip_all, fields(provider = %assertion.provider_id))]
    pub(crate) async fn sign_in_federated(
        &self,
        assertion: &identity_sdk::FederatedAssertion,
    ) -> Result<Identity, IdentityError> {
        let post_body = form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", assertion.id_token.expose_secret())
            .append_pair("providerId", &assertion.provider_id)
            .finish();

        let tokens: TokenResponse = self
            .rest
            .toolkit(
                "accounts:signInWithIdp",
                &IdpRequest {
                    post_body,
                    request_uri: &self.request_uri,
                    return_secure_token: true,
                    return_idp_credential: true,
                },
            )
            .await?;

        let identity = Identity {
            id: tokens.local_id.clone(),
            display_name: tokens.display_name.clone(),
            email: tokens.email.clone().unwrap_or_default(),
            avatar_url: tokens.photo_url.clone(),
            email_verified: tokens.email_verified.unwrap_or(false),
        };
        self.establish(tokens, identity).await
    }

    #[tracing::instrument(skip_all)]
    pub(crate) async fn update_profile(
        &self,
        patch: &IdentityPatch,
    ) -> Result<Identity, IdentityError> {
        let mut session = self.session.lock().await;
        let id_token = self
            .fresh_id_token(&mut session)
            .await?
            .ok_or(IdentityError::NotSignedIn)?;

        let response: UpdateResponse = self
            .rest
            .toolkit(
                "accounts:update",
                &UpdateRequest {
                    id_token: id_token.expose_secret(),
                    display_name: patch.display_name.as_deref(),
                    photo_url: patch.avatar_url.as_deref(),
                    return_secure_token: false,
                },
            )
            .await?;

        let current = session.as_mut().ok_or(IdentityError::NotSignedIn)?;
        current.identity.apply(patch);
        if response.display_name.is_some() {
            current.identity.display_name = response.display_name;
        }
        if response.photo_url.is_some() {
            current.identity.avatar_url = response.photo_url;
        }

        let identity = current.identity.clone();
        self.listeners
            .publish(IdentityState::SignedIn(identity.clone()));
        Ok(identity)
    }

    /// Firebase client sessions end locally; there is no remote call that
    /// can fail here.
    pub(crate) async fn sign_out(&self) {
        let mut session = self.session.lock().await;
        let previous = session.take();
        if let Some(previous) = &previous {
            info!(user_id = %previous.identity.id, "firebase session cleared");
        }
        if previous.is_some() || self.listeners.current().is_none() {
            self.listeners.publish(IdentityState::SignedOut);
        }
    }

    pub(crate) async fn get_credential(&self) -> Result<Option<BearerCredential>, IdentityError> {
        let mut session = self.session.lock().await;
        let token = self.fresh_id_token(&mut session).await?;
        Ok(token.map(|token| BearerCredential::new(token.expose_secret())))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn token_session(expires_in: Duration) -> TokenSession {
        TokenSession {
            identity: Identity::new("uid-1", "ann@example.com"),
            id_token: SecretString::from("id".to_owned()),
            refresh_token: SecretString::from("refresh".to_owned()),
            expires_at: Instant::now() + expires_in,
        }
    }

    #[test]
    fn refresh_is_due_inside_the_window() {
        let window = Duration::from_secs(300);
        assert!(token_session(Duration::from_secs(60)).needs_refresh(window));
        assert!(!token_session(Duration::from_secs(3600)).needs_refresh(window));
    }

    #[test]
    fn lookup_user_maps_to_identity() {
        let identity = identity_from_lookup(LookupUser {
            local_id: "uid-1".to_owned(),
            email: Some("ann@example.com".to_owned()),
            display_name: Some("Ann".to_owned()),
            photo_url: Some("https://img.example.com/a.png".to_owned()),
            email_verified: true,
            disabled: false,
        });

        assert_eq!(identity.id, "uid-1");
        assert_eq!(identity.email, "ann@example.com");
        assert_eq!(identity.display_name.as_deref(), Some("Ann"));
        assert_eq!(
            identity.avatar_url.as_deref(),
            Some("https://img.example.com/a.png")
        );
        assert!(identity.email_verified);
    }

    #[test]
    fn lookup_user_without_email_maps_to_empty_email() {
        let identity = identity_from_lookup(LookupUser {
            local_id: "uid-2".to_owned(),
            email: None,
            display_name: None,
            photo_url: None,
            email_verified: false,
            disabled: false,
        });

        assert!(identity.email.is_empty());
        assert_eq!(identity.display_name, None);
    }

    #[tokio::test]
    async fn credential_is_none_before_sign_in() {
        let service = Service::from_config(&FirebaseIdentityPluginConfig::default()).unwrap();
        assert!(service.get_credential().await.unwrap().is_none());
        assert!(service.listeners().current().is_none());
    }
}
