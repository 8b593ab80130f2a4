//! Service implementation for the static identity plugin.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use identity_sdk::{
    BearerCredential, Credentials, FederatedAssertion, FederatedConsent, Identity,
    IdentityError, IdentityListeners, IdentityPatch, IdentityState,
};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::config::{AccountConfig, StaticIdentityPluginConfig};

/// In-memory identity provider.
///
/// Every state change is published while the state lock is held, so
/// listeners observe changes in the order they were applied. Listeners must
/// not call back into the service synchronously.
pub struct Service {
    state: Mutex<State>,
    federated: HashMap<String, AccountConfig>,
    initial_session: Option<String>,
    listeners: IdentityListeners,
    consent: Option<Arc<dyn FederatedConsent>>,
    outage: AtomicBool,
    sequence: AtomicU64,
    token_prefix: String,
    min_password_length: usize,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    signed_in: Option<String>,
}

struct Account {
    identity: Identity,
    password: SecretString,
    disabled: bool,
}

impl Account {
    fn from_config(cfg: &AccountConfig) -> Self {
        Self {
            identity: Identity {
                id: cfg.id.clone(),
                display_name: cfg.display_name.clone(),
                email: cfg.email.trim().to_owned(),
                avatar_url: cfg.avatar_url.clone(),
                email_verified: cfg.email_verified,
            },
            password: cfg.password.clone(),
            disabled: cfg.disabled,
        }
    }
}

fn account_key(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

fn validate_email(email: &str) -> Result<(), IdentityError> {
    let valid = email.trim().split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty()
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    });
    if valid {
        Ok(())
    } else {
        Err(IdentityError::InvalidCredentialsFormat(
            "invalid email address".to_owned(),
        ))
    }
}

impl Service {
    /// Create a service from plugin configuration.
    #[must_use]
    pub fn from_config(cfg: &StaticIdentityPluginConfig) -> Self {
        let accounts = cfg
            .accounts
            .iter()
            .map(|account| (account_key(&account.email), Account::from_config(account)))
            .collect();
        let federated = cfg
            .federated
            .iter()
            .map(|mapping| (mapping.id_token.clone(), mapping.account.clone()))
            .collect();

        Self {
            state: Mutex::new(State {
                accounts,
                signed_in: None,
            }),
            federated,
            initial_session: cfg.initial_session.as_deref().map(account_key),
            listeners: IdentityListeners::new(),
            consent: None,
            outage: AtomicBool::new(false),
            sequence: AtomicU64::new(0),
            token_prefix: cfg.token_prefix.clone(),
            min_password_length: cfg.min_password_length,
        }
    }

    /// Attach the interactive consent step used by federated sign-in.
    #[must_use]
    pub fn with_consent(mut self, consent: Arc<dyn FederatedConsent>) -> Self {
        self.consent = Some(consent);
        self
    }

    /// Publish the startup identity state.
    ///
    /// Until this runs, subscribers receive nothing. Calling it again after
    /// the state has resolved is a no-op.
    pub fn resolve_initial_state(&self) {
        let mut state = self.state.lock();
        if self.listeners.current().is_some() {
            return;
        }

        let restored = self.initial_session.as_ref().and_then(|key| {
            state
                .accounts
                .get(key)
                .filter(|account| !account.disabled)
                .map(|account| (key.clone(), account.identity.clone()))
        });

        let event = match restored {
            Some((key, identity)) => {
                info!(user_id = %identity.id, "restored static session");
                state.signed_in = Some(key);
                IdentityState::SignedIn(identity)
            }
            None => IdentityState::SignedOut,
        };
        self.listeners.publish(event);
    }

    /// Simulate the provider being unreachable (or reachable again).
    pub fn set_outage(&self, outage: bool) {
        self.outage.store(outage, Ordering::SeqCst);
    }

    #[must_use]
    pub fn listeners(&self) -> &IdentityListeners {
        &self.listeners
    }

    pub(crate) fn consent(&self) -> Option<Arc<dyn FederatedConsent>> {
        self.consent.clone()
    }

    fn ensure_reachable(&self) -> Result<(), IdentityError> {
        if self.outage.load(Ordering::SeqCst) {
            return Err(IdentityError::ProviderUnavailable(
                "static provider outage".to_owned(),
            ));
        }
        Ok(())
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Create an account and sign it in.
    ///
    /// # Errors
    ///
    /// See `IdentityProviderClient::create_account`.
    pub fn create_account(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        self.ensure_reachable()?;
        validate_email(&credentials.email)?;
        if credentials.password().chars().count() < self.min_password_length {
            return Err(IdentityError::InvalidCredentialsFormat(format!(
                "password should be at least {} characters",
                self.min_password_length
            )));
        }

        let key = account_key(&credentials.email);
        let mut state = self.state.lock();
        if state.accounts.contains_key(&key) {
            return Err(IdentityError::EmailAlreadyInUse);
        }

        let identity = Identity::new(
            format!("static-{}", self.next_sequence()),
            credentials.email.trim(),
        );
        state.accounts.insert(
            key.clone(),
            Account {
                identity: identity.clone(),
                password: credentials.password.clone(),
                disabled: false,
            },
        );
        state.signed_in = Some(key);
        info!(user_id = %identity.id, "static account created");

        self.listeners
            .publish(IdentityState::SignedIn(identity.clone()));
        Ok(identity)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// See `IdentityProviderClient::sign_in`.
    pub fn sign_in(&self, credentials: &Credentials) -> Result<Identity, IdentityError> {
        self.ensure_reachable()?;

        let key = account_key(&credentials.email);
        let mut state = self.state.lock();
        let account = state
            .accounts
            .get(&key)
            .ok_or(IdentityError::InvalidCredentials)?;
        if account.password.expose_secret() != credentials.password() {
            debug!("static sign-in rejected");
            return Err(IdentityError::InvalidCredentials);
        }
        if account.disabled {
            return Err(IdentityError::AccountDisabled);
        }

        let identity = account.identity.clone();
        state.signed_in = Some(key);
        info!(user_id = %identity.id, "static sign-in succeeded");

        self.listeners
            .publish(IdentityState::SignedIn(identity.clone()));
        Ok(identity)
    }

    /// Complete a federated sign-in with a consent assertion.
    ///
    /// # Errors
    ///
    /// `ProviderUnavailable` when the assertion is not recognized or the
    /// provider is down; `AccountDisabled` when the mapped account is disabled.
    pub fn sign_in_federated(
        &self,
        assertion: &FederatedAssertion,
    ) -> Result<Identity, IdentityError> {
        self.ensure_reachable()?;

        let mapped = self
            .federated
            .get(assertion.id_token.expose_secret())
            .ok_or_else(|| {
                IdentityError::ProviderUnavailable(format!(
                    "federated assertion from '{}' rejected",
                    assertion.provider_id
                ))
            })?;

        let key = account_key(&mapped.email);
        let mut state = self.state.lock();
        let account = state
            .accounts
            .entry(key.clone())
            .or_insert_with(|| Account::from_config(mapped));
        if account.disabled {
            return Err(IdentityError::AccountDisabled);
        }

        let identity = account.identity.clone();
        state.signed_in = Some(key);
        info!(user_id = %identity.id, provider = %assertion.provider_id, "static federated sign-in succeeded");

        self.listeners
            .publish(IdentityState::SignedIn(identity.clone()));
        Ok(identity)
    }

    /// Update display attributes of the signed-in account.
    ///
    /// # Errors
    ///
    /// `NotSignedIn` when nobody is signed in, `ProviderUnavailable` during an outage.
    pub fn update_profile(&self, patch: &IdentityPatch) -> Result<Identity, IdentityError> {
        self.ensure_reachable()?;

        let mut state = self.state.lock();
        let key = state.signed_in.clone().ok_or(IdentityError::NotSignedIn)?;
        let account = state
            .accounts
            .get_mut(&key)
            .ok_or(IdentityError::NotSignedIn)?;
        account.identity.apply(patch);
        let identity = account.identity.clone();

        self.listeners
            .publish(IdentityState::SignedIn(identity.clone()));
        Ok(identity)
    }

    /// Sign out; the local session is cleared even during an outage.
    pub fn sign_out(&self) {
        if let Err(e) = self.ensure_reachable() {
            warn!(error = %e, "remote sign-out failed; clearing local session");
        }

        let mut state = self.state.lock();
        let was_signed_in = state.signed_in.take().is_some();
        let unresolved = self.listeners.current().is_none();
        if was_signed_in || unresolved {
            self.listeners.publish(IdentityState::SignedOut);
        }
    }

    /// Mint a fresh bearer credential for the signed-in account.
    #[must_use]
    pub fn mint_credential(&self) -> Option<BearerCredential> {
        let state = self.state.lock();
        let key = state.signed_in.as_ref()?;
        let account = state.accounts.get(key)?;
        Some(BearerCredential::new(format!(
            "{}.{}.{}",
            self.token_prefix,
            account.identity.id,
            self.next_sequence()
        )))
    }

    /// Currently signed-in identity, if any.
    #[must_use]
    pub fn current_identity(&self) -> Option<Identity> {
        let state = self.state.lock();
        let key = state.signed_in.as_ref()?;
        state
            .accounts
            .get(key)
            .map(|account| account.identity.clone())
    }
}
