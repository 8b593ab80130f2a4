//! Process-wide session state.
//!
//! [`SessionContext`] mirrors the identity provider's change stream into a
//! `watch` channel. The subscription callback is the only writer; every
//! consumer reads snapshots or awaits changes from the same channel.

use std::sync::{Arc, Weak};

use identity_sdk::{Identity, IdentityProviderClient, IdentityState, Subscription};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info};

/// Session as seen by consumers.
///
/// `Resolving` until the provider delivers its first identity state, then
/// `Resolved` forever.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Resolving,
    Resolved(IdentityState),
}

impl SessionState {
    #[must_use]
    pub fn is_resolving(&self) -> bool {
        matches!(self, Self::Resolving)
    }

    #[must_use]
    pub fn identity_state(&self) -> Option<&IdentityState> {
        match self {
            Self::Resolving => None,
            Self::Resolved(state) => Some(state),
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity_state().and_then(IdentityState::identity)
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.identity().is_some()
    }
}

type StateSender = watch::Sender<SessionState>;

/// Shared session state derived from an identity provider.
///
/// Build exactly one per application and share it behind an `Arc`.
pub struct SessionContext {
    provider: Arc<dyn IdentityProviderClient>,
    sender: Mutex<Option<Arc<StateSender>>>,
    receiver: watch::Receiver<SessionState>,
    subscription: Mutex<Option<Subscription>>,
}

impl SessionContext {
    /// Subscribe to `provider` and start in [`SessionState::Resolving`].
    ///
    /// If the provider has already resolved its state, the context is
    /// resolved before this returns.
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProviderClient>) -> Self {
        let (sender, receiver) = watch::channel(SessionState::Resolving);
        let sender = Arc::new(sender);
        let writer = Arc::downgrade(&sender);

        let subscription = provider.subscribe(Arc::new(move |state: &IdentityState| {
            apply_identity_change(&writer, state);
        }));

        Self {
            provider,
            sender: Mutex::new(Some(sender)),
            receiver,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.receiver.borrow().clone()
    }

    /// Receiver that observes every state change. Once the context is
    /// closed, `changed()` on it returns an error.
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<SessionState> {
        self.receiver.clone()
    }

    /// Wait until the session is resolved.
    ///
    /// Returns `None` if the context is closed while still resolving.
    pub async fn resolved(&self) -> Option<IdentityState> {
        let mut receiver = self.changes();
        let state = receiver.wait_for(|state| !state.is_resolving()).await.ok()?;
        state.identity_state().cloned()
    }

    #[must_use]
    pub fn provider(&self) -> &Arc<dyn IdentityProviderClient> {
        &self.provider
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Release the provider subscription. Identity changes delivered after
    /// this are ignored. Calling it again does nothing; dropping the context
    /// has the same effect.
    pub fn close(&self) {
        let subscription = self.subscription.lock().take();
        let sender = self.sender.lock().take();

        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        if sender.is_some() {
            info!("session context closed");
        }
    }
}

fn apply_identity_change(writer: &Weak<StateSender>, state: &IdentityState) {
    let Some(sender) = writer.upgrade() else {
        debug!("identity change after session close ignored");
        return;
    };

    let next = SessionState::Resolved(state.clone());
    let changed = sender.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
    debug!(changed, signed_in = state.is_signed_in(), "session state updated");
}
