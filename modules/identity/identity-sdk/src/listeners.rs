//! Identity-change listener registry.
//!
//! Adapters own one [`IdentityListeners`] and publish every identity change
//! through it. New subscribers get the current state replayed immediately
//! (once the adapter has resolved it), then live updates in emission order.
//!
//! Delivery is serialized: a replay and a publish never interleave, so a
//! subscriber can't observe a stale replay after a newer event. Listeners
//! run while the delivery lock is held and must not call `subscribe` or
//! `publish` on the same registry.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::debug;

use crate::models::IdentityState;

/// Callback invoked with every delivered identity state.
pub type IdentityListener = Arc<dyn Fn(&IdentityState) + Send + Sync>;

/// Registry of identity-change listeners with replay of the current state.
#[derive(Clone, Default)]
pub struct IdentityListeners {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    delivery: Mutex<()>,
    registry: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, IdentityListener)>,
    current: Option<IdentityState>,
}

impl IdentityListeners {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener.
    ///
    /// If a state was already published, the listener is invoked with it
    /// before this call returns.
    pub fn subscribe(&self, listener: IdentityListener) -> Subscription {
        let _delivery = self.inner.delivery.lock();

        let (id, replay) = {
            let mut registry = self.inner.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::clone(&listener)));
            (id, registry.current.clone())
        };
        debug!(listener_id = id, replay = replay.is_some(), "identity listener registered");

        if let Some(state) = replay {
            listener(&state);
        }

        Subscription {
            release: Some((Arc::downgrade(&self.inner), id)),
        }
    }

    /// Record `state` as current and deliver it to every listener.
    pub fn publish(&self, state: IdentityState) {
        let _delivery = self.inner.delivery.lock();

        let listeners: Vec<IdentityListener> = {
            let mut registry = self.inner.registry.lock();
            registry.current = Some(state.clone());
            registry
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect()
        };
        debug!(
            listeners = listeners.len(),
            signed_in = state.is_signed_in(),
            "publishing identity change"
        );

        for listener in &listeners {
            listener(&state);
        }
    }

    /// Last published state, or `None` before the first publish.
    #[must_use]
    pub fn current(&self) -> Option<IdentityState> {
        self.inner.registry.lock().current.clone()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.registry.lock().listeners.len()
    }
}

/// Handle for a registered listener.
///
/// The listener is released exactly once: by [`Subscription::unsubscribe`]
/// or when the handle is dropped, whichever comes first.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    release: Option<(Weak<Inner>, u64)>,
}

impl Subscription {
    /// Unregister the listener now.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Returns `true` until the listener has been released.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }

    fn release(&mut self) {
        let Some((inner, id)) = self.release.take() else {
            return;
        };
        if let Some(inner) = inner.upgrade() {
            inner
                .registry
                .lock()
                .listeners
                .retain(|(listener_id, _)| *listener_id != id);
            debug!(listener_id = id, "identity listener released");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}
