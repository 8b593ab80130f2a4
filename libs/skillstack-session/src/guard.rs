//! Route guard.

use std::sync::Arc;

use tracing::debug;

use crate::context::{SessionContext, SessionState};
use crate::navigation::PendingNavigation;
use crate::routes::RoutePolicy;

/// Decision for one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The session is not resolved yet; show a loading indicator.
    Resolving,
    /// Send the user to sign in.
    Denied { redirect_to: String },
    Granted,
}

/// Gates navigation on the shared session state.
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<SessionContext>,
    policy: Arc<RoutePolicy>,
    pending: Arc<PendingNavigation>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(
        session: Arc<SessionContext>,
        policy: Arc<RoutePolicy>,
        pending: Arc<PendingNavigation>,
    ) -> Self {
        Self {
            session,
            policy,
            pending,
        }
    }

    /// Decide `path` against the current session snapshot.
    ///
    /// A denial records `path` as the pending navigation target.
    #[must_use]
    pub fn evaluate(&self, path: &str) -> GuardOutcome {
        if !self.policy.requires_auth(path) {
            return GuardOutcome::Granted;
        }

        let outcome = match self.session.snapshot() {
            SessionState::Resolving => GuardOutcome::Resolving,
            SessionState::Resolved(state) if state.is_signed_in() => GuardOutcome::Granted,
            SessionState::Resolved(_) => {
                self.pending.record(path);
                GuardOutcome::Denied {
                    redirect_to: self.policy.login_path().to_owned(),
                }
            }
        };
        debug!(path, ?outcome, "route guard decision");
        outcome
    }

    /// Like [`RouteGuard::evaluate`], but waits out the `Resolving` phase.
    ///
    /// Returns `Resolving` only if the session is closed before it resolves.
    pub async fn await_decision(&self, path: &str) -> GuardOutcome {
        let outcome = self.evaluate(path);
        if outcome != GuardOutcome::Resolving {
            return outcome;
        }

        let mut changes = self.session.changes();
        let resolved = changes.wait_for(|state| !state.is_resolving()).await.is_ok();
        if resolved {
            self.evaluate(path)
        } else {
            GuardOutcome::Resolving
        }
    }
}
