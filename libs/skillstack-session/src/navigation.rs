use parking_lot::Mutex;
use tracing::debug;

/// Destination a user tried to reach before being sent to sign in.
///
/// Recorded by the route guard on denial, consumed by a successful sign-in,
/// discarded on sign-out.
#[derive(Debug, Default)]
pub struct PendingNavigation {
    target: Mutex<Option<String>>,
}

impl PendingNavigation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `path`, replacing any earlier target.
    pub fn record(&self, path: &str) {
        debug!(path, "pending navigation recorded");
        *self.target.lock() = Some(path.to_owned());
    }

    /// Take the target, leaving nothing behind.
    #[must_use]
    pub fn take(&self) -> Option<String> {
        self.target.lock().take()
    }

    #[must_use]
    pub fn peek(&self) -> Option<String> {
        self.target.lock().clone()
    }

    pub fn discard(&self) {
        if self.target.lock().take().is_some() {
            debug!("pending navigation discarded");
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn take_consumes_latest_target() {
        let pending = PendingNavigation::new();
        pending.record("/dashboard");
        pending.record("/my-enrollments");

        assert_eq!(pending.peek().as_deref(), Some("/my-enrollments"));
        assert_eq!(pending.take().as_deref(), Some("/my-enrollments"));
        assert_eq!(pending.take(), None);
    }

    #[test]
    fn discard_clears_target() {
        let pending = PendingNavigation::new();
        pending.record("/add-course");
        pending.discard();
        pending.discard();
        assert_eq!(pending.peek(), None);
    }
}
