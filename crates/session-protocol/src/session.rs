//! The media session boundary.
//!
//! The stage core never talks to a transport directly. An embedding
//! application supplies a [`MediaSession`]: event delivery through a channel
//! sink, a one-shot asynchronous join, and an explicit leave. The core
//! registers its event subscriptions synchronously *before* initiating the
//! join, so no event emitted during connection establishment is missed.
//!
//! Subscriptions are scoped resources: each [`Subscription`] releases its
//! registration exactly once, either explicitly at teardown or on drop.

use crate::error::SessionError;
use crate::events::{SessionEvent, SessionEventKind};
use crate::participant::LocalParticipant;
use std::fmt;
use tokio::sync::{mpsc, oneshot};

/// A registered event subscription.
///
/// Holds the deregistration action for one event kind. The action runs
/// exactly once: on the first [`release`](Self::release) call, or on drop if
/// never released explicitly. Double release is a no-op, not an error.
pub struct Subscription {
    kind: SessionEventKind,
    on_release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a subscription whose deregistration runs `on_release`.
    #[must_use]
    pub fn new(kind: SessionEventKind, on_release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            kind,
            on_release: Some(Box::new(on_release)),
        }
    }

    /// The event kind this subscription covers.
    #[must_use]
    pub fn kind(&self) -> SessionEventKind {
        self.kind
    }

    /// Deregister. Idempotent.
    pub fn release(&mut self) {
        if let Some(release) = self.on_release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("released", &self.on_release.is_none())
            .finish()
    }
}

/// The transport-side session contract.
///
/// Implementations wrap a real-time media SDK session. All interaction is
/// channel-based: events flow through the sink handed to
/// [`subscribe_events`](Self::subscribe_events), and the join completion
/// arrives on the receiver returned by [`connect`](Self::connect).
pub trait MediaSession: Send + 'static {
    /// Register for every event kind the stage listens to, delivering
    /// events to `sink` in transport arrival order.
    ///
    /// Returns one [`Subscription`] guard per registered kind.
    fn subscribe_events(&mut self, sink: mpsc::Sender<SessionEvent>) -> Vec<Subscription>;

    /// Initiate the asynchronous join.
    ///
    /// The returned channel resolves exactly once, with the local
    /// participant handle on success or a terminal error on rejection. The
    /// core does not retry and imposes no timeout; if the transport drops
    /// the sender the join is treated as [`SessionError::Closed`].
    fn connect(&mut self) -> oneshot::Receiver<Result<LocalParticipant, SessionError>>;

    /// Leave the session and release transport resources.
    fn leave(&mut self);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_release_runs_exactly_once() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let mut sub = Subscription::new(SessionEventKind::ParticipantJoined, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sub.release();
        sub.release();
        assert_eq!(released.load(Ordering::SeqCst), 1);

        drop(sub);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_unreleased_subscription() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        {
            let _sub = Subscription::new(SessionEventKind::TrackPublished, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_debug_reports_released_state() {
        let mut sub = Subscription::new(SessionEventKind::ParticipantLeft, || {});
        assert!(format!("{sub:?}").contains("released: false"));
        sub.release();
        assert!(format!("{sub:?}").contains("released: true"));
    }
}
