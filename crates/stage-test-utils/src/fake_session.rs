//! Scripted in-memory media session.
//!
//! `FakeSession` implements the [`MediaSession`] boundary without any
//! transport: the connect outcome is scripted at construction (or deferred
//! and resolved later), and a [`FakeSessionHandle`] routes emitted events
//! through whichever sinks are still registered. Subscription registration
//! and release are counted so tests can assert the exactly-once teardown
//! contract.

use session_protocol::{
    LocalParticipant, MediaSession, SessionError, SessionEvent, SessionEventKind, Subscription,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

#[derive(Default)]
struct FakeSessionState {
    sinks: HashMap<SessionEventKind, mpsc::Sender<SessionEvent>>,
    registered: usize,
    released: usize,
    pending_connect: Option<oneshot::Sender<Result<LocalParticipant, SessionError>>>,
    left: bool,
}

/// Scripted [`MediaSession`] implementation.
pub struct FakeSession {
    state: Arc<Mutex<FakeSessionState>>,
    connect_result: Option<Result<LocalParticipant, SessionError>>,
    defer_connect: bool,
}

/// Driver handle for a [`FakeSession`].
#[derive(Clone)]
pub struct FakeSessionHandle {
    state: Arc<Mutex<FakeSessionState>>,
}

impl FakeSession {
    fn new(
        connect_result: Option<Result<LocalParticipant, SessionError>>,
        defer_connect: bool,
    ) -> (Self, FakeSessionHandle) {
        let state = Arc::new(Mutex::new(FakeSessionState::default()));
        let handle = FakeSessionHandle {
            state: Arc::clone(&state),
        };
        (
            Self {
                state,
                connect_result,
                defer_connect,
            },
            handle,
        )
    }

    /// A session whose connect resolves immediately with `local`.
    pub fn connected(local: LocalParticipant) -> (Self, FakeSessionHandle) {
        Self::new(Some(Ok(local)), false)
    }

    /// A session whose connect is rejected with `error`.
    pub fn rejecting(error: SessionError) -> (Self, FakeSessionHandle) {
        Self::new(Some(Err(error)), false)
    }

    /// A session whose connect stays pending until
    /// [`FakeSessionHandle::resolve_connect`] is called.
    pub fn deferred() -> (Self, FakeSessionHandle) {
        Self::new(None, true)
    }
}

impl MediaSession for FakeSession {
    fn subscribe_events(&mut self, sink: mpsc::Sender<SessionEvent>) -> Vec<Subscription> {
        let mut subscriptions = Vec::new();
        let mut state = self.state.lock().unwrap();
        for kind in SessionEventKind::ALL {
            state.sinks.insert(kind, sink.clone());
            state.registered += 1;

            let state_ref = Arc::clone(&self.state);
            subscriptions.push(Subscription::new(kind, move || {
                let mut state = state_ref.lock().unwrap();
                state.sinks.remove(&kind);
                state.released += 1;
            }));
        }
        subscriptions
    }

    fn connect(&mut self) -> oneshot::Receiver<Result<LocalParticipant, SessionError>> {
        let (tx, rx) = oneshot::channel();
        if self.defer_connect {
            self.state.lock().unwrap().pending_connect = Some(tx);
        } else if let Some(result) = self.connect_result.take() {
            let _ = tx.send(result);
        }
        // Otherwise the sender drops and the receiver observes a closed
        // session.
        rx
    }

    fn leave(&mut self) {
        self.state.lock().unwrap().left = true;
    }
}

impl FakeSessionHandle {
    /// Deliver an event through the sink registered for its kind.
    ///
    /// Events emitted for a released subscription are silently dropped,
    /// like a transport firing after deregistration.
    pub async fn emit(&self, event: SessionEvent) {
        let sink = self.state.lock().unwrap().sinks.get(&event.kind()).cloned();
        if let Some(sink) = sink {
            let _ = sink.send(event).await;
        }
    }

    /// Resolve a deferred connect. Returns `false` if no connect is
    /// pending or the stage stopped listening.
    pub fn resolve_connect(&self, result: Result<LocalParticipant, SessionError>) -> bool {
        let pending = self.state.lock().unwrap().pending_connect.take();
        match pending {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }

    /// Total subscriptions ever registered.
    pub fn registered_subscriptions(&self) -> usize {
        self.state.lock().unwrap().registered
    }

    /// Total subscription releases observed.
    pub fn released_subscriptions(&self) -> usize {
        self.state.lock().unwrap().released
    }

    /// Subscriptions currently registered.
    pub fn active_subscriptions(&self) -> usize {
        self.state.lock().unwrap().sinks.len()
    }

    /// Whether the session has been left.
    pub fn left(&self) -> bool {
        self.state.lock().unwrap().left
    }
}
