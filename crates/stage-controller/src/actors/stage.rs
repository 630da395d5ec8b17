//! `StageActor` - single-writer owner of stage state.
//!
//! The actor wires itself to a [`MediaSession`] at spawn:
//!
//! 1. Event subscriptions are registered synchronously, *before* the
//!    connect attempt starts, so nothing emitted in the registration window
//!    is missed.
//! 2. The asynchronous join resolves exactly once, with a local-participant
//!    handle or a terminal error; the actor never retries.
//! 3. On cancellation, every subscription is released exactly once, the
//!    roster is cleared, and the session is left.
//!
//! Session events and commands are processed one at a time on the same
//! loop; reconciliation never runs concurrently with itself.

use crate::config::StageConfig;
use crate::errors::StageError;
use crate::focus::FocusSelector;
use crate::layout::{select_arrangement, Arrangement, LayoutMode, Viewport};
use crate::roster::RosterStore;

use super::messages::{StageMessage, StageSnapshot};

use session_protocol::{
    LocalParticipant, MediaSession, SessionError, SessionEvent, Subscription, TrackInfo,
};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Command mailbox buffer size.
const STAGE_CHANNEL_BUFFER: usize = 64;

/// Session event channel buffer size.
const SESSION_EVENT_BUFFER: usize = 256;

/// Handle to a `StageActor`.
#[derive(Clone)]
pub struct StageActorHandle {
    sender: mpsc::Sender<StageMessage>,
    cancel_token: CancellationToken,
}

impl StageActorHandle {
    /// Get a read-only snapshot of the stage.
    pub async fn snapshot(&self) -> Result<StageSnapshot, StageError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StageMessage::GetSnapshot { respond_to: tx })
            .await
            .map_err(|_| StageError::Terminated)?;

        rx.await
            .map_err(|e| StageError::Internal(format!("response receive failed: {e}")))
    }

    /// Compute the arrangement for the current stage state.
    pub async fn arrangement(&self) -> Result<Arrangement, StageError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StageMessage::GetArrangement { respond_to: tx })
            .await
            .map_err(|_| StageError::Terminated)?;

        rx.await
            .map_err(|e| StageError::Internal(format!("response receive failed: {e}")))
    }

    /// Report a resize of the rendering surface.
    pub async fn resize(&self, width: u32, height: u32) -> Result<(), StageError> {
        self.sender
            .send(StageMessage::ViewportResized { width, height })
            .await
            .map_err(|_| StageError::Terminated)
    }

    /// Switch the layout mode.
    pub async fn set_layout_mode(&self, mode: LayoutMode) -> Result<(), StageError> {
        self.sender
            .send(StageMessage::SetLayoutMode { mode })
            .await
            .map_err(|_| StageError::Terminated)
    }

    /// Start the local screen share.
    ///
    /// Returns whether the local share took focus (it does not when another
    /// participant's share is already focused).
    pub async fn start_screen_share(&self, track: TrackInfo) -> Result<bool, StageError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StageMessage::StartScreenShare {
                track,
                respond_to: tx,
            })
            .await
            .map_err(|_| StageError::Terminated)?;

        rx.await
            .map_err(|e| StageError::Internal(format!("response receive failed: {e}")))
    }

    /// Stop the local screen share.
    ///
    /// A no-op unless the focused share is the local one; returns whether a
    /// share was stopped.
    pub async fn stop_screen_share(&self) -> Result<bool, StageError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(StageMessage::StopScreenShare { respond_to: tx })
            .await
            .map_err(|_| StageError::Terminated)?;

        rx.await
            .map_err(|e| StageError::Internal(format!("response receive failed: {e}")))
    }

    /// Tear the stage down.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check whether the stage has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// The `StageActor` implementation.
pub struct StageActor<S: MediaSession> {
    /// Command receiver.
    receiver: mpsc::Receiver<StageMessage>,
    /// Session event receiver.
    session_events: mpsc::Receiver<SessionEvent>,
    /// The transport dropped its event sink; nothing more arrives.
    events_closed: bool,
    /// The session, absent when construction failed.
    session: Option<S>,
    /// Registered subscription guards, released at teardown.
    subscriptions: Vec<Subscription>,
    /// Pending join completion; taken once it resolves.
    connect_rx: Option<oneshot::Receiver<Result<LocalParticipant, SessionError>>>,
    /// Cancellation token.
    cancel_token: CancellationToken,
    /// Ordered, page-bounded participant roster.
    roster: RosterStore,
    /// Speaker and screen-share focus.
    focus: FocusSelector,
    /// Last sampled surface dimensions.
    viewport: Viewport,
    /// Current layout mode.
    layout_mode: LayoutMode,
    /// Background image passthrough.
    background_image: Option<String>,
    /// Local participant handle, once joined.
    local_participant: Option<LocalParticipant>,
    /// Terminal join error from construction or connection.
    join_error: Option<String>,
    /// Stage creation timestamp.
    created_at: i64,
}

impl<S: MediaSession> StageActor<S> {
    /// Spawn a stage actor wired to `session`.
    ///
    /// A failed session construction is passed in as `Err`: the stage still
    /// starts (so the surface can render the error) but skips all event
    /// wiring and records the terminal join error.
    pub fn spawn(
        config: StageConfig,
        session: Result<S, SessionError>,
    ) -> (StageActorHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(STAGE_CHANNEL_BUFFER);
        let (event_tx, event_rx) = mpsc::channel(SESSION_EVENT_BUFFER);
        let cancel_token = CancellationToken::new();

        let (session, subscriptions, connect_rx, join_error) = match session {
            Ok(mut session) => {
                // Register subscriptions before initiating the connect so
                // no event in the registration window is missed.
                let subscriptions = session.subscribe_events(event_tx);
                let connect_rx = session.connect();
                (Some(session), subscriptions, Some(connect_rx), None)
            }
            Err(e) => {
                error!(
                    target: "stage.actor",
                    error = %e,
                    "Session construction failed; stage starts in join-error state"
                );
                (None, Vec::new(), None, Some(e.to_string()))
            }
        };

        let actor = Self {
            receiver,
            session_events: event_rx,
            events_closed: false,
            session,
            subscriptions,
            connect_rx,
            cancel_token: cancel_token.clone(),
            roster: RosterStore::new(
                config.max_participants_per_page,
                config.show_non_publishing_participants,
            ),
            focus: FocusSelector::new(),
            viewport: Viewport::new(0, 0),
            layout_mode: config.layout_mode,
            background_image: config.background_image,
            local_participant: None,
            join_error,
            created_at: chrono::Utc::now().timestamp(),
        };

        let task_handle = tokio::spawn(actor.run());

        (
            StageActorHandle {
                sender,
                cancel_token,
            },
            task_handle,
        )
    }

    /// Run the actor loop.
    #[instrument(skip_all, name = "stage.actor")]
    async fn run(mut self) {
        info!(target: "stage.actor", "StageActor started");

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => {
                    info!(target: "stage.actor", "StageActor received cancellation signal");
                    break;
                }

                join = Self::await_join(&mut self.connect_rx), if self.connect_rx.is_some() => {
                    self.connect_rx = None;
                    self.handle_join_completion(join);
                }

                event = self.session_events.recv(), if !self.events_closed => {
                    match event {
                        Some(event) => self.apply_session_event(event),
                        None => self.events_closed = true,
                    }
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => self.handle_message(message),
                        None => {
                            info!(target: "stage.actor", "StageActor channel closed, exiting");
                            break;
                        }
                    }
                }
            }
        }

        self.teardown();
        info!(target: "stage.actor", "StageActor stopped");
    }

    /// Await the pending join completion.
    ///
    /// Only polled while `connect_rx` is `Some` (guarded in the select);
    /// a dropped sender counts as a closed session.
    async fn await_join(
        rx: &mut Option<oneshot::Receiver<Result<LocalParticipant, SessionError>>>,
    ) -> Result<LocalParticipant, SessionError> {
        match rx.as_mut() {
            Some(rx) => match rx.await {
                Ok(result) => result,
                Err(_) => Err(SessionError::Closed),
            },
            None => std::future::pending().await,
        }
    }

    /// Record the one-shot join outcome.
    fn handle_join_completion(&mut self, result: Result<LocalParticipant, SessionError>) {
        match result {
            Ok(local) => {
                info!(
                    target: "stage.actor",
                    participant_id = %local.id,
                    "Session joined"
                );
                self.local_participant = Some(local);
            }
            Err(e) => {
                error!(target: "stage.actor", error = %e, "Session join failed");
                self.join_error = Some(e.to_string());
            }
        }
    }

    /// Reconcile one session event: roster first, then focus.
    fn apply_session_event(&mut self, event: SessionEvent) {
        self.roster.apply(&event);
        self.focus.observe(&event, &self.roster);
    }

    /// Handle a single command.
    fn handle_message(&mut self, message: StageMessage) {
        match message {
            StageMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.snapshot());
            }

            StageMessage::GetArrangement { respond_to } => {
                let _ = respond_to.send(self.arrangement());
            }

            StageMessage::ViewportResized { width, height } => {
                debug!(target: "stage.actor", width, height, "Viewport resized");
                self.viewport = Viewport::new(width, height);
            }

            StageMessage::SetLayoutMode { mode } => {
                debug!(target: "stage.actor", mode = %mode, "Layout mode changed");
                self.layout_mode = mode;
            }

            StageMessage::StartScreenShare { track, respond_to } => {
                let focused = if let Some(local) = self.local_participant.as_mut() {
                    let focused = self.focus.start_local_share(local, &track);
                    if !local.tracks.iter().any(|t| t.sid == track.sid) {
                        local.tracks.push(track);
                    }
                    focused
                } else {
                    warn!(
                        target: "stage.actor",
                        "Screen share start requested before join completed"
                    );
                    false
                };
                let _ = respond_to.send(focused);
            }

            StageMessage::StopScreenShare { respond_to } => {
                let local_share_sid = self
                    .focus
                    .active_share()
                    .filter(|share| share.is_local)
                    .map(|share| share.track_sid.clone());
                let stopped = self.focus.stop_local_share(&self.roster);
                if stopped {
                    if let (Some(local), Some(sid)) =
                        (self.local_participant.as_mut(), local_share_sid)
                    {
                        local.tracks.retain(|t| t.sid != sid);
                    }
                }
                let _ = respond_to.send(stopped);
            }
        }
    }

    /// Build a read-only snapshot.
    fn snapshot(&self) -> StageSnapshot {
        StageSnapshot {
            participants: self.roster.visible().to_vec(),
            hidden_participants: self.roster.hidden_count(),
            focus: self.focus.snapshot(),
            local_participant: self.local_participant.clone(),
            join_error: self.join_error.clone(),
            viewport: self.viewport,
            layout_mode: self.layout_mode,
            background_image: self.background_image.clone(),
            created_at: self.created_at,
        }
    }

    /// Dispatch the current arrangement.
    fn arrangement(&self) -> Arrangement {
        select_arrangement(
            self.layout_mode,
            self.focus.active_share().is_some(),
            self.viewport,
            self.roster.visible().len(),
        )
    }

    /// Release subscriptions, clear state, leave the session.
    fn teardown(&mut self) {
        info!(
            target: "stage.actor",
            participants = self.roster.len(),
            subscriptions = self.subscriptions.len(),
            "Tearing down stage"
        );

        for subscription in &mut self.subscriptions {
            subscription.release();
        }
        self.subscriptions.clear();
        self.roster.clear();
        self.focus.clear();

        if let Some(session) = self.session.as_mut() {
            session.leave();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::focus::ShareFocus;
    use session_protocol::TrackSource;
    use stage_test_utils::{fixtures, FakeSession};
    use std::time::Duration;

    fn test_config() -> StageConfig {
        StageConfig::default()
    }

    /// Poll snapshots until `pred` holds; events and commands travel on
    /// separate channels, so state changes are eventually visible.
    async fn snapshot_when<F>(handle: &StageActorHandle, mut pred: F) -> StageSnapshot
    where
        F: FnMut(&StageSnapshot) -> bool,
    {
        for _ in 0..500 {
            if let Ok(snapshot) = handle.snapshot().await {
                if pred(&snapshot) {
                    return snapshot;
                }
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("stage never reached the expected state");
    }

    #[tokio::test]
    async fn test_spawn_wires_subscriptions_then_connects() {
        let (session, driver) = FakeSession::connected(fixtures::local("me"));
        let (handle, _task) = StageActor::spawn(test_config(), Ok(session));

        let snapshot = snapshot_when(&handle, |s| s.local_participant.is_some()).await;
        assert!(snapshot.join_error.is_none());
        assert_eq!(
            snapshot.local_participant.map(|p| p.id),
            Some("me".into())
        );
        // One subscription per event kind, registered before connect.
        assert_eq!(driver.registered_subscriptions(), 7);
        assert_eq!(driver.active_subscriptions(), 7);

        handle.cancel();
    }

    #[tokio::test]
    async fn test_session_events_flow_into_roster() {
        let (session, driver) = FakeSession::connected(fixtures::local("me"));
        let (handle, _task) = StageActor::spawn(test_config(), Ok(session));

        let alice = fixtures::publisher("alice");
        let bob = fixtures::publisher("bob");
        driver.emit(fixtures::joined(&alice)).await;
        driver.emit(fixtures::joined(&bob)).await;

        let snapshot = snapshot_when(&handle, |s| s.participants.len() == 2).await;
        let ids: Vec<&str> = snapshot
            .participants
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["alice", "bob"]);
        assert_eq!(snapshot.focus.active_speaker, Some("alice".into()));

        handle.cancel();
    }

    #[tokio::test]
    async fn test_construction_failure_is_terminal_join_error() {
        let (handle, _task) = StageActor::<FakeSession>::spawn(
            test_config(),
            Err(SessionError::InvalidCredentials("bad token".to_string())),
        );

        let snapshot = snapshot_when(&handle, |s| s.join_error.is_some()).await;
        assert!(snapshot.join_error.unwrap_or_default().contains("bad token"));
        assert!(snapshot.local_participant.is_none());
        assert!(snapshot.participants.is_empty());

        handle.cancel();
    }

    #[tokio::test]
    async fn test_connect_rejection_records_join_error() {
        let (session, driver) =
            FakeSession::rejecting(SessionError::ConnectFailed("refused".to_string()));
        let (handle, _task) = StageActor::spawn(test_config(), Ok(session));

        let snapshot = snapshot_when(&handle, |s| s.join_error.is_some()).await;
        assert!(snapshot.join_error.unwrap_or_default().contains("refused"));
        // Wiring happened even though the join was rejected.
        assert_eq!(driver.registered_subscriptions(), 7);

        handle.cancel();
    }

    #[tokio::test]
    async fn test_events_delivered_while_join_pending() {
        let (session, driver) = FakeSession::deferred();
        let (handle, _task) = StageActor::spawn(test_config(), Ok(session));

        let alice = fixtures::publisher("alice");
        driver.emit(fixtures::joined(&alice)).await;

        let snapshot = snapshot_when(&handle, |s| s.participants.len() == 1).await;
        assert!(snapshot.local_participant.is_none());
        assert!(snapshot.join_error.is_none());

        assert!(driver.resolve_connect(Ok(fixtures::local("me"))));
        let snapshot = snapshot_when(&handle, |s| s.local_participant.is_some()).await;
        assert_eq!(snapshot.participants.len(), 1);

        handle.cancel();
    }

    #[tokio::test]
    async fn test_cancel_releases_subscriptions_exactly_once_and_leaves() {
        let (session, driver) = FakeSession::connected(fixtures::local("me"));
        let (handle, task) = StageActor::spawn(test_config(), Ok(session));

        driver.emit(fixtures::joined(&fixtures::publisher("alice"))).await;
        snapshot_when(&handle, |s| s.participants.len() == 1).await;

        handle.cancel();
        task.await.expect("actor task should not panic");

        assert_eq!(driver.released_subscriptions(), 7);
        assert_eq!(driver.active_subscriptions(), 0);
        assert!(driver.left());
        assert!(matches!(
            handle.snapshot().await,
            Err(StageError::Terminated)
        ));
    }

    #[tokio::test]
    async fn test_resize_and_mode_change_apply() {
        let (session, _driver) = FakeSession::connected(fixtures::local("me"));
        let (handle, _task) = StageActor::spawn(test_config(), Ok(session));

        handle.resize(1920, 1080).await.expect("resize");
        handle
            .set_layout_mode(LayoutMode::SpeakerFocus)
            .await
            .expect("mode change");

        let snapshot = snapshot_when(&handle, |s| {
            s.viewport == Viewport::new(1920, 1080) && s.layout_mode == LayoutMode::SpeakerFocus
        })
        .await;
        assert_eq!(snapshot.viewport.height, 1080);

        handle.cancel();
    }

    #[tokio::test]
    async fn test_local_share_start_and_guarded_stop() {
        let (session, driver) = FakeSession::connected(fixtures::local("me"));
        let (handle, _task) = StageActor::spawn(test_config(), Ok(session));
        snapshot_when(&handle, |s| s.local_participant.is_some()).await;

        let track = TrackInfo::new("TR_local_share", TrackSource::Screenshare);
        assert!(handle.start_screen_share(track).await.expect("start"));

        let snapshot = snapshot_when(&handle, |s| s.focus.active_screen_share.is_some()).await;
        let share = snapshot.focus.active_screen_share.expect("share focused");
        assert!(share.is_local);
        assert_eq!(share.participant_id, "me".into());
        assert!(snapshot
            .local_participant
            .map(|p| !p.tracks.is_empty())
            .unwrap_or(false));

        assert!(handle.stop_screen_share().await.expect("stop"));
        let snapshot = snapshot_when(&handle, |s| s.focus.active_screen_share.is_none()).await;
        assert!(snapshot
            .local_participant
            .map(|p| p.tracks.is_empty())
            .unwrap_or(false));

        // Remote share takes focus: stopping must refuse and change nothing.
        let sharer = fixtures::screen_sharer("sharer");
        driver.emit(fixtures::joined(&sharer)).await;
        let share_track = sharer.screen_share_track().expect("fixture shares").clone();
        driver.emit(fixtures::subscribed(&sharer, share_track)).await;
        snapshot_when(&handle, |s| {
            matches!(
                &s.focus.active_screen_share,
                Some(ShareFocus { is_local: false, .. })
            )
        })
        .await;

        assert!(!handle.stop_screen_share().await.expect("guarded stop"));
        let snapshot = snapshot_when(&handle, |s| s.focus.active_screen_share.is_some()).await;
        assert_eq!(
            snapshot
                .focus
                .active_screen_share
                .map(|s| s.participant_id),
            Some("sharer".into())
        );

        handle.cancel();
    }

    #[tokio::test]
    async fn test_share_start_before_join_is_refused() {
        let (session, _driver) = FakeSession::deferred();
        let (handle, _task) = StageActor::spawn(test_config(), Ok(session));

        let track = TrackInfo::new("TR_local_share", TrackSource::Screenshare);
        assert!(!handle.start_screen_share(track).await.expect("start"));

        handle.cancel();
    }

    #[tokio::test]
    async fn test_arrangement_tracks_roster_and_share() {
        let (session, driver) = FakeSession::connected(fixtures::local("me"));
        let (handle, _task) = StageActor::spawn(test_config(), Ok(session));

        handle.resize(1920, 1080).await.expect("resize");
        driver.emit(fixtures::joined(&fixtures::publisher("alice"))).await;
        driver.emit(fixtures::joined(&fixtures::publisher("bob"))).await;
        snapshot_when(&handle, |s| {
            s.participants.len() == 2 && s.viewport.width == 1920
        })
        .await;

        let arrangement = handle.arrangement().await.expect("arrangement");
        let Arrangement::Grid(grid) = arrangement else {
            panic!("expected grid without a share");
        };
        assert!(grid.tile.area > 0);

        // A focused share switches the landscape grid to the side rail.
        let sharer = fixtures::screen_sharer("sharer");
        driver.emit(fixtures::joined(&sharer)).await;
        let share_track = sharer.screen_share_track().expect("fixture shares").clone();
        driver.emit(fixtures::subscribed(&sharer, share_track)).await;
        snapshot_when(&handle, |s| s.focus.active_screen_share.is_some()).await;

        let arrangement = handle.arrangement().await.expect("arrangement");
        assert!(matches!(arrangement, Arrangement::SideRail(_)));

        handle.cancel();
    }
}
