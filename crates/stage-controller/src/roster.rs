//! Roster store and event reconciler.
//!
//! The roster is the ordered, deduplicated list of remote participants
//! eligible for display. Session events mutate it one at a time, strictly in
//! arrival order; the externally visible page is always the first
//! `page_size` entries, while the internal list may grow beyond that.
//!
//! Ordering is significant: it determines both display order and which
//! participants fall past the capacity cut. The active-speaker promotion
//! rule exists so a speaking participant is never silently dropped
//! off-page.

use common::ParticipantId;
use session_protocol::{Participant, RemoteParticipant, SessionEvent};
use tracing::debug;

/// Ordered, capacity-paged store of remote participants.
#[derive(Debug)]
pub struct RosterStore {
    /// Full internal list, display order. May exceed the visible page.
    entries: Vec<RemoteParticipant>,
    /// Capacity of the visible page.
    page_size: usize,
    /// Keep participants that publish no tracks.
    show_non_publishing: bool,
}

impl RosterStore {
    /// Create an empty roster.
    ///
    /// `page_size` is the visible-page capacity; `show_non_publishing`
    /// relaxes the join and unpublish filtering rules.
    #[must_use]
    pub fn new(page_size: usize, show_non_publishing: bool) -> Self {
        Self {
            entries: Vec::new(),
            page_size,
            show_non_publishing,
        }
    }

    /// Apply one session event.
    pub fn apply(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::ParticipantJoined { participant } => self.handle_joined(participant),
            SessionEvent::ParticipantLeft { participant } => self.handle_left(&participant.id),
            SessionEvent::TrackPublished { participant, .. } => self.handle_published(participant),
            SessionEvent::TrackUnpublished { participant, .. } => {
                self.handle_unpublished(participant);
            }
            SessionEvent::TrackSubscribed { participant, .. }
            | SessionEvent::TrackUnsubscribed { participant, .. } => {
                self.handle_subscription_change(participant);
            }
            SessionEvent::ActiveSpeakersChanged { speakers } => {
                self.handle_active_speakers(speakers);
            }
        }
    }

    /// A participant joined: append if eligible and not already present.
    fn handle_joined(&mut self, participant: &RemoteParticipant) {
        if self.contains(&participant.id) {
            return;
        }
        let eligible = participant.can_publish
            && (participant.has_media_tracks() || self.show_non_publishing);
        if !eligible {
            return;
        }

        debug!(
            target: "stage.roster",
            participant_id = %participant.id,
            total = self.entries.len() + 1,
            "Participant added to roster"
        );
        self.entries.push(participant.clone());
    }

    /// A participant left: remove their entry.
    fn handle_left(&mut self, id: &ParticipantId) {
        let before = self.entries.len();
        self.entries.retain(|p| &p.id != id);
        if self.entries.len() != before {
            debug!(
                target: "stage.roster",
                participant_id = %id,
                remaining = self.entries.len(),
                "Participant removed from roster"
            );
        }
    }

    /// A track was published: a participant may start publishing after
    /// joining as a non-publisher, so append if absent.
    fn handle_published(&mut self, participant: &RemoteParticipant) {
        if self.contains(&participant.id) {
            return;
        }
        debug!(
            target: "stage.roster",
            participant_id = %participant.id,
            "Publishing participant added to roster"
        );
        self.entries.push(participant.clone());
    }

    /// A track was unpublished: drop the participant once nothing remains,
    /// unless non-publishers are shown.
    fn handle_unpublished(&mut self, participant: &RemoteParticipant) {
        if !participant.has_media_tracks() && !self.show_non_publishing {
            self.handle_left(&participant.id);
        }
    }

    /// Subscription metadata changed: replace the stored entry, preserving
    /// its position.
    fn handle_subscription_change(&mut self, participant: &RemoteParticipant) {
        if let Some(entry) = self.entries.iter_mut().find(|p| p.id == participant.id) {
            *entry = participant.clone();
        }
    }

    /// Speaking participants changed: promote any remote speaker sitting at
    /// or past the last visible slot to the front of the roster.
    fn handle_active_speakers(&mut self, speakers: &[Participant]) {
        for speaker in speakers {
            let Some(remote) = speaker.as_remote() else {
                continue;
            };
            let Some(index) = self.position(&remote.id) else {
                continue;
            };
            if index >= self.page_size.saturating_sub(1) {
                let promoted = self.entries.remove(index);
                debug!(
                    target: "stage.roster",
                    participant_id = %promoted.id,
                    from_index = index,
                    "Active speaker promoted to front of roster"
                );
                self.entries.insert(0, promoted);
            }
        }
    }

    /// The externally visible page: the first `page_size` entries.
    #[must_use]
    pub fn visible(&self) -> &[RemoteParticipant] {
        let len = self.page_size.min(self.entries.len());
        self.entries.get(..len).unwrap_or_default()
    }

    /// Whether a participant is on the roster (visible or not).
    #[must_use]
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.position(id).is_some()
    }

    /// Index of a participant in the full internal list.
    #[must_use]
    pub fn position(&self, id: &ParticipantId) -> Option<usize> {
        self.entries.iter().position(|p| &p.id == id)
    }

    /// Look up a participant by id.
    #[must_use]
    pub fn get(&self, id: &ParticipantId) -> Option<&RemoteParticipant> {
        self.entries.iter().find(|p| &p.id == id)
    }

    /// Total participants tracked, including those past the visible page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Participants past the visible page.
    #[must_use]
    pub fn hidden_count(&self) -> usize {
        self.entries.len().saturating_sub(self.page_size)
    }

    /// Remove every participant (session teardown).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
