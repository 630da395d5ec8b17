//! Session lifecycle events.

use crate::participant::{Participant, RemoteParticipant};
use crate::track::TrackInfo;
use serde::{Deserialize, Serialize};

/// A lifecycle event emitted by the media session.
///
/// Events are delivered one at a time, in arrival order. Track events carry
/// both the participant (with their full post-event track list) and the
/// track the event concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A remote participant connected to the session.
    ParticipantJoined {
        /// The joining participant.
        participant: RemoteParticipant,
    },
    /// A remote participant disconnected from the session.
    ParticipantLeft {
        /// The departing participant.
        participant: RemoteParticipant,
    },
    /// A remote participant published a track.
    TrackPublished {
        /// The publishing participant, including the new track.
        participant: RemoteParticipant,
        /// The published track.
        track: TrackInfo,
    },
    /// A remote participant unpublished a track.
    TrackUnpublished {
        /// The participant, with the track already removed.
        participant: RemoteParticipant,
        /// The unpublished track.
        track: TrackInfo,
    },
    /// The local client subscribed to a remote track.
    TrackSubscribed {
        /// The participant owning the track, with updated subscription state.
        participant: RemoteParticipant,
        /// The subscribed track.
        track: TrackInfo,
    },
    /// The local client unsubscribed from a remote track.
    TrackUnsubscribed {
        /// The participant owning the track, with updated subscription state.
        participant: RemoteParticipant,
        /// The unsubscribed track.
        track: TrackInfo,
    },
    /// The set of currently speaking participants changed.
    ///
    /// Ordered loudest-first by the transport. May include the local
    /// participant.
    ActiveSpeakersChanged {
        /// Participants currently speaking.
        speakers: Vec<Participant>,
    },
}

impl SessionEvent {
    /// The kind of this event, for subscription registration.
    #[must_use]
    pub fn kind(&self) -> SessionEventKind {
        match self {
            SessionEvent::ParticipantJoined { .. } => SessionEventKind::ParticipantJoined,
            SessionEvent::ParticipantLeft { .. } => SessionEventKind::ParticipantLeft,
            SessionEvent::TrackPublished { .. } => SessionEventKind::TrackPublished,
            SessionEvent::TrackUnpublished { .. } => SessionEventKind::TrackUnpublished,
            SessionEvent::TrackSubscribed { .. } => SessionEventKind::TrackSubscribed,
            SessionEvent::TrackUnsubscribed { .. } => SessionEventKind::TrackUnsubscribed,
            SessionEvent::ActiveSpeakersChanged { .. } => SessionEventKind::ActiveSpeakersChanged,
        }
    }
}

/// Event kinds, used to register one subscription per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// See [`SessionEvent::ParticipantJoined`].
    ParticipantJoined,
    /// See [`SessionEvent::ParticipantLeft`].
    ParticipantLeft,
    /// See [`SessionEvent::TrackPublished`].
    TrackPublished,
    /// See [`SessionEvent::TrackUnpublished`].
    TrackUnpublished,
    /// See [`SessionEvent::TrackSubscribed`].
    TrackSubscribed,
    /// See [`SessionEvent::TrackUnsubscribed`].
    TrackUnsubscribed,
    /// See [`SessionEvent::ActiveSpeakersChanged`].
    ActiveSpeakersChanged,
}

impl SessionEventKind {
    /// Every event kind the stage core listens for.
    pub const ALL: [SessionEventKind; 7] = [
        SessionEventKind::ParticipantJoined,
        SessionEventKind::ParticipantLeft,
        SessionEventKind::TrackPublished,
        SessionEventKind::TrackUnpublished,
        SessionEventKind::TrackSubscribed,
        SessionEventKind::TrackUnsubscribed,
        SessionEventKind::ActiveSpeakersChanged,
    ];
}
