//! Participant descriptors.
//!
//! Local and remote participants share a capability surface (identity,
//! tracks, publishing state) but are distinct types: the roster only ever
//! holds remote participants, while speaking reports may name either. The
//! [`Participant`] tagged variant carries both through event payloads and is
//! dispatched by pattern matching.

use crate::track::{TrackInfo, TrackSource};
use common::ParticipantId;
use serde::{Deserialize, Serialize};

/// A remote participant as reported by the transport.
///
/// One live instance exists per connected remote participant; the instance
/// carried by an event reflects that participant's state at the time the
/// event was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteParticipant {
    /// Transport-issued connection identifier.
    pub id: ParticipantId,
    /// Whether the participant is permitted to publish media.
    pub can_publish: bool,
    /// Live published tracks.
    pub tracks: Vec<TrackInfo>,
}

impl RemoteParticipant {
    /// Create a participant with no published tracks.
    #[must_use]
    pub fn new(id: impl Into<ParticipantId>, can_publish: bool) -> Self {
        Self {
            id: id.into(),
            can_publish,
            tracks: Vec::new(),
        }
    }

    /// Add a published track (builder-style, for event construction).
    #[must_use]
    pub fn with_track(mut self, track: TrackInfo) -> Self {
        self.tracks.push(track);
        self
    }

    /// Whether at least one live audio or video track is published.
    #[must_use]
    pub fn has_media_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Whether the local client is subscribed to any of this participant's
    /// tracks.
    #[must_use]
    pub fn is_subscribed(&self) -> bool {
        self.tracks.iter().any(|t| t.subscribed)
    }

    /// Video tracks (camera and screen-share).
    pub fn video_tracks(&self) -> impl Iterator<Item = &TrackInfo> {
        self.tracks.iter().filter(|t| t.is_video())
    }

    /// Whether a screen-share video track is currently published.
    #[must_use]
    pub fn is_screen_sharing(&self) -> bool {
        self.screen_share_track().is_some()
    }

    /// The screen-share video track, if one is published.
    #[must_use]
    pub fn screen_share_track(&self) -> Option<&TrackInfo> {
        self.tracks
            .iter()
            .find(|t| t.source == TrackSource::Screenshare)
    }
}

/// The local participant handle delivered by a successful join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalParticipant {
    /// Transport-issued connection identifier.
    pub id: ParticipantId,
    /// Tracks published by the local client.
    pub tracks: Vec<TrackInfo>,
}

impl LocalParticipant {
    /// Create a local participant with no published tracks.
    #[must_use]
    pub fn new(id: impl Into<ParticipantId>) -> Self {
        Self {
            id: id.into(),
            tracks: Vec::new(),
        }
    }
}

/// Either side of the local/remote split, with the shared capability
/// surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Participant {
    /// The local client.
    Local(LocalParticipant),
    /// A remote participant.
    Remote(RemoteParticipant),
}

impl Participant {
    /// Connection identifier.
    #[must_use]
    pub fn id(&self) -> &ParticipantId {
        match self {
            Participant::Local(p) => &p.id,
            Participant::Remote(p) => &p.id,
        }
    }

    /// Live published tracks.
    #[must_use]
    pub fn tracks(&self) -> &[TrackInfo] {
        match self {
            Participant::Local(p) => &p.tracks,
            Participant::Remote(p) => &p.tracks,
        }
    }

    /// Whether at least one track is currently published.
    #[must_use]
    pub fn is_publishing(&self) -> bool {
        !self.tracks().is_empty()
    }

    /// The remote participant, if this is one.
    #[must_use]
    pub fn as_remote(&self) -> Option<&RemoteParticipant> {
        match self {
            Participant::Remote(p) => Some(p),
            Participant::Local(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_has_media_tracks_reflects_track_list() {
        let bare = RemoteParticipant::new("p1", true);
        assert!(!bare.has_media_tracks());

        let publishing = bare.with_track(TrackInfo::new("TR_1", TrackSource::Camera));
        assert!(publishing.has_media_tracks());
    }

    #[test]
    fn test_is_subscribed_requires_a_subscribed_track() {
        let p = RemoteParticipant::new("p1", true)
            .with_track(TrackInfo::new("TR_1", TrackSource::Camera));
        assert!(!p.is_subscribed());

        let p = RemoteParticipant::new("p1", true)
            .with_track(TrackInfo::new("TR_1", TrackSource::Camera).subscribed());
        assert!(p.is_subscribed());
    }

    #[test]
    fn test_screen_share_detection_ignores_audio_companion() {
        let p = RemoteParticipant::new("p1", true)
            .with_track(TrackInfo::new("TR_a", TrackSource::ScreenshareAudio));
        assert!(!p.is_screen_sharing());

        let p = p.with_track(TrackInfo::new("TR_v", TrackSource::Screenshare));
        assert!(p.is_screen_sharing());
        assert_eq!(p.screen_share_track().map(|t| t.sid.as_str()), Some("TR_v"));
    }

    #[test]
    fn test_tagged_variant_shared_surface() {
        let local = Participant::Local(LocalParticipant::new("me"));
        assert_eq!(local.id().as_str(), "me");
        assert!(!local.is_publishing());
        assert!(local.as_remote().is_none());

        let remote = Participant::Remote(
            RemoteParticipant::new("p1", true)
                .with_track(TrackInfo::new("TR_1", TrackSource::Microphone)),
        );
        assert!(remote.is_publishing());
        assert!(remote.as_remote().is_some());
    }
}
